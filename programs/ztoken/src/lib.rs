#![allow(clippy::result_large_err)]

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

pub use instructions::*;

declare_id!("JAVuBXeBZqXNtS73azhBDAoYaaAFfo4gWXoZe2e7Jf8H");

#[program]
pub mod ztoken {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        initialize::handler(ctx)
    }

    pub fn create_mint(
        ctx: Context<CreateMint>,
        name: String,
        symbol: String,
        decimals: u8,
        init_supply: u64,
    ) -> Result<()> {
        create_mint::handler(ctx, name, symbol, decimals, init_supply)
    }

    pub fn get_token_metadata_pda(ctx: Context<GetTokenMetadataPda>, id: u64) -> Result<Pubkey> {
        metadata::handler(ctx, id)
    }

    pub fn create_or_get_ata(ctx: Context<CreateOrGetAta>) -> Result<()> {
        ata::create_or_get_handler(ctx)
    }

    pub fn close_ata(ctx: Context<CloseAta>) -> Result<()> {
        ata::close_handler(ctx)
    }

    pub fn transfer(ctx: Context<TransferTokens>, amount: u64) -> Result<()> {
        transfer::handler(ctx, amount)
    }

    pub fn mint_to(ctx: Context<MintTokens>, amount: u64) -> Result<()> {
        mint::handler(ctx, amount)
    }

    pub fn freeze_account(ctx: Context<FreezeAccount>) -> Result<()> {
        freeze::freeze_handler(ctx)
    }

    pub fn unfreeze_account(ctx: Context<UnfreezeAccount>) -> Result<()> {
        freeze::unfreeze_handler(ctx)
    }
}
