use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, MintTo, TokenAccount, TokenInterface};

use crate::constants::{METADATA_SEED, REGISTRY_SEED};
use crate::events::TokenCreated;
use crate::state::{TokenMetadata, Ztoken};
use crate::utils::validate_token_metadata;

#[derive(Accounts)]
#[instruction(name: String, symbol: String, decimals: u8)]
pub struct CreateMint<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init,
        signer,
        payer = payer,
        mint::decimals = decimals,
        mint::authority = payer,
        mint::token_program = token_program,
    )]
    pub mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        signer,
        payer = payer,
        token::mint = mint,
        token::authority = payer,
        token::token_program = token_program,
    )]
    pub token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = payer,
        space = 8 + TokenMetadata::INIT_SPACE,
        seeds = [METADATA_SEED, &ztoken.count.to_le_bytes()],
        bump
    )]
    pub token_metadata: Box<Account<'info, TokenMetadata>>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = ztoken.bump
    )]
    pub ztoken: Account<'info, Ztoken>,

    pub token_program: Interface<'info, TokenInterface>,
    pub rent: Sysvar<'info, Rent>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<CreateMint>,
    name: String,
    symbol: String,
    decimals: u8,
    init_supply: u64,
) -> Result<()> {
    validate_token_metadata(&name, &symbol, decimals)?;

    let mint_key = ctx.accounts.mint.key();
    let payer_key = ctx.accounts.payer.key();

    if init_supply > 0 {
        let cpi_accounts = MintTo {
            mint: ctx.accounts.mint.to_account_info(),
            to: ctx.accounts.token_account.to_account_info(),
            authority: ctx.accounts.payer.to_account_info(),
        };
        let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
        token_interface::mint_to(cpi_ctx, init_supply)?;
    }

    let id = ctx.accounts.ztoken.allocate_id()?;

    let metadata = &mut ctx.accounts.token_metadata;
    metadata.id = id;
    metadata.mint = mint_key;
    metadata.authority = payer_key;
    metadata.decimals = decimals;
    metadata.name = name;
    metadata.symbol = symbol;
    metadata.bump = ctx.bumps.token_metadata;

    msg!("Created token {} ({}) with id {}", metadata.name, metadata.symbol, id);
    emit!(TokenCreated {
        id,
        metadata: metadata.key(),
        mint: mint_key,
        authority: payer_key,
        name: metadata.name.clone(),
        symbol: metadata.symbol.clone(),
        decimals,
        initial_supply: init_supply,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
