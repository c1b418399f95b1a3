use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, MintTo, TokenAccount, TokenInterface};

use crate::errors::ZtokenError;
use crate::events::TokensMinted;
use crate::state::TokenMetadata;
use crate::utils::{require_authority, require_mint};

#[derive(Accounts)]
pub struct MintTokens<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(mut)]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub to_ata: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,

    pub token_metadata: Account<'info, TokenMetadata>,
}

pub fn handler(ctx: Context<MintTokens>, amount: u64) -> Result<()> {
    let metadata = &ctx.accounts.token_metadata;
    let mint = &ctx.accounts.mint;

    require_mint(&metadata.mint, &mint.key())?;
    require_mint(&ctx.accounts.to_ata.mint, &mint.key())?;
    require_authority(&metadata.authority, &ctx.accounts.authority.key())?;

    let new_total_supply = mint
        .supply
        .checked_add(amount)
        .ok_or(ZtokenError::Overflow)?;

    let cpi_accounts = MintTo {
        mint: mint.to_account_info(),
        to: ctx.accounts.to_ata.to_account_info(),
        authority: ctx.accounts.authority.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    token_interface::mint_to(cpi_ctx, amount)?;

    emit!(TokensMinted {
        mint: mint.key(),
        to_ata: ctx.accounts.to_ata.key(),
        authority: ctx.accounts.authority.key(),
        amount,
        new_total_supply,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
