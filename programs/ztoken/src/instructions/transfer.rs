use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};

use crate::events::TokensTransferred;
use crate::state::FrozenAccount;
use crate::utils::{
    require_authority, require_distinct_transfer, require_mint, require_not_frozen, settle_transfer,
};

#[derive(Accounts)]
pub struct TransferTokens<'info> {
    #[account(mut)]
    pub from_authority: Signer<'info>,

    #[account(mut)]
    pub from_ata: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub to_ata: InterfaceAccount<'info, TokenAccount>,

    pub mint: InterfaceAccount<'info, Mint>,

    pub token_program: Interface<'info, TokenInterface>,

    /// Freeze record of the sender. Leaving it out skips the check.
    pub frozen_account: Option<Account<'info, FrozenAccount>>,

    /// Freeze record of the recipient.
    pub recipient_frozen_account: Option<Account<'info, FrozenAccount>>,
}

pub fn handler(ctx: Context<TransferTokens>, amount: u64) -> Result<()> {
    let from_ata = &ctx.accounts.from_ata;
    let to_ata = &ctx.accounts.to_ata;
    let mint = &ctx.accounts.mint;

    require_distinct_transfer(&from_ata.key(), &to_ata.key(), amount)?;
    require_mint(&from_ata.mint, &mint.key())?;
    require_mint(&to_ata.mint, &mint.key())?;
    require_authority(&from_ata.owner, &ctx.accounts.from_authority.key())?;
    require_not_frozen(
        ctx.accounts.frozen_account.as_deref(),
        &from_ata.owner,
    )?;
    require_not_frozen(
        ctx.accounts.recipient_frozen_account.as_deref(),
        &to_ata.owner,
    )?;

    let (from_balance, to_balance) = settle_transfer(from_ata.amount, to_ata.amount, amount)?;

    let cpi_accounts = TransferChecked {
        from: from_ata.to_account_info(),
        mint: mint.to_account_info(),
        to: to_ata.to_account_info(),
        authority: ctx.accounts.from_authority.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    token_interface::transfer_checked(cpi_ctx, amount, mint.decimals)?;

    emit!(TokensTransferred {
        mint: mint.key(),
        from_ata: from_ata.key(),
        to_ata: to_ata.key(),
        authority: ctx.accounts.from_authority.key(),
        amount,
        from_balance,
        to_balance,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
