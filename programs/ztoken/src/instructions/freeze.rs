use anchor_lang::prelude::*;

use crate::constants::FROZEN_SEED;
use crate::events::{AccountFrozen, AccountUnfrozen};
use crate::state::FrozenAccount;

#[derive(Accounts)]
pub struct FreezeAccount<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + FrozenAccount::INIT_SPACE,
        seeds = [FROZEN_SEED, account_to_freeze.key().as_ref()],
        bump
    )]
    pub frozen_account: Account<'info, FrozenAccount>,

    /// CHECK: Any account can be flagged; only its key is stored.
    pub account_to_freeze: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UnfreezeAccount<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + FrozenAccount::INIT_SPACE,
        seeds = [FROZEN_SEED, account_to_freeze.key().as_ref()],
        bump
    )]
    pub frozen_account: Account<'info, FrozenAccount>,

    /// CHECK: Any account can be flagged; only its key is stored.
    pub account_to_freeze: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn freeze_handler(ctx: Context<FreezeAccount>) -> Result<()> {
    let account = ctx.accounts.account_to_freeze.key();
    let authority = ctx.accounts.authority.key();

    ctx.accounts
        .frozen_account
        .set(account, true, authority, ctx.bumps.frozen_account);

    msg!("Account {} frozen", account);
    emit!(AccountFrozen {
        account,
        frozen_by: authority,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

pub fn unfreeze_handler(ctx: Context<UnfreezeAccount>) -> Result<()> {
    let account = ctx.accounts.account_to_freeze.key();
    let authority = ctx.accounts.authority.key();

    ctx.accounts
        .frozen_account
        .set(account, false, authority, ctx.bumps.frozen_account);

    msg!("Account {} unfrozen", account);
    emit!(AccountUnfrozen {
        account,
        unfrozen_by: authority,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
