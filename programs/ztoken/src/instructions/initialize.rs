use anchor_lang::prelude::*;

use crate::constants::REGISTRY_SEED;
use crate::events::RegistryInitialized;
use crate::state::Ztoken;
use crate::utils::require_uninitialized;

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + Ztoken::INIT_SPACE,
        seeds = [REGISTRY_SEED],
        bump
    )]
    pub ztoken: Account<'info, Ztoken>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let ztoken = &mut ctx.accounts.ztoken;

    require_uninitialized(ztoken)?;

    ztoken.count = 0;
    ztoken.admin = ctx.accounts.payer.key();
    ztoken.bump = ctx.bumps.ztoken;

    msg!("Registry initialized by {}", ztoken.admin);
    emit!(RegistryInitialized {
        registry: ztoken.key(),
        admin: ztoken.admin,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
