use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{self, CloseAccount, Mint, TokenAccount, TokenInterface},
};

use crate::events::{AtaClosed, AtaReady};
use crate::utils::require_closable;

#[derive(Accounts)]
pub struct CreateOrGetAta<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: Only used as the owner of the associated token account.
    pub user: UncheckedAccount<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        init_if_needed,
        payer = payer,
        associated_token::mint = mint,
        associated_token::authority = user,
        associated_token::token_program = token_program,
    )]
    pub user_ata: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct CloseAta<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(mut)]
    pub user_ata: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn create_or_get_handler(ctx: Context<CreateOrGetAta>) -> Result<()> {
    let user_ata = &ctx.accounts.user_ata;

    msg!("Associated token account {} ready", user_ata.key());
    emit!(AtaReady {
        owner: ctx.accounts.user.key(),
        mint: ctx.accounts.mint.key(),
        ata: user_ata.key(),
        payer: ctx.accounts.payer.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

pub fn close_handler(ctx: Context<CloseAta>) -> Result<()> {
    let user_ata = &ctx.accounts.user_ata;
    require_closable(&user_ata.owner, user_ata.amount, &ctx.accounts.user.key())?;

    let cpi_accounts = CloseAccount {
        account: user_ata.to_account_info(),
        destination: ctx.accounts.user.to_account_info(),
        authority: ctx.accounts.user.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    token_interface::close_account(cpi_ctx)?;

    emit!(AtaClosed {
        owner: ctx.accounts.user.key(),
        ata: user_ata.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
