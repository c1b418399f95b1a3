use anchor_lang::prelude::*;

use crate::constants::METADATA_SEED;
use crate::errors::ZtokenError;
use crate::state::TokenMetadata;

#[derive(Accounts)]
#[instruction(id: u64)]
pub struct GetTokenMetadataPda<'info> {
    /// CHECK: Derived from `id`; contents are decoded in the handler so that
    /// an unallocated id reports `TokenNotFound`.
    #[account(
        seeds = [METADATA_SEED, &id.to_le_bytes()],
        bump
    )]
    pub token_metadata: UncheckedAccount<'info>,
}

pub fn handler(ctx: Context<GetTokenMetadataPda>, id: u64) -> Result<Pubkey> {
    let account = &ctx.accounts.token_metadata;
    if account.data_is_empty() || account.owner != &crate::ID {
        return err!(ZtokenError::TokenNotFound);
    }

    let data = account.try_borrow_data()?;
    let mut slice: &[u8] = &data[..];
    let metadata = TokenMetadata::try_deserialize(&mut slice)?;
    require!(metadata.id == id, ZtokenError::MetadataMismatch);

    msg!("Token {} metadata at {}", id, account.key());
    Ok(account.key())
}
