use anchor_lang::prelude::*;

use crate::constants::{MAX_NAME_LEN, MAX_SYMBOL_LEN};
use crate::errors::ZtokenError;

/// Registry of created tokens. `count` is both the number of tokens created
/// so far and the id handed to the next one.
#[account]
#[derive(Default)]
pub struct Ztoken {
    pub count: u64,
    pub admin: Pubkey,
    pub bump: u8,
}

impl Ztoken {
    pub const INIT_SPACE: usize = 8 + 32 + 1;

    pub fn is_initialized(&self) -> bool {
        self.admin != Pubkey::default()
    }

    /// Hands out the current count as the next token id and advances it.
    pub fn allocate_id(&mut self) -> Result<u64> {
        let id = self.count;
        self.count = self.count.checked_add(1).ok_or(ZtokenError::Overflow)?;
        Ok(id)
    }
}

// Fixed-size fields first: clients filter on `mint` at a stable offset.
#[account]
#[derive(Default)]
pub struct TokenMetadata {
    pub id: u64,
    pub mint: Pubkey,
    pub authority: Pubkey,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
    pub bump: u8,
}

impl TokenMetadata {
    pub const INIT_SPACE: usize = 8 + 32 + 32 + 1 + (4 + MAX_NAME_LEN) + (4 + MAX_SYMBOL_LEN) + 1;

    /// Byte offset of `mint` in the account data, discriminator included.
    pub const MINT_OFFSET: usize = 8 + 8;
}

#[account]
#[derive(Default)]
pub struct FrozenAccount {
    pub account: Pubkey,
    pub is_frozen: bool,
    pub updated_by: Pubkey,
    pub bump: u8,
}

impl FrozenAccount {
    pub const INIT_SPACE: usize = 32 + 1 + 32 + 1;

    pub fn set(&mut self, account: Pubkey, is_frozen: bool, updated_by: Pubkey, bump: u8) {
        self.account = account;
        self.is_frozen = is_frozen;
        self.updated_by = updated_by;
        self.bump = bump;
    }
}
