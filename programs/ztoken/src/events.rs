use anchor_lang::prelude::*;

#[event]
pub struct RegistryInitialized {
    pub registry: Pubkey,
    pub admin: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct TokenCreated {
    pub id: u64,
    pub metadata: Pubkey,
    pub mint: Pubkey,
    pub authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: u64,
    pub timestamp: i64,
}

#[event]
pub struct AtaReady {
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub ata: Pubkey,
    pub payer: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct AtaClosed {
    pub owner: Pubkey,
    pub ata: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct TokensTransferred {
    pub mint: Pubkey,
    pub from_ata: Pubkey,
    pub to_ata: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
    pub from_balance: u64,
    pub to_balance: u64,
    pub timestamp: i64,
}

#[event]
pub struct TokensMinted {
    pub mint: Pubkey,
    pub to_ata: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
    pub new_total_supply: u64,
    pub timestamp: i64,
}

#[event]
pub struct AccountFrozen {
    pub account: Pubkey,
    pub frozen_by: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct AccountUnfrozen {
    pub account: Pubkey,
    pub unfrozen_by: Pubkey,
    pub timestamp: i64,
}
