use anchor_lang::prelude::*;

use crate::constants::{
    FROZEN_SEED, MAX_DECIMALS, MAX_NAME_LEN, MAX_SYMBOL_LEN, METADATA_SEED, REGISTRY_SEED,
};
use crate::errors::ZtokenError;
use crate::state::{FrozenAccount, Ztoken};

pub fn find_registry_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[REGISTRY_SEED], program_id)
}

pub fn find_metadata_pda(id: u64, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[METADATA_SEED, &id.to_le_bytes()], program_id)
}

pub fn find_frozen_pda(account: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[FROZEN_SEED, account.as_ref()], program_id)
}

pub fn validate_token_metadata(name: &str, symbol: &str, decimals: u8) -> Result<()> {
    require!(!name.is_empty(), ZtokenError::InvalidName);
    require!(name.len() <= MAX_NAME_LEN, ZtokenError::NameTooLong);
    require!(!symbol.is_empty(), ZtokenError::InvalidSymbol);
    require!(symbol.len() <= MAX_SYMBOL_LEN, ZtokenError::SymbolTooLong);
    require!(decimals <= MAX_DECIMALS, ZtokenError::InvalidDecimals);
    Ok(())
}

pub fn require_mint(account_mint: &Pubkey, mint: &Pubkey) -> Result<()> {
    require!(account_mint == mint, ZtokenError::MintMismatch);
    Ok(())
}

pub fn require_authority(authority: &Pubkey, signer: &Pubkey) -> Result<()> {
    require!(authority == signer, ZtokenError::Unauthorized);
    Ok(())
}

pub fn require_uninitialized(registry: &Ztoken) -> Result<()> {
    require!(!registry.is_initialized(), ZtokenError::AlreadyInitialized);
    Ok(())
}

/// Only the owner may close a token account, and only once it is empty.
pub fn require_closable(owner: &Pubkey, amount: u64, user: &Pubkey) -> Result<()> {
    require!(owner == user, ZtokenError::Unauthorized);
    require!(amount == 0, ZtokenError::AccountNotEmpty);
    Ok(())
}

pub fn require_distinct_transfer(from_ata: &Pubkey, to_ata: &Pubkey, amount: u64) -> Result<()> {
    require!(amount > 0, ZtokenError::InvalidTransfer);
    require!(from_ata != to_ata, ZtokenError::InvalidTransfer);
    Ok(())
}

/// A missing record counts as not frozen. A supplied record must belong to
/// `owner`, otherwise any unrelated unfrozen record would pass the check.
pub fn require_not_frozen(record: Option<&FrozenAccount>, owner: &Pubkey) -> Result<()> {
    let Some(record) = record else {
        return Ok(());
    };
    require!(record.account == *owner, ZtokenError::FreezeRecordMismatch);
    require!(!record.is_frozen, ZtokenError::AccountFrozen);
    Ok(())
}

/// Balances of (source, destination) after moving `amount`.
pub fn settle_transfer(from_balance: u64, to_balance: u64, amount: u64) -> Result<(u64, u64)> {
    require!(amount > 0, ZtokenError::InvalidTransfer);
    require!(from_balance >= amount, ZtokenError::InsufficientFunds);
    let to_balance = to_balance
        .checked_add(amount)
        .ok_or(ZtokenError::Overflow)?;
    Ok((from_balance - amount, to_balance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frozen(account: Pubkey, is_frozen: bool) -> FrozenAccount {
        FrozenAccount {
            account,
            is_frozen,
            ..FrozenAccount::default()
        }
    }

    #[test]
    fn accepts_observed_token_metadata() {
        assert!(validate_token_metadata("Test Mint", "TST", 6).is_ok());
        assert!(validate_token_metadata(&"n".repeat(MAX_NAME_LEN), "TK1", 0).is_ok());
    }

    #[test]
    fn rejects_bad_token_metadata() {
        assert_eq!(
            validate_token_metadata(&"n".repeat(MAX_NAME_LEN + 1), "TST", 6).unwrap_err(),
            ZtokenError::NameTooLong.into()
        );
        assert_eq!(
            validate_token_metadata("", "TST", 6).unwrap_err(),
            ZtokenError::InvalidName.into()
        );
        assert_eq!(
            validate_token_metadata("Test Mint", "TOOLONGSYMB", 6).unwrap_err(),
            ZtokenError::SymbolTooLong.into()
        );
        assert_eq!(
            validate_token_metadata("Test Mint", "", 6).unwrap_err(),
            ZtokenError::InvalidSymbol.into()
        );
        assert_eq!(
            validate_token_metadata("Test Mint", "TST", MAX_DECIMALS + 1).unwrap_err(),
            ZtokenError::InvalidDecimals.into()
        );
    }

    #[test]
    fn rejects_cross_mint_accounts() {
        let mint = Pubkey::new_unique();
        assert!(require_mint(&mint, &mint).is_ok());
        assert_eq!(
            require_mint(&Pubkey::new_unique(), &mint).unwrap_err(),
            ZtokenError::MintMismatch.into()
        );
    }

    #[test]
    fn missing_freeze_record_is_not_frozen() {
        assert!(require_not_frozen(None, &Pubkey::new_unique()).is_ok());
    }

    #[test]
    fn frozen_owner_cannot_send_until_unfrozen() {
        let owner = Pubkey::new_unique();
        let mut record = frozen(owner, true);
        assert_eq!(
            require_not_frozen(Some(&record), &owner).unwrap_err(),
            ZtokenError::AccountFrozen.into()
        );
        record.is_frozen = false;
        assert!(require_not_frozen(Some(&record), &owner).is_ok());
    }

    #[test]
    fn freeze_record_of_another_account_is_rejected() {
        let record = frozen(Pubkey::new_unique(), false);
        assert_eq!(
            require_not_frozen(Some(&record), &Pubkey::new_unique()).unwrap_err(),
            ZtokenError::FreezeRecordMismatch.into()
        );
    }

    #[test]
    fn transfer_moves_balance() {
        assert_eq!(settle_transfer(1000, 0, 100).unwrap(), (900, 100));
        assert_eq!(settle_transfer(100, 5, 100).unwrap(), (0, 105));
    }

    #[test]
    fn zero_amount_transfer_is_rejected() {
        assert_eq!(
            settle_transfer(1000, 0, 0).unwrap_err(),
            ZtokenError::InvalidTransfer.into()
        );
        let (from_ata, to_ata) = (Pubkey::new_unique(), Pubkey::new_unique());
        assert_eq!(
            require_distinct_transfer(&from_ata, &to_ata, 0).unwrap_err(),
            ZtokenError::InvalidTransfer.into()
        );
    }

    #[test]
    fn transfer_to_same_account_is_rejected() {
        let ata = Pubkey::new_unique();
        assert_eq!(
            require_distinct_transfer(&ata, &ata, 100).unwrap_err(),
            ZtokenError::InvalidTransfer.into()
        );
        assert!(require_distinct_transfer(&ata, &Pubkey::new_unique(), 100).is_ok());
    }

    #[test]
    fn only_metadata_authority_may_mint() {
        let authority = Pubkey::new_unique();
        assert!(require_authority(&authority, &authority).is_ok());
        assert_eq!(
            require_authority(&authority, &Pubkey::new_unique()).unwrap_err(),
            ZtokenError::Unauthorized.into()
        );
    }

    #[test]
    fn second_initialize_is_rejected() {
        let mut registry = Ztoken::default();
        assert!(require_uninitialized(&registry).is_ok());
        registry.admin = Pubkey::new_unique();
        assert_eq!(
            require_uninitialized(&registry).unwrap_err(),
            ZtokenError::AlreadyInitialized.into()
        );
    }

    #[test]
    fn close_requires_owner_and_empty_account() {
        let owner = Pubkey::new_unique();
        assert!(require_closable(&owner, 0, &owner).is_ok());
        assert_eq!(
            require_closable(&owner, 0, &Pubkey::new_unique()).unwrap_err(),
            ZtokenError::Unauthorized.into()
        );
        assert_eq!(
            require_closable(&owner, 5, &owner).unwrap_err(),
            ZtokenError::AccountNotEmpty.into()
        );
    }

    #[test]
    fn transfer_over_balance_fails() {
        let (payer, recipient) = settle_transfer(1000, 0, 100).unwrap();
        assert_eq!(
            settle_transfer(payer, recipient, 1_000_000).unwrap_err(),
            ZtokenError::InsufficientFunds.into()
        );
    }

    #[test]
    fn transfer_credit_overflow_fails() {
        assert_eq!(
            settle_transfer(10, u64::MAX, 1).unwrap_err(),
            ZtokenError::Overflow.into()
        );
    }

    #[test]
    fn transfers_conserve_supply() {
        let mut balances = [1000u64, 0, 0];
        let moves = [(0, 1, 100), (1, 2, 40), (0, 2, 900), (2, 0, 500), (1, 0, 61)];
        for (from, to, amount) in moves {
            match settle_transfer(balances[from], balances[to], amount) {
                Ok((from_balance, to_balance)) => {
                    balances[from] = from_balance;
                    balances[to] = to_balance;
                }
                Err(err) => assert_eq!(err, ZtokenError::InsufficientFunds.into()),
            }
            assert_eq!(balances.iter().sum::<u64>(), 1000);
        }
        assert_eq!(balances, [500, 60, 440]);
    }

    #[test]
    fn pdas_are_deterministic_and_distinct() {
        let program_id = crate::ID;
        assert_eq!(find_metadata_pda(0, &program_id), find_metadata_pda(0, &program_id));
        assert_ne!(find_metadata_pda(0, &program_id).0, find_metadata_pda(1, &program_id).0);
        let account = Pubkey::new_unique();
        assert_ne!(find_frozen_pda(&account, &program_id).0, find_registry_pda(&program_id).0);
    }
}
