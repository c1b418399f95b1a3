use anchor_lang::prelude::*;

#[error_code]
pub enum ZtokenError {
    #[msg("Insufficient funds for transfer")]
    InsufficientFunds,

    #[msg("unauthorized")]
    Unauthorized,

    #[msg("Account is frozen")]
    AccountFrozen,

    #[msg("Registry is already initialized")]
    AlreadyInitialized,

    #[msg("Name exceeds maximum length of 32 bytes")]
    NameTooLong,

    #[msg("Name must not be empty")]
    InvalidName,

    #[msg("Symbol exceeds maximum length of 10 bytes")]
    SymbolTooLong,

    #[msg("Symbol must not be empty")]
    InvalidSymbol,

    #[msg("Decimals exceed the maximum of 9")]
    InvalidDecimals,

    #[msg("Token account does not belong to this mint")]
    MintMismatch,

    #[msg("Freeze record does not describe the token account owner")]
    FreezeRecordMismatch,

    #[msg("Token metadata does not match the requested id")]
    MetadataMismatch,

    #[msg("Token account still holds a balance")]
    AccountNotEmpty,

    #[msg("Token metadata not found")]
    TokenNotFound,

    #[msg("Arithmetic overflow")]
    Overflow,

    #[msg("Transfer needs a positive amount between two distinct accounts")]
    InvalidTransfer,
}
