pub const REGISTRY_SEED: &[u8] = b"ztoken";
pub const METADATA_SEED: &[u8] = b"metadata";
pub const FROZEN_SEED: &[u8] = b"frozen";

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 10;

/// Highest decimals accepted for a new mint.
pub const MAX_DECIMALS: u8 = 9;
