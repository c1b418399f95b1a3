pub mod ata;
pub mod create_mint;
pub mod freeze;
pub mod initialize;
pub mod metadata;
pub mod mint;
pub mod transfer;

pub use ata::*;
pub use create_mint::*;
pub use freeze::*;
pub use initialize::*;
pub use metadata::*;
pub use mint::*;
pub use transfer::*;
