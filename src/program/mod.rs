//! On-chain program contract.
//!
//! The PredictX program itself lives outside this crate. This module pins down
//! everything the client needs to talk to it:
//! - [`pda`]: deterministic account addresses
//! - [`instruction`]: instruction data and ordered account lists
//! - [`accounts`]: readable account layouts
//! - [`error`]: program error codes

pub mod accounts;
pub mod error;
pub mod instruction;
pub mod pda;

use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

pub use accounts::{Market, ProgramAccount, UserHoldings};
pub use error::MarketProgramError;
pub use instruction::MarketInstruction;

/// Deployed PredictX program id.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("2X5Y9i9Y4b8qbUiZiNaMc1Eh2qsarETH7bjDkhFrPuza");

/// Seed tag for market accounts.
pub const MARKET_SEED: &[u8] = b"market";
/// Seed tag for treasury accounts.
pub const TREASURY_SEED: &[u8] = b"treasury";
/// Seed tag for user holdings accounts.
pub const USER_HOLDINGS_SEED: &[u8] = b"user_holdings";

/// Length of the account and instruction discriminators.
pub const DISCRIMINATOR_LEN: usize = 8;

/// First 8 bytes of `sha256("<namespace>:<name>")`.
pub(crate) fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    out
}
