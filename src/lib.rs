//! Client for the PredictX binary-outcome prediction market on Solana.
//!
//! The market program runs on-chain; this crate builds and submits its five
//! transactions and reads its accounts back:
//!
//! ```text
//! create_market ──► Open ──► buy / sell ──► resolve_market ──► Resolved ──► claim_winnings
//! ```
//!
//! Every account lives at a program-derived address, so markets, treasuries
//! and holdings are found from their seeds alone. Outcome tokens are pegged
//! 1:1 to SOL.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`program`]: On-chain contract (addresses, instructions, accounts)
//! - [`accounting`]: Unit conversion, statistics and winnings
//! - [`validation`]: Parameter checks
//! - [`market`]: Market client and ledger gateways
//! - [`metrics`]: Submission and read metrics

pub mod accounting;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod program;
pub mod validation;

pub use config::Config;
pub use error::{ClientError, Result};
pub use market::MarketClient;
