//! Market module for PredictX binary markets.
//!
//! This module handles:
//! - Market types, parameters and transaction results
//! - The market client (build, submit, read)
//! - The gateway boundary to the ledger, over JSON-RPC or in memory

pub mod client;
pub mod gateway;
pub mod mock;
pub mod rpc;
pub mod types;

pub use client::MarketClient;
pub use gateway::ProgramGateway;
pub use mock::{MockConfig, MockProgram};
pub use rpc::RpcGateway;
pub use types::{
    BuyOutcomeParams, ClaimWinningsParams, CreateMarketParams, FailureKind, HoldingsInfo,
    MarketInfo, MarketState, Operation, Outcome, PendingTransaction, Resolution,
    ResolveMarketParams, SellOutcomeParams, TransactionResult,
};
