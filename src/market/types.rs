//! Market-related types for PredictX binary markets.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{ClientError, Result, ValidationError};
use crate::program::{Market, UserHoldings};

/// Tradeable side of a binary market.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// First outcome (selector 1).
    #[strum(serialize = "1", serialize = "one", serialize = "outcome1")]
    #[default]
    One,
    /// Second outcome (selector 2).
    #[strum(serialize = "2", serialize = "two", serialize = "outcome2")]
    Two,
}

impl Outcome {
    /// Selector sent to the program.
    pub fn code(self) -> u8 {
        match self {
            Outcome::One => 1,
            Outcome::Two => 2,
        }
    }

    /// Parse a trade selector, accepting only 1 or 2.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Outcome::One),
            2 => Some(Outcome::Two),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Outcome {
    type Error = ValidationError;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        Outcome::from_code(code).ok_or(ValidationError::TradeOutcome(code))
    }
}

/// Final assertion made by the market authority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Outcome 1 won.
    #[strum(serialize = "1", serialize = "outcome1")]
    Outcome1,
    /// Outcome 2 won.
    #[strum(serialize = "2", serialize = "outcome2")]
    Outcome2,
    /// Market is void; both sides are refunded.
    #[strum(serialize = "3", serialize = "unresolvable", serialize = "void")]
    Unresolvable,
}

impl Resolution {
    /// Selector sent to the program.
    pub fn code(self) -> u8 {
        match self {
            Resolution::Outcome1 => 1,
            Resolution::Outcome2 => 2,
            Resolution::Unresolvable => 3,
        }
    }

    /// Parse a resolution selector, accepting 1, 2 or 3.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Resolution::Outcome1),
            2 => Some(Resolution::Outcome2),
            3 => Some(Resolution::Unresolvable),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Resolution {
    type Error = ValidationError;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        Resolution::from_code(code).ok_or(ValidationError::ResolutionOutcome(code))
    }
}

/// Market lifecycle as observed from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketState {
    /// No market account exists at the address.
    Uninitialized,
    /// Trading is open.
    Open,
    /// Resolved; only claims remain.
    Resolved(Resolution),
}

impl std::fmt::Display for MarketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketState::Uninitialized => write!(f, "uninitialized"),
            MarketState::Open => write!(f, "open"),
            MarketState::Resolved(resolution) => write!(f, "resolved ({})", resolution.code()),
        }
    }
}

impl MarketState {
    /// Whether buy and sell are still accepted.
    pub fn is_tradeable(&self) -> bool {
        matches!(self, MarketState::Open)
    }
}

/// Transaction kinds the client builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Create a market.
    CreateMarket,
    /// Buy outcome tokens.
    BuyOutcome,
    /// Sell outcome tokens.
    SellOutcome,
    /// Resolve a market.
    ResolveMarket,
    /// Claim winnings.
    ClaimWinnings,
}

impl Operation {
    /// Static label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Parameters for creating a market.
#[derive(Debug, Clone)]
pub struct CreateMarketParams {
    /// Market name (also an address seed).
    pub market_name: String,
    /// First outcome label.
    pub outcome1: String,
    /// Second outcome label.
    pub outcome2: String,
    /// Market description.
    pub description: String,
    /// Initial liquidity in SOL.
    pub initial_liquidity: f64,
    /// Settlement token mint.
    pub mint: Pubkey,
    /// Token account funding the liquidity (defaults to the authority's ATA).
    pub authority_token_account: Option<Pubkey>,
}

/// Parameters for buying outcome tokens.
#[derive(Debug, Clone)]
pub struct BuyOutcomeParams {
    /// Market address.
    pub market: Pubkey,
    /// Outcome selector (1 or 2).
    pub outcome: u8,
    /// Amount to spend in SOL.
    pub amount: f64,
    /// Settlement token mint.
    pub mint: Pubkey,
    /// Token account paying for the purchase (defaults to the buyer's ATA).
    pub buyer_token_account: Option<Pubkey>,
}

/// Parameters for selling outcome tokens.
#[derive(Debug, Clone)]
pub struct SellOutcomeParams {
    /// Market address.
    pub market: Pubkey,
    /// Outcome selector (1 or 2).
    pub outcome: u8,
    /// Number of tokens to sell.
    pub tokens_to_sell: u64,
}

/// Parameters for resolving a market.
#[derive(Debug, Clone)]
pub struct ResolveMarketParams {
    /// Market address.
    pub market: Pubkey,
    /// Resolution selector (1, 2, or 3 for unresolvable).
    pub outcome: u8,
}

/// Parameters for claiming winnings.
#[derive(Debug, Clone)]
pub struct ClaimWinningsParams {
    /// Market address.
    pub market: Pubkey,
    /// Settlement token mint.
    pub mint: Pubkey,
}

/// A market account with its address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketInfo {
    /// Market address.
    pub address: Pubkey,
    /// Decoded account.
    pub account: Market,
}

/// A holdings account with its address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingsInfo {
    /// Holdings address.
    pub address: Pubkey,
    /// Decoded account.
    pub account: UserHoldings,
}

/// A built, unsigned transaction waiting for submission.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    /// What the transaction does.
    pub operation: Operation,
    /// The unsigned transaction; the fee payer is the client signer.
    pub transaction: Transaction,
}

/// Class of a predictable transaction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// A parameter failed validation; nothing was sent.
    Validation,
    /// The client is missing a signer or configuration; nothing was sent.
    Configuration,
    /// The ledger or program rejected or failed to confirm the transaction.
    Submission,
}

impl FailureKind {
    /// Static label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Outcome of a transaction operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionResult {
    /// Transaction confirmed.
    Confirmed {
        /// Transaction signature.
        signature: Signature,
    },
    /// Transaction was not applied.
    Failed {
        /// Failure class.
        kind: FailureKind,
        /// Normalized error message.
        error: String,
    },
}

impl TransactionResult {
    /// Fold a client error into a failed result when it is a predictable
    /// failure; unexpected faults are returned as `Err`.
    pub fn from_error(err: ClientError) -> Result<Self> {
        let kind = match &err {
            ClientError::Validation(_) | ClientError::Derivation(_) => FailureKind::Validation,
            ClientError::MissingSigner { .. } | ClientError::Config(_) => {
                FailureKind::Configuration
            }
            ClientError::Gateway(_) => FailureKind::Submission,
            ClientError::Encoding(_) => return Err(err),
        };

        Ok(TransactionResult::Failed {
            kind,
            error: err.to_string(),
        })
    }

    /// Whether the transaction confirmed.
    pub fn is_success(&self) -> bool {
        matches!(self, TransactionResult::Confirmed { .. })
    }

    /// Confirmed signature.
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            TransactionResult::Confirmed { signature } => Some(signature),
            TransactionResult::Failed { .. } => None,
        }
    }

    /// Failure class and message.
    pub fn failure(&self) -> Option<(FailureKind, &str)> {
        match self {
            TransactionResult::Confirmed { .. } => None,
            TransactionResult::Failed { kind, error } => Some((*kind, error.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    #[test]
    fn outcome_from_string_works() {
        use std::str::FromStr;
        assert_eq!(Outcome::from_str("1").unwrap(), Outcome::One);
        assert_eq!(Outcome::from_str("two").unwrap(), Outcome::Two);
        assert!(Outcome::from_str("3").is_err());
        assert_eq!(Resolution::from_str("void").unwrap(), Resolution::Unresolvable);
    }

    #[test]
    fn selectors_round_trip_through_codes() {
        assert_eq!(Outcome::try_from(2u8), Ok(Outcome::Two));
        assert_eq!(Outcome::try_from(3u8), Err(ValidationError::TradeOutcome(3)));
        assert_eq!(Resolution::try_from(3u8), Ok(Resolution::Unresolvable));
        assert_eq!(Resolution::try_from(0u8), Err(ValidationError::ResolutionOutcome(0)));
    }

    #[test]
    fn operation_labels_are_snake_case() {
        assert_eq!(Operation::ClaimWinnings.to_string(), "claim_winnings");
        assert_eq!(Operation::CreateMarket.as_str(), "create_market");
        for operation in [
            Operation::CreateMarket,
            Operation::BuyOutcome,
            Operation::SellOutcome,
            Operation::ResolveMarket,
            Operation::ClaimWinnings,
        ] {
            assert_eq!(operation.as_str(), operation.to_string());
        }
        for kind in [
            FailureKind::Validation,
            FailureKind::Configuration,
            FailureKind::Submission,
        ] {
            assert_eq!(kind.as_str(), kind.to_string());
        }
        assert_eq!(FailureKind::Configuration.as_str(), "configuration");
    }

    #[test]
    fn predictable_errors_fold_into_failures() {
        let result = TransactionResult::from_error(ValidationError::MarketName { len: 0 }.into())
            .unwrap();
        assert_eq!(result.failure().map(|(kind, _)| kind), Some(FailureKind::Validation));

        let result = TransactionResult::from_error(ClientError::MissingSigner {
            operation: "buy_outcome",
        })
        .unwrap();
        assert_eq!(result.failure().map(|(kind, _)| kind), Some(FailureKind::Configuration));

        let result = TransactionResult::from_error(
            GatewayError::Rejected { reason: "Market is already resolved".into() }.into(),
        )
        .unwrap();
        let (kind, message) = result.failure().unwrap();
        assert_eq!(kind, FailureKind::Submission);
        assert!(message.contains("Market is already resolved"));
        assert!(!result.is_success());
    }

    #[test]
    fn unexpected_faults_propagate() {
        let fault = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(TransactionResult::from_error(fault.into()).is_err());
    }
}
