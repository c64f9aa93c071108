//! Unified error types for the market client.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Unified error type for the market client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Caller-supplied parameter failed a precondition.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Operation requires a signer but the client is read-only.
    #[error("a signer is required for {operation}")]
    MissingSigner {
        /// The operation that needed the signer.
        operation: &'static str,
    },

    /// Address derivation failed.
    #[error("address derivation failed: {0}")]
    Derivation(#[from] PdaError),

    /// Ledger or program boundary error.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Instruction encoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] std::io::Error),
}

/// Parameter validation errors. Each variant names the failing field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Market name must be 1..=50 characters.
    #[error("market_name must be 1..=50 characters, got {len}")]
    MarketName {
        /// Actual length.
        len: usize,
    },

    /// Market name does not fit in an address seed.
    #[error("market_name is {len} bytes, address seeds allow at most {max}")]
    MarketNameSeed {
        /// Name length in bytes.
        len: usize,
        /// Seed limit in bytes.
        max: usize,
    },

    /// Outcome label must be 1..=100 characters.
    #[error("{field} must be 1..=100 characters, got {len}")]
    OutcomeLabel {
        /// `outcome1` or `outcome2`.
        field: &'static str,
        /// Actual length.
        len: usize,
    },

    /// Description must be 1..=500 characters.
    #[error("description must be 1..=500 characters, got {len}")]
    Description {
        /// Actual length.
        len: usize,
    },

    /// Amount must be positive and finite.
    #[error("{field} must be a positive finite amount, got {value}")]
    Amount {
        /// Name of the amount field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Amount does not fit in a 64-bit lamport count.
    #[error("{field} is too large, got {value}")]
    AmountTooLarge {
        /// Name of the amount field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Amount is valid but rounds down to zero base units.
    #[error("{field} is below the smallest representable unit")]
    AmountTooSmall {
        /// Name of the amount field.
        field: &'static str,
    },

    /// Trade outcome selector must be 1 or 2.
    #[error("outcome must be 1 or 2 for trades, got {0}")]
    TradeOutcome(u8),

    /// Resolution selector must be 1, 2 or 3.
    #[error("outcome must be 1, 2 or 3 for resolution, got {0}")]
    ResolutionOutcome(u8),
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MarketName { .. } => "market_name",
            ValidationError::MarketNameSeed { .. } => "market_name",
            ValidationError::OutcomeLabel { field, .. } => *field,
            ValidationError::Description { .. } => "description",
            ValidationError::Amount { field, .. } => *field,
            ValidationError::AmountTooLarge { field, .. } => *field,
            ValidationError::AmountTooSmall { field } => *field,
            ValidationError::TradeOutcome(_) => "outcome",
            ValidationError::ResolutionOutcome(_) => "outcome",
        }
    }
}

/// Program-derived address errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdaError {
    /// A seed exceeds the platform seed-length limit.
    #[error("seed is {len} bytes, limit is {max}")]
    SeedTooLong {
        /// Seed length in bytes.
        len: usize,
        /// Platform limit.
        max: usize,
    },

    /// No bump seed yields an off-curve address.
    #[error("no viable bump seed for address")]
    NoViableBump,
}

/// Errors at the ledger/program boundary.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport or RPC failure.
    #[error("rpc request failed: {0}")]
    Rpc(String),

    /// The program or the ledger rejected the transaction.
    #[error("transaction rejected: {reason}")]
    Rejected {
        /// Normalized rejection reason.
        reason: String,
    },

    /// Account data could not be decoded.
    #[error("failed to decode account {address}: {reason}")]
    Decode {
        /// Account address.
        address: Pubkey,
        /// Reason for failure.
        reason: String,
    },

    /// Transaction could not be signed.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment could not be parsed.
    #[error("environment: {0}")]
    Env(#[from] envy::Error),

    /// Program id is not a valid base58 public key.
    #[error("invalid program id {0}")]
    InvalidProgramId(String),

    /// Unknown commitment level.
    #[error("invalid commitment {0}, expected processed, confirmed or finalized")]
    InvalidCommitment(String),

    /// RPC URL is empty.
    #[error("rpc url is empty")]
    MissingRpcUrl,

    /// Keypair file could not be read.
    #[error("failed to read keypair {path}: {reason}")]
    Keypair {
        /// Keypair file path.
        path: String,
        /// Reason for failure.
        reason: String,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_name_their_field() {
        assert_eq!(ValidationError::MarketName { len: 51 }.field(), "market_name");
        assert_eq!(
            ValidationError::OutcomeLabel { field: "outcome2", len: 0 }.field(),
            "outcome2"
        );
        assert_eq!(
            ValidationError::Amount { field: "initial_liquidity", value: 0.0 }.field(),
            "initial_liquidity"
        );
        assert_eq!(ValidationError::ResolutionOutcome(4).field(), "outcome");
    }

    #[test]
    fn client_error_wraps_validation() {
        let err: ClientError = ValidationError::TradeOutcome(3).into();
        assert!(err.to_string().contains("outcome must be 1 or 2"));
    }
}
