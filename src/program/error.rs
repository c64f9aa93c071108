//! Error codes returned by the PredictX program.

use thiserror::Error;

/// Offset of the first custom program error code.
pub const CUSTOM_ERROR_OFFSET: u32 = 6000;

/// Errors that may be returned by the PredictX program.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum MarketProgramError {
    #[error("Invalid outcome specified")]
    InvalidOutcome = 0,

    #[error("Invalid amount")]
    InvalidAmount = 1,

    #[error("Market is already resolved")]
    MarketAlreadyResolved = 2,

    #[error("Market is not resolved")]
    MarketNotResolved = 3,

    #[error("Insufficient liquidity")]
    InsufficientLiquidity = 4,

    #[error("Insufficient tokens")]
    InsufficientTokens = 5,

    #[error("No tokens to claim")]
    NoTokensToClaim = 6,

    #[error("Unauthorized")]
    Unauthorized = 7,
}

impl MarketProgramError {
    /// Custom error code as reported in a failed transaction.
    pub fn code(self) -> u32 {
        CUSTOM_ERROR_OFFSET + self as u32
    }

    /// Map a custom error code back to the program error.
    pub fn from_code(code: u32) -> Option<Self> {
        let error = match code.checked_sub(CUSTOM_ERROR_OFFSET)? {
            0 => Self::InvalidOutcome,
            1 => Self::InvalidAmount,
            2 => Self::MarketAlreadyResolved,
            3 => Self::MarketNotResolved,
            4 => Self::InsufficientLiquidity,
            5 => Self::InsufficientTokens,
            6 => Self::NoTokensToClaim,
            7 => Self::Unauthorized,
            _ => return None,
        };
        Some(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_start_at_custom_offset() {
        assert_eq!(MarketProgramError::InvalidOutcome.code(), 6000);
        assert_eq!(MarketProgramError::Unauthorized.code(), 6007);
    }

    #[test]
    fn from_code_works() {
        assert_eq!(
            MarketProgramError::from_code(6002),
            Some(MarketProgramError::MarketAlreadyResolved)
        );
        assert_eq!(MarketProgramError::from_code(6008), None);
        assert_eq!(MarketProgramError::from_code(42), None);
    }
}
