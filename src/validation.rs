//! Parameter checks run before any transaction is built.
//!
//! The `is_valid_*` predicates are independent of each other. The `check_*`
//! helpers wrap them and report the failing field.

use solana_sdk::pubkey::MAX_SEED_LEN;

use crate::accounting::{sol_from_f64, sol_to_lamports};
use crate::error::ValidationError;
use crate::market::types::{
    BuyOutcomeParams, ClaimWinningsParams, CreateMarketParams, Outcome, Resolution,
    ResolveMarketParams, SellOutcomeParams,
};

/// Longest market name, in characters.
pub const MAX_MARKET_NAME_LEN: usize = 50;
/// Longest outcome label, in characters.
pub const MAX_OUTCOME_LABEL_LEN: usize = 100;
/// Longest description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

fn within(text: &str, max: usize) -> bool {
    let len = text.chars().count();
    len > 0 && len <= max
}

pub fn is_valid_market_name(name: &str) -> bool {
    within(name, MAX_MARKET_NAME_LEN)
}

pub fn is_valid_outcome_label(label: &str) -> bool {
    within(label, MAX_OUTCOME_LABEL_LEN)
}

pub fn is_valid_description(description: &str) -> bool {
    within(description, MAX_DESCRIPTION_LEN)
}

/// Strictly positive and finite. NaN fails.
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

pub fn is_valid_trade_outcome(outcome: u8) -> bool {
    Outcome::from_code(outcome).is_some()
}

/// 1, 2, or 3 for unresolvable.
pub fn is_valid_resolution_outcome(outcome: u8) -> bool {
    Resolution::from_code(outcome).is_some()
}

pub fn check_market_name(name: &str) -> Result<(), ValidationError> {
    if is_valid_market_name(name) {
        Ok(())
    } else {
        Err(ValidationError::MarketName {
            len: name.chars().count(),
        })
    }
}

/// Market names are an address seed, so they must also fit in
/// `MAX_SEED_LEN` bytes.
pub fn check_market_name_seed(name: &str) -> Result<(), ValidationError> {
    if name.len() <= MAX_SEED_LEN {
        Ok(())
    } else {
        Err(ValidationError::MarketNameSeed {
            len: name.len(),
            max: MAX_SEED_LEN,
        })
    }
}

pub fn check_outcome_label(field: &'static str, label: &str) -> Result<(), ValidationError> {
    if is_valid_outcome_label(label) {
        Ok(())
    } else {
        Err(ValidationError::OutcomeLabel {
            field,
            len: label.chars().count(),
        })
    }
}

pub fn check_description(description: &str) -> Result<(), ValidationError> {
    if is_valid_description(description) {
        Ok(())
    } else {
        Err(ValidationError::Description {
            len: description.chars().count(),
        })
    }
}

/// Validate a SOL amount and convert it to lamports.
///
/// Amounts below one lamport are rejected since they would send zero.
pub fn check_amount(field: &'static str, amount: f64) -> Result<u64, ValidationError> {
    if !is_valid_amount(amount) {
        return Err(ValidationError::Amount {
            field,
            value: amount,
        });
    }

    let lamports = sol_from_f64(amount)
        .and_then(sol_to_lamports)
        .ok_or(ValidationError::AmountTooLarge {
            field,
            value: amount,
        })?;

    if lamports == 0 {
        return Err(ValidationError::AmountTooSmall { field });
    }
    Ok(lamports)
}

pub fn check_trade_outcome(outcome: u8) -> Result<Outcome, ValidationError> {
    Outcome::try_from(outcome)
}

pub fn check_resolution_outcome(outcome: u8) -> Result<Resolution, ValidationError> {
    Resolution::try_from(outcome)
}

impl CreateMarketParams {
    /// Check every field; returns the initial liquidity in lamports.
    pub fn validate(&self) -> Result<u64, ValidationError> {
        check_market_name(&self.market_name)?;
        check_market_name_seed(&self.market_name)?;
        check_outcome_label("outcome1", &self.outcome1)?;
        check_outcome_label("outcome2", &self.outcome2)?;
        check_description(&self.description)?;
        check_amount("initial_liquidity", self.initial_liquidity)
    }
}

impl BuyOutcomeParams {
    /// Check the selector and amount; returns the amount in lamports.
    pub fn validate(&self) -> Result<(Outcome, u64), ValidationError> {
        let outcome = check_trade_outcome(self.outcome)?;
        let lamports = check_amount("amount", self.amount)?;
        Ok((outcome, lamports))
    }
}

impl SellOutcomeParams {
    pub fn validate(&self) -> Result<Outcome, ValidationError> {
        let outcome = check_trade_outcome(self.outcome)?;
        if self.tokens_to_sell == 0 {
            return Err(ValidationError::Amount {
                field: "tokens_to_sell",
                value: 0.0,
            });
        }
        Ok(outcome)
    }
}

impl ResolveMarketParams {
    pub fn validate(&self) -> Result<Resolution, ValidationError> {
        check_resolution_outcome(self.outcome)
    }
}

impl ClaimWinningsParams {
    /// Claims carry no caller-supplied values to check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
