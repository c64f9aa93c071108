//! Market statistics, user positions and redeemable value.

use rust_decimal::Decimal;
use serde::Serialize;

use super::units::tokens_to_sol;
use crate::market::types::Resolution;
use crate::program::{Market, UserHoldings};

/// Supply-derived market statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketStats {
    /// Outstanding outcome-1 tokens.
    pub outcome1_supply: u64,
    /// Outstanding outcome-2 tokens.
    pub outcome2_supply: u64,
    /// Outcome-1 price in SOL.
    pub outcome1_price: Decimal,
    /// Outcome-2 price in SOL.
    pub outcome2_price: Decimal,
    /// SOL value of all outstanding tokens.
    pub total_liquidity: Decimal,
}

impl MarketStats {
    /// Statistics from the two outcome supplies.
    ///
    /// Prices are fixed at 1 SOL per token.
    pub fn from_supplies(outcome1_supply: u64, outcome2_supply: u64) -> Self {
        // Summed in SOL so two full u64 supplies cannot overflow.
        let total_liquidity = tokens_to_sol(outcome1_supply) + tokens_to_sol(outcome2_supply);

        Self {
            outcome1_supply,
            outcome2_supply,
            outcome1_price: Decimal::ONE,
            outcome2_price: Decimal::ONE,
            total_liquidity,
        }
    }
}

impl From<&Market> for MarketStats {
    fn from(market: &Market) -> Self {
        Self::from_supplies(market.outcome1_supply, market.outcome2_supply)
    }
}

/// A user's outcome balances and their SOL value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPosition {
    /// Outcome-1 tokens held.
    pub outcome1_tokens: u64,
    /// Outcome-2 tokens held.
    pub outcome2_tokens: u64,
    /// SOL value of outcome-1 tokens.
    pub outcome1_value: Decimal,
    /// SOL value of outcome-2 tokens.
    pub outcome2_value: Decimal,
    /// Combined SOL value.
    pub total_value: Decimal,
}

impl UserPosition {
    /// Position from the two balances.
    pub fn from_balances(outcome1_tokens: u64, outcome2_tokens: u64) -> Self {
        let outcome1_value = tokens_to_sol(outcome1_tokens);
        let outcome2_value = tokens_to_sol(outcome2_tokens);
        Self {
            outcome1_tokens,
            outcome2_tokens,
            outcome1_value,
            outcome2_value,
            total_value: outcome1_value + outcome2_value,
        }
    }
}

impl From<Option<&UserHoldings>> for UserPosition {
    fn from(holdings: Option<&UserHoldings>) -> Self {
        match holdings {
            Some(h) => Self::from_balances(h.outcome1_tokens, h.outcome2_tokens),
            None => Self::from_balances(0, 0),
        }
    }
}

/// Redeemable tokens for the given resolution and balances.
///
/// Unresolved markets (`None`) redeem nothing.
pub fn redeemable_tokens(resolution: Option<Resolution>, balance1: u64, balance2: u64) -> u64 {
    match resolution {
        Some(Resolution::Outcome1) => balance1,
        Some(Resolution::Outcome2) => balance2,
        Some(Resolution::Unresolvable) => balance1.saturating_add(balance2),
        None => 0,
    }
}

/// SOL value a user could claim from a market.
///
/// Missing holdings count as zero balances.
pub fn potential_winnings(market: &Market, holdings: Option<&UserHoldings>) -> Decimal {
    let (balance1, balance2) = holdings
        .map(|h| (h.outcome1_tokens, h.outcome2_tokens))
        .unwrap_or_default();

    if balance1 == 0 && balance2 == 0 {
        return Decimal::ZERO;
    }

    tokens_to_sol(redeemable_tokens(market.resolution(), balance1, balance2))
}
