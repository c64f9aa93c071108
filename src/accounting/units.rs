//! Conversions between lamports, SOL and outcome tokens.
//!
//! SOL values are `Decimal` so that lamport amounts convert exactly. Amounts
//! typed by a caller arrive as `f64` and go through [`sol_from_f64`], which
//! takes the shortest decimal representation of the float before flooring to
//! lamports. Converting SOL to lamports or tokens always truncates toward zero.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Price of one outcome token in lamports.
///
/// Tokens are pegged 1:1 to SOL; the market has no pricing curve.
pub const PRICE_PER_TOKEN: u64 = LAMPORTS_PER_SOL;

fn lamports_scale() -> Decimal {
    Decimal::from(LAMPORTS_PER_SOL)
}

/// Convert lamports to SOL.
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) / lamports_scale()
}

/// Convert SOL to lamports, flooring sub-lamport fractions.
///
/// Returns `None` for negative values or values that overflow `u64`.
pub fn sol_to_lamports(sol: Decimal) -> Option<u64> {
    if sol.is_sign_negative() {
        return None;
    }
    sol.checked_mul(lamports_scale())?.floor().to_u64()
}

/// Convert an outcome-token count to its SOL value.
pub fn tokens_to_sol(tokens: u64) -> Decimal {
    Decimal::from(tokens) * Decimal::from(PRICE_PER_TOKEN) / lamports_scale()
}

/// Convert a SOL value to whole outcome tokens, flooring.
pub fn sol_to_tokens(sol: Decimal) -> Option<u64> {
    let lamports = sol_to_lamports(sol)?;
    Some(lamports / PRICE_PER_TOKEN)
}

/// Convert a caller-supplied float to SOL. `None` for NaN or infinities.
pub fn sol_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn lamports_to_sol_is_exact() {
        assert_eq!(lamports_to_sol(1_500_000_000), dec!(1.5));
        assert_eq!(lamports_to_sol(1), dec!(0.000000001));
        assert_eq!(lamports_to_sol(0), Decimal::ZERO);
    }

    #[test]
    fn sol_to_lamports_floors() {
        assert_eq!(sol_to_lamports(dec!(2)), Some(2_000_000_000));
        assert_eq!(sol_to_lamports(dec!(0.0000000019)), Some(1));
        assert_eq!(sol_to_lamports(dec!(-1)), None);
    }

    #[test]
    fn whole_sol_round_trips() {
        for sol in [0u64, 1, 7, 1_000, 18_000_000_000] {
            let lamports = sol * LAMPORTS_PER_SOL;
            assert_eq!(sol_to_lamports(lamports_to_sol(lamports)), Some(lamports));
        }
    }

    #[test]
    fn float_input_does_not_lose_a_lamport() {
        // 0.3 * 1e9 in binary floating point is 299999999.99999994
        let sol = sol_from_f64(0.3).unwrap();
        assert_eq!(sol_to_lamports(sol), Some(300_000_000));
        assert_eq!(sol_from_f64(f64::NAN), None);
        assert_eq!(sol_from_f64(f64::INFINITY), None);
    }

    #[test]
    fn tokens_are_pegged_to_sol() {
        assert_eq!(tokens_to_sol(5), dec!(5));
        assert_eq!(sol_to_tokens(dec!(2.9)), Some(2));
        assert_eq!(sol_to_tokens(dec!(0.5)), Some(0));
    }
}
