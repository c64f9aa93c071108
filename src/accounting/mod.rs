//! Unit conversion and supply-derived accounting.

pub mod stats;
pub mod units;

pub use stats::{potential_winnings, redeemable_tokens, MarketStats, UserPosition};
pub use units::{
    lamports_to_sol, sol_from_f64, sol_to_lamports, sol_to_tokens, tokens_to_sol,
    LAMPORTS_PER_SOL, PRICE_PER_TOKEN,
};
