//! Program-derived addresses for markets, treasuries and user holdings.
//!
//! Every account the program owns lives at an address computed from a fixed
//! seed tuple, so any party holding the seeds finds the same account without a
//! registry lookup.

use solana_sdk::pubkey::{Pubkey, MAX_SEED_LEN};

use super::{MARKET_SEED, TREASURY_SEED, USER_HOLDINGS_SEED};
use crate::error::PdaError;

/// A derived address together with the bump seed that makes it valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivedAddress {
    /// The program-derived address.
    pub address: Pubkey,
    /// Bump seed appended to the seeds.
    pub bump: u8,
}

fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<DerivedAddress, PdaError> {
    if let Some(seed) = seeds.iter().find(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(PdaError::SeedTooLong {
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }

    Pubkey::try_find_program_address(seeds, program_id)
        .map(|(address, bump)| DerivedAddress { address, bump })
        .ok_or(PdaError::NoViableBump)
}

/// Market address for `(authority, name)`.
///
/// Fails when the name is longer than the platform seed limit (32 bytes).
pub fn market_address(
    program_id: &Pubkey,
    authority: &Pubkey,
    name: &str,
) -> Result<DerivedAddress, PdaError> {
    derive(&[MARKET_SEED, authority.as_ref(), name.as_bytes()], program_id)
}

/// Treasury address of a market.
pub fn treasury_address(program_id: &Pubkey, market: &Pubkey) -> DerivedAddress {
    let (address, bump) = Pubkey::find_program_address(&[TREASURY_SEED, market.as_ref()], program_id);
    DerivedAddress { address, bump }
}

/// Holdings address of `user` in `market`.
pub fn user_holdings_address(program_id: &Pubkey, user: &Pubkey, market: &Pubkey) -> DerivedAddress {
    let (address, bump) = Pubkey::find_program_address(
        &[USER_HOLDINGS_SEED, user.as_ref(), market.as_ref()],
        program_id,
    );
    DerivedAddress { address, bump }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::PROGRAM_ID;

    #[test]
    fn market_derivation_is_deterministic() {
        let authority = Pubkey::new_unique();
        let first = market_address(&PROGRAM_ID, &authority, "m1").unwrap();
        let second = market_address(&PROGRAM_ID, &authority, "m1").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn market_derivation_matches_raw_seeds() {
        let authority = Pubkey::new_unique();
        let derived = market_address(&PROGRAM_ID, &authority, "championship").unwrap();
        let (expected, bump) = Pubkey::find_program_address(
            &[b"market", authority.as_ref(), b"championship"],
            &PROGRAM_ID,
        );
        assert_eq!(derived.address, expected);
        assert_eq!(derived.bump, bump);
    }

    #[test]
    fn every_seed_changes_the_address() {
        let authority = Pubkey::new_unique();
        let other_authority = Pubkey::new_unique();
        let base = market_address(&PROGRAM_ID, &authority, "m1").unwrap();

        assert_ne!(base, market_address(&PROGRAM_ID, &other_authority, "m1").unwrap());
        assert_ne!(base, market_address(&PROGRAM_ID, &authority, "m2").unwrap());
        assert_ne!(base, market_address(&Pubkey::new_unique(), &authority, "m1").unwrap());

        let market = base.address;
        let user = Pubkey::new_unique();
        let holdings = user_holdings_address(&PROGRAM_ID, &user, &market);
        assert_ne!(holdings, user_holdings_address(&PROGRAM_ID, &Pubkey::new_unique(), &market));
        assert_ne!(holdings, user_holdings_address(&PROGRAM_ID, &user, &Pubkey::new_unique()));

        let treasury = treasury_address(&PROGRAM_ID, &market);
        assert_ne!(treasury, treasury_address(&PROGRAM_ID, &Pubkey::new_unique()));
        assert_ne!(treasury.address, market);
    }

    #[test]
    fn derived_addresses_are_off_curve() {
        let market = market_address(&PROGRAM_ID, &Pubkey::new_unique(), "m1").unwrap();
        assert!(!market.address.is_on_curve());
        let treasury = treasury_address(&PROGRAM_ID, &market.address);
        assert!(!treasury.address.is_on_curve());
    }

    #[test]
    fn long_name_is_rejected() {
        let authority = Pubkey::new_unique();
        assert!(market_address(&PROGRAM_ID, &authority, &"a".repeat(32)).is_ok());

        let err = market_address(&PROGRAM_ID, &authority, &"a".repeat(33)).unwrap_err();
        assert_eq!(err, PdaError::SeedTooLong { len: 33, max: 32 });
    }
}
