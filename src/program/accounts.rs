//! Readable program accounts.
//!
//! Both account types are stored as an 8-byte discriminator followed by the
//! Borsh-encoded fields. Accounts may carry trailing padding, so decoding never
//! requires the buffer to be fully consumed.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use super::{discriminator, DISCRIMINATOR_LEN};
use crate::market::types::{MarketState, Outcome, Resolution};

/// Errors decoding raw account data.
#[derive(Error, Debug)]
pub enum AccountDecodeError {
    /// Data is shorter than the discriminator.
    #[error("account data is {len} bytes, too short for a discriminator")]
    TooShort {
        /// Data length.
        len: usize,
    },

    /// Discriminator belongs to another account type.
    #[error("discriminator does not match {expected}")]
    DiscriminatorMismatch {
        /// Expected account type.
        expected: &'static str,
    },

    /// Field data is malformed.
    #[error("malformed fields: {0}")]
    Borsh(#[from] std::io::Error),

    /// Fields decode but violate the account invariants.
    #[error("inconsistent state: resolved={resolved}, asserted_outcome={asserted_outcome}")]
    InconsistentState {
        /// Resolved flag.
        resolved: bool,
        /// Raw asserted outcome.
        asserted_outcome: u8,
    },
}

/// A program-owned account type with an Anchor-style discriminator.
pub trait ProgramAccount: BorshSerialize + BorshDeserialize + Sized {
    /// Account type name hashed into the discriminator.
    const NAME: &'static str;

    /// Leading 8 bytes identifying this account type.
    fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        discriminator("account", Self::NAME)
    }

    /// Check invariants after the fields are decoded.
    fn check(&self) -> Result<(), AccountDecodeError> {
        Ok(())
    }

    /// Decode raw account data.
    fn decode(data: &[u8]) -> Result<Self, AccountDecodeError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(AccountDecodeError::TooShort { len: data.len() });
        }

        let (head, mut body) = data.split_at(DISCRIMINATOR_LEN);
        if head != Self::discriminator() {
            return Err(AccountDecodeError::DiscriminatorMismatch { expected: Self::NAME });
        }

        let account = Self::deserialize(&mut body)?;
        account.check()?;
        Ok(account)
    }

    /// Encode into raw account data.
    fn encode(&self) -> std::io::Result<Vec<u8>> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

/// On-chain market account.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Market {
    /// Market creator, the only party allowed to resolve.
    pub authority: Pubkey,
    /// Market name, part of the address seeds.
    pub name: String,
    /// First outcome label.
    pub outcome1: String,
    /// Second outcome label.
    pub outcome2: String,
    /// Free-form description.
    pub description: String,
    /// Whether the market has been resolved.
    pub resolved: bool,
    /// 0 = unset, 1 = outcome 1, 2 = outcome 2, 3 = unresolvable.
    pub asserted_outcome: u8,
    /// Outstanding outcome-1 tokens.
    pub outcome1_supply: u64,
    /// Outstanding outcome-2 tokens.
    pub outcome2_supply: u64,
    /// Settlement token mint.
    pub mint: Pubkey,
    /// Treasury token account.
    pub treasury: Pubkey,
    /// Bump of the market address.
    pub bump: u8,
}

impl ProgramAccount for Market {
    const NAME: &'static str = "Market";

    fn check(&self) -> Result<(), AccountDecodeError> {
        let consistent = match (self.resolved, self.asserted_outcome) {
            (false, 0) => true,
            (true, code) => Resolution::from_code(code).is_some(),
            _ => false,
        };

        if consistent {
            Ok(())
        } else {
            Err(AccountDecodeError::InconsistentState {
                resolved: self.resolved,
                asserted_outcome: self.asserted_outcome,
            })
        }
    }
}

impl Market {
    /// Asserted resolution, if the market is resolved.
    pub fn resolution(&self) -> Option<Resolution> {
        if self.resolved {
            Resolution::from_code(self.asserted_outcome)
        } else {
            None
        }
    }

    /// Lifecycle state of an existing market.
    pub fn state(&self) -> MarketState {
        match self.resolution() {
            Some(resolution) => MarketState::Resolved(resolution),
            None => MarketState::Open,
        }
    }

    /// Label of an outcome.
    pub fn label(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::One => &self.outcome1,
            Outcome::Two => &self.outcome2,
        }
    }

    /// Token supply of an outcome.
    pub fn supply(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::One => self.outcome1_supply,
            Outcome::Two => self.outcome2_supply,
        }
    }
}

/// Per-user, per-market outcome token balances.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserHoldings {
    /// Owning user.
    pub user: Pubkey,
    /// Owning market.
    pub market: Pubkey,
    /// Outcome-1 token balance.
    pub outcome1_tokens: u64,
    /// Outcome-2 token balance.
    pub outcome2_tokens: u64,
    /// Bump of the holdings address.
    pub bump: u8,
}

impl ProgramAccount for UserHoldings {
    const NAME: &'static str = "UserHoldings";
}

impl UserHoldings {
    /// Balance of an outcome.
    pub fn balance(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::One => self.outcome1_tokens,
            Outcome::Two => self.outcome2_tokens,
        }
    }

    /// Sum of both balances, saturating.
    pub fn total_tokens(&self) -> u64 {
        self.outcome1_tokens.saturating_add(self.outcome2_tokens)
    }
}
