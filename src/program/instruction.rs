//! Instruction data and account lists for the five market instructions.
//!
//! Instruction data is an 8-byte method discriminator followed by the Borsh
//! encoding of the arguments in declaration order.

use std::io;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::{system_program, sysvar};
use spl_associated_token_account::get_associated_token_address;

use super::pda::{market_address, treasury_address, user_holdings_address};
use super::{discriminator, DISCRIMINATOR_LEN};
use crate::error::Result;

/// Arguments of `initialize_market`.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct InitializeMarketArgs {
    /// First outcome label.
    pub outcome1: String,
    /// Second outcome label.
    pub outcome2: String,
    /// Market description.
    pub description: String,
    /// Liquidity escrowed into the treasury, in lamports.
    pub initial_liquidity: u64,
    /// Market name.
    pub market_name: String,
}

/// A program instruction with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketInstruction {
    /// Create a market and escrow its initial liquidity.
    InitializeMarket(InitializeMarketArgs),
    /// Buy outcome tokens for `amount` lamports.
    BuyOutcome {
        /// Outcome selector.
        outcome: u8,
        /// Lamports to spend.
        amount: u64,
    },
    /// Sell outcome tokens back to the treasury.
    SellOutcome {
        /// Outcome selector.
        outcome: u8,
        /// Token count.
        tokens_to_sell: u64,
    },
    /// Assert the final outcome.
    ResolveMarket {
        /// Resolution selector.
        outcome: u8,
    },
    /// Redeem holdings after resolution.
    ClaimWinnings,
}

const METHODS: [&str; 5] = [
    "initialize_market",
    "buy_outcome",
    "sell_outcome",
    "resolve_market",
    "claim_winnings",
];

impl MarketInstruction {
    /// Program method name.
    pub fn method_name(&self) -> &'static str {
        match self {
            MarketInstruction::InitializeMarket(_) => METHODS[0],
            MarketInstruction::BuyOutcome { .. } => METHODS[1],
            MarketInstruction::SellOutcome { .. } => METHODS[2],
            MarketInstruction::ResolveMarket { .. } => METHODS[3],
            MarketInstruction::ClaimWinnings => METHODS[4],
        }
    }

    /// Serialize into instruction data.
    pub fn pack(&self) -> io::Result<Vec<u8>> {
        let mut data = discriminator("global", self.method_name()).to_vec();
        match self {
            MarketInstruction::InitializeMarket(args) => args.serialize(&mut data)?,
            MarketInstruction::BuyOutcome { outcome, amount } => {
                outcome.serialize(&mut data)?;
                amount.serialize(&mut data)?;
            }
            MarketInstruction::SellOutcome {
                outcome,
                tokens_to_sell,
            } => {
                outcome.serialize(&mut data)?;
                tokens_to_sell.serialize(&mut data)?;
            }
            MarketInstruction::ResolveMarket { outcome } => outcome.serialize(&mut data)?,
            MarketInstruction::ClaimWinnings => {}
        }
        Ok(data)
    }

    /// Parse instruction data.
    pub fn unpack(data: &[u8]) -> io::Result<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "instruction data shorter than discriminator",
            ));
        }

        let (tag, mut rest) = data.split_at(DISCRIMINATOR_LEN);
        let method = METHODS
            .iter()
            .find(|name| discriminator("global", name) == tag)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown instruction"))?;

        let instruction = match *method {
            "initialize_market" => {
                MarketInstruction::InitializeMarket(InitializeMarketArgs::deserialize(&mut rest)?)
            }
            "buy_outcome" => MarketInstruction::BuyOutcome {
                outcome: u8::deserialize(&mut rest)?,
                amount: u64::deserialize(&mut rest)?,
            },
            "sell_outcome" => MarketInstruction::SellOutcome {
                outcome: u8::deserialize(&mut rest)?,
                tokens_to_sell: u64::deserialize(&mut rest)?,
            },
            "resolve_market" => MarketInstruction::ResolveMarket {
                outcome: u8::deserialize(&mut rest)?,
            },
            _ => MarketInstruction::ClaimWinnings,
        };
        Ok(instruction)
    }
}

/// Build `initialize_market`.
///
/// `authority_token_account` defaults to the authority's associated token
/// account for `mint`.
pub fn initialize_market(
    program_id: &Pubkey,
    authority: &Pubkey,
    mint: &Pubkey,
    authority_token_account: Option<Pubkey>,
    args: InitializeMarketArgs,
) -> Result<Instruction> {
    let market = market_address(program_id, authority, &args.market_name)?.address;
    let treasury = treasury_address(program_id, &market).address;
    let authority_token_account =
        authority_token_account.unwrap_or_else(|| get_associated_token_address(authority, mint));

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(market, false),
            AccountMeta::new(*mint, false),
            AccountMeta::new(treasury, false),
            AccountMeta::new(authority_token_account, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
        data: MarketInstruction::InitializeMarket(args).pack()?,
    })
}

/// Build `buy_outcome`. `amount` is in lamports.
pub fn buy_outcome(
    program_id: &Pubkey,
    buyer: &Pubkey,
    market: &Pubkey,
    mint: &Pubkey,
    buyer_token_account: Option<Pubkey>,
    outcome: u8,
    amount: u64,
) -> Result<Instruction> {
    let treasury = treasury_address(program_id, market).address;
    let holdings = user_holdings_address(program_id, buyer, market).address;
    let buyer_token_account =
        buyer_token_account.unwrap_or_else(|| get_associated_token_address(buyer, mint));

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*market, false),
            AccountMeta::new(*mint, false),
            AccountMeta::new(treasury, false),
            AccountMeta::new(buyer_token_account, false),
            AccountMeta::new(holdings, false),
            AccountMeta::new(*buyer, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
        data: MarketInstruction::BuyOutcome { outcome, amount }.pack()?,
    })
}

/// Build `sell_outcome`.
pub fn sell_outcome(
    program_id: &Pubkey,
    seller: &Pubkey,
    market: &Pubkey,
    outcome: u8,
    tokens_to_sell: u64,
) -> Result<Instruction> {
    let holdings = user_holdings_address(program_id, seller, market).address;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*market, false),
            AccountMeta::new(holdings, false),
            AccountMeta::new(*seller, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: MarketInstruction::SellOutcome {
            outcome,
            tokens_to_sell,
        }
        .pack()?,
    })
}

/// Build `resolve_market`.
pub fn resolve_market(
    program_id: &Pubkey,
    authority: &Pubkey,
    market: &Pubkey,
    outcome: u8,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*market, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: MarketInstruction::ResolveMarket { outcome }.pack()?,
    })
}

/// Build `claim_winnings`. Winnings always land in the user's associated
/// token account.
pub fn claim_winnings(
    program_id: &Pubkey,
    user: &Pubkey,
    market: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction> {
    let treasury = treasury_address(program_id, market).address;
    let holdings = user_holdings_address(program_id, user, market).address;
    let user_token_account = get_associated_token_address(user, mint);

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*market, false),
            AccountMeta::new(*mint, false),
            AccountMeta::new(treasury, false),
            AccountMeta::new(user_token_account, false),
            AccountMeta::new(holdings, false),
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(spl_associated_token_account::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
        data: MarketInstruction::ClaimWinnings.pack()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::PROGRAM_ID;
    use pretty_assertions::assert_eq;

    fn args() -> InitializeMarketArgs {
        InitializeMarketArgs {
            outcome1: "A".to_string(),
            outcome2: "B".to_string(),
            description: "Who wins?".to_string(),
            initial_liquidity: 10_000_000_000,
            market_name: "m1".to_string(),
        }
    }

    #[test]
    fn buy_data_layout() {
        let data = MarketInstruction::BuyOutcome {
            outcome: 1,
            amount: 2_000_000_000,
        }
        .pack()
        .unwrap();

        assert_eq!(data.len(), 8 + 1 + 8);
        assert_eq!(&data[..8], &discriminator("global", "buy_outcome"));
        assert_eq!(data[8], 1);
        assert_eq!(&data[9..], &2_000_000_000u64.to_le_bytes());
    }

    #[test]
    fn claim_carries_only_discriminator() {
        let data = MarketInstruction::ClaimWinnings.pack().unwrap();
        assert_eq!(data, discriminator("global", "claim_winnings").to_vec());
    }

    #[test]
    fn unpack_reads_back_every_method() {
        let instructions = [
            MarketInstruction::InitializeMarket(args()),
            MarketInstruction::SellOutcome {
                outcome: 2,
                tokens_to_sell: 7,
            },
            MarketInstruction::ResolveMarket { outcome: 3 },
            MarketInstruction::ClaimWinnings,
        ];
        for ix in instructions {
            assert_eq!(MarketInstruction::unpack(&ix.pack().unwrap()).unwrap(), ix);
        }
    }

    #[test]
    fn unpack_rejects_unknown_tag() {
        assert!(MarketInstruction::unpack(&[0u8; 12]).is_err());
        assert!(MarketInstruction::unpack(&[1, 2]).is_err());
    }

    #[test]
    fn initialize_market_accounts() {
        let authority = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = initialize_market(&PROGRAM_ID, &authority, &mint, None, args()).unwrap();

        let market = market_address(&PROGRAM_ID, &authority, "m1").unwrap().address;
        assert_eq!(ix.accounts.len(), 8);
        assert_eq!(ix.accounts[0].pubkey, market);
        assert_eq!(ix.accounts[2].pubkey, treasury_address(&PROGRAM_ID, &market).address);
        assert_eq!(
            ix.accounts[3].pubkey,
            get_associated_token_address(&authority, &mint)
        );
        assert!(ix.accounts[4].is_signer);
        assert_eq!(ix.accounts[4].pubkey, authority);
    }

    #[test]
    fn buy_uses_supplied_token_account() {
        let buyer = Pubkey::new_unique();
        let market = Pubkey::new_unique();
        let token_account = Pubkey::new_unique();
        let ix = buy_outcome(
            &PROGRAM_ID,
            &buyer,
            &market,
            &Pubkey::new_unique(),
            Some(token_account),
            1,
            1,
        )
        .unwrap();

        assert_eq!(ix.accounts[3].pubkey, token_account);
        assert_eq!(
            ix.accounts[4].pubkey,
            user_holdings_address(&PROGRAM_ID, &buyer, &market).address
        );
    }

    #[test]
    fn resolve_requires_only_market_and_authority() {
        let authority = Pubkey::new_unique();
        let ix = resolve_market(&PROGRAM_ID, &authority, &Pubkey::new_unique(), 3).unwrap();
        assert_eq!(ix.accounts.len(), 2);
        assert!(ix.accounts[1].is_signer);
        assert!(!ix.accounts[1].is_writable);
    }

    #[test]
    fn claim_includes_associated_token_program() {
        let ix = claim_winnings(
            &PROGRAM_ID,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
        )
        .unwrap();
        assert_eq!(ix.accounts.len(), 10);
        assert_eq!(ix.accounts[8].pubkey, spl_associated_token_account::id());
    }

    #[test]
    fn long_market_name_fails_derivation() {
        let mut long = args();
        long.market_name = "x".repeat(33);
        let result = initialize_market(
            &PROGRAM_ID,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            None,
            long,
        );
        assert!(matches!(result, Err(crate::error::ClientError::Derivation(_))));
    }
}
