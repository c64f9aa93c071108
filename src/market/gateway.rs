//! Boundary to the ledger and the on-chain program.
//!
//! [`MarketClient`](super::MarketClient) never talks to the network directly;
//! it goes through a [`ProgramGateway`]. [`RpcGateway`](super::RpcGateway)
//! speaks JSON-RPC, [`MockProgram`](super::MockProgram) keeps the accounts in
//! memory.

use async_trait::async_trait;
use solana_client::client_error::ClientError as RpcClientError;
use solana_sdk::instruction::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::{Transaction, TransactionError};

use super::types::{HoldingsInfo, MarketInfo};
use crate::error::GatewayError;
use crate::program::{Market, MarketProgramError, ProgramAccount, UserHoldings};

/// Reads and submissions against a deployed market program.
///
/// Every method performs one network exchange. Missing accounts are `Ok(None)`.
#[async_trait]
pub trait ProgramGateway: Send + Sync {
    /// Program the gateway targets.
    fn program_id(&self) -> Pubkey;

    /// Read a market account.
    async fn fetch_market(&self, address: &Pubkey) -> Result<Option<Market>, GatewayError>;

    /// Read a holdings account.
    async fn fetch_user_holdings(
        &self,
        address: &Pubkey,
    ) -> Result<Option<UserHoldings>, GatewayError>;

    /// Read a market and a holdings account together.
    ///
    /// The default issues two reads; transports with a batched read override it.
    async fn fetch_market_with_holdings(
        &self,
        market: &Pubkey,
        holdings: &Pubkey,
    ) -> Result<(Option<Market>, Option<UserHoldings>), GatewayError> {
        let market = self.fetch_market(market).await?;
        let holdings = self.fetch_user_holdings(holdings).await?;
        Ok((market, holdings))
    }

    /// All markets created by `authority`.
    async fn markets_by_authority(&self, authority: &Pubkey)
        -> Result<Vec<MarketInfo>, GatewayError>;

    /// All holdings records of `user`.
    async fn holdings_by_user(&self, user: &Pubkey) -> Result<Vec<HoldingsInfo>, GatewayError>;

    /// Sign with a fresh blockhash, submit, and wait for confirmation.
    async fn submit(
        &self,
        transaction: Transaction,
        signer: &Keypair,
    ) -> Result<Signature, GatewayError>;
}

/// Decode raw account data, tagging failures with the address.
pub fn decode_account<T: ProgramAccount>(address: &Pubkey, data: &[u8]) -> Result<T, GatewayError> {
    T::decode(data).map_err(|e| GatewayError::Decode {
        address: *address,
        reason: e.to_string(),
    })
}

/// Normalize a transaction error into a rejection reason.
///
/// Custom program codes become the program's error message.
pub fn rejection_reason(error: &TransactionError) -> String {
    match error {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            match MarketProgramError::from_code(*code) {
                Some(program_error) => program_error.to_string(),
                None => format!("custom program error {code}"),
            }
        }
        other => other.to_string(),
    }
}

/// Map an RPC client error into a gateway error.
pub fn map_rpc_error(error: RpcClientError) -> GatewayError {
    match error.get_transaction_error() {
        Some(tx_error) => GatewayError::Rejected {
            reason: rejection_reason(&tx_error),
        },
        None => GatewayError::Rpc(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_codes_normalize_to_program_messages() {
        let err = TransactionError::InstructionError(0, InstructionError::Custom(6002));
        assert_eq!(rejection_reason(&err), "Market is already resolved");

        let err = TransactionError::InstructionError(0, InstructionError::Custom(6007));
        assert_eq!(rejection_reason(&err), "Unauthorized");
    }

    #[test]
    fn unknown_codes_keep_the_number() {
        let err = TransactionError::InstructionError(1, InstructionError::Custom(3012));
        assert_eq!(rejection_reason(&err), "custom program error 3012");
    }

    #[test]
    fn other_transaction_errors_pass_through() {
        let err = TransactionError::BlockhashNotFound;
        assert_eq!(rejection_reason(&err), err.to_string());
    }

    #[test]
    fn decode_errors_carry_the_address() {
        let address = Pubkey::new_unique();
        let err = decode_account::<Market>(&address, &[0u8; 4]).unwrap_err();
        assert!(matches!(err, GatewayError::Decode { address: a, .. } if a == address));
    }
}
