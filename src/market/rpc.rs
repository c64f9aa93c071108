//! JSON-RPC implementation of [`ProgramGateway`].

use std::time::Instant;

use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::Transaction;
use tracing::{debug, instrument};

use super::gateway::{decode_account, map_rpc_error, ProgramGateway};
use super::types::{HoldingsInfo, MarketInfo};
use crate::config::Config;
use crate::error::{ConfigError, GatewayError};
use crate::metrics;
use crate::program::{Market, ProgramAccount, UserHoldings, DISCRIMINATOR_LEN};

/// Gateway backed by a Solana JSON-RPC node.
pub struct RpcGateway {
    client: RpcClient,
    program_id: Pubkey,
    commitment: CommitmentConfig,
}

impl RpcGateway {
    /// Connect to `url` for `program_id`.
    pub fn new(
        url: impl Into<String>,
        program_id: Pubkey,
        commitment: CommitmentConfig,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(url.into(), timeout, commitment),
            program_id,
            commitment,
        }
    }

    /// Build a gateway from the application configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.solana_rpc_url.clone(),
            config.program_id()?,
            config.commitment()?,
            config.timeout(),
        ))
    }

    /// RPC endpoint.
    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Only accounts owned by the program are decoded.
    fn owned_data<'a>(
        &self,
        address: &Pubkey,
        account: &'a Account,
    ) -> Result<&'a [u8], GatewayError> {
        if account.owner != self.program_id {
            return Err(GatewayError::Decode {
                address: *address,
                reason: format!("owned by {}, not the market program", account.owner),
            });
        }
        Ok(&account.data)
    }

    async fn fetch<T: ProgramAccount>(
        &self,
        address: &Pubkey,
        kind: &'static str,
    ) -> Result<Option<T>, GatewayError> {
        let start = Instant::now();
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(map_rpc_error);
        metrics::record_account_fetch_latency(start, kind);

        match response?.value {
            Some(account) => {
                let data = self.owned_data(address, &account)?;
                decode_account(address, data).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Program accounts of type `T` whose first field equals `key`.
    async fn scan<T: ProgramAccount>(
        &self,
        key: &Pubkey,
    ) -> Result<Vec<(Pubkey, T)>, GatewayError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(0, &T::discriminator())),
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                    DISCRIMINATOR_LEN,
                    key.as_ref(),
                )),
            ]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..Default::default()
            },
            ..Default::default()
        };

        let start = Instant::now();
        let accounts = self
            .client
            .get_program_accounts_with_config(&self.program_id, config)
            .await
            .map_err(map_rpc_error);
        metrics::record_account_fetch_latency(start, T::NAME);

        accounts?
            .into_iter()
            .map(|(address, account)| {
                decode_account(&address, &account.data).map(|decoded| (address, decoded))
            })
            .collect()
    }
}

#[async_trait]
impl ProgramGateway for RpcGateway {
    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    #[instrument(skip(self))]
    async fn fetch_market(&self, address: &Pubkey) -> Result<Option<Market>, GatewayError> {
        self.fetch(address, "market").await
    }

    #[instrument(skip(self))]
    async fn fetch_user_holdings(
        &self,
        address: &Pubkey,
    ) -> Result<Option<UserHoldings>, GatewayError> {
        self.fetch(address, "user_holdings").await
    }

    #[instrument(skip(self))]
    async fn fetch_market_with_holdings(
        &self,
        market: &Pubkey,
        holdings: &Pubkey,
    ) -> Result<(Option<Market>, Option<UserHoldings>), GatewayError> {
        let start = Instant::now();
        let response = self
            .client
            .get_multiple_accounts_with_commitment(&[*market, *holdings], self.commitment)
            .await
            .map_err(map_rpc_error);
        metrics::record_account_fetch_latency(start, "market_with_holdings");

        let mut accounts = response?.value.into_iter();
        let market_account = accounts.next().flatten();
        let holdings_account = accounts.next().flatten();

        let market = match market_account {
            Some(account) => Some(decode_account(market, self.owned_data(market, &account)?)?),
            None => None,
        };
        let holdings = match holdings_account {
            Some(account) => Some(decode_account(
                holdings,
                self.owned_data(holdings, &account)?,
            )?),
            None => None,
        };
        Ok((market, holdings))
    }

    #[instrument(skip(self))]
    async fn markets_by_authority(
        &self,
        authority: &Pubkey,
    ) -> Result<Vec<MarketInfo>, GatewayError> {
        let markets = self.scan::<Market>(authority).await?;
        debug!(count = markets.len(), "Fetched markets by authority");
        Ok(markets
            .into_iter()
            .map(|(address, account)| MarketInfo { address, account })
            .collect())
    }

    #[instrument(skip(self))]
    async fn holdings_by_user(&self, user: &Pubkey) -> Result<Vec<HoldingsInfo>, GatewayError> {
        let holdings = self.scan::<UserHoldings>(user).await?;
        debug!(count = holdings.len(), "Fetched holdings by user");
        Ok(holdings
            .into_iter()
            .map(|(address, account)| HoldingsInfo { address, account })
            .collect())
    }

    #[instrument(skip(self, transaction, signer))]
    async fn submit(
        &self,
        mut transaction: Transaction,
        signer: &Keypair,
    ) -> Result<Signature, GatewayError> {
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(map_rpc_error)?;

        let signers: [&Keypair; 1] = [signer];
        transaction
            .try_sign(&signers[..], blockhash)
            .map_err(|e| GatewayError::Signing(e.to_string()))?;

        let _timer = metrics::timer_tx_submit();
        self.client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(map_rpc_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::PROGRAM_ID;
    use std::time::Duration;

    #[test]
    fn from_config_uses_configured_values() {
        let config = Config {
            solana_rpc_url: "http://127.0.0.1:8899".to_string(),
            ..Config::default()
        };
        let gateway = RpcGateway::from_config(&config).unwrap();
        assert_eq!(gateway.url(), "http://127.0.0.1:8899");
        assert_eq!(gateway.program_id(), PROGRAM_ID);
    }

    #[test]
    fn from_config_rejects_invalid_config() {
        let config = Config {
            solana_commitment: "eventually".to_string(),
            ..Config::default()
        };
        assert!(RpcGateway::from_config(&config).is_err());
    }

    #[test]
    fn owned_data_rejects_foreign_accounts() {
        let gateway = RpcGateway::new(
            "http://127.0.0.1:8899",
            PROGRAM_ID,
            CommitmentConfig::confirmed(),
            Duration::from_secs(1),
        );
        let account = Account {
            owner: Pubkey::new_unique(),
            data: vec![0u8; 16],
            ..Account::default()
        };
        assert!(gateway.owned_data(&Pubkey::new_unique(), &account).is_err());
    }
}
