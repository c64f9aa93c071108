//! Market client: builds, submits and reads back market transactions.

use std::sync::Arc;

use rust_decimal::Decimal;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use tracing::{debug, info, instrument, warn};

use crate::accounting::{potential_winnings, MarketStats, UserPosition};
use crate::error::{ClientError, Result};
use crate::metrics;
use crate::program::instruction::{self, InitializeMarketArgs};
use crate::program::{pda, Market, UserHoldings};

use super::gateway::ProgramGateway;
use super::types::{
    BuyOutcomeParams, ClaimWinningsParams, CreateMarketParams, HoldingsInfo, MarketInfo,
    MarketState, Operation, PendingTransaction, ResolveMarketParams, SellOutcomeParams,
    TransactionResult,
};

/// Client for one market program.
///
/// Without a signer the client can still read and derive addresses, but every
/// transaction operation fails with a configuration error.
pub struct MarketClient<G> {
    /// Ledger/program boundary.
    gateway: G,
    /// Target program.
    program_id: Pubkey,
    /// Signing wallet, also the fee payer.
    signer: Option<Arc<Keypair>>,
}

impl<G: ProgramGateway> MarketClient<G> {
    /// Create a read-only client.
    pub fn new(gateway: G) -> Self {
        let program_id = gateway.program_id();
        Self {
            gateway,
            program_id,
            signer: None,
        }
    }

    /// Attach a signing wallet.
    pub fn with_signer(mut self, signer: impl Into<Arc<Keypair>>) -> Self {
        self.signer = Some(signer.into());
        self
    }

    /// The underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Public key of the configured signer.
    pub fn signer_pubkey(&self) -> Option<Pubkey> {
        self.signer.as_ref().map(|s| s.pubkey())
    }

    fn require_signer(&self, operation: Operation) -> Result<&Keypair> {
        self.signer
            .as_deref()
            .ok_or(ClientError::MissingSigner {
                operation: operation.as_str(),
            })
    }

    fn pending(
        &self,
        operation: Operation,
        payer: &Pubkey,
        ix: Instruction,
    ) -> PendingTransaction {
        PendingTransaction {
            operation,
            transaction: Transaction::new_with_payer(&[ix], Some(payer)),
        }
    }

    // === Addresses ===

    /// Market address for `(authority, name)`.
    pub fn market_address(&self, authority: &Pubkey, name: &str) -> Result<Pubkey> {
        Ok(pda::market_address(&self.program_id, authority, name)?.address)
    }

    /// Treasury address of a market.
    pub fn treasury_address(&self, market: &Pubkey) -> Pubkey {
        pda::treasury_address(&self.program_id, market).address
    }

    /// Holdings address of `user` in `market`.
    pub fn user_holdings_address(&self, user: &Pubkey, market: &Pubkey) -> Pubkey {
        pda::user_holdings_address(&self.program_id, user, market).address
    }

    // === Transaction builders ===

    /// Build a create-market transaction signed by the client's wallet as
    /// authority.
    pub fn build_create_market(&self, params: &CreateMarketParams) -> Result<PendingTransaction> {
        let initial_liquidity = params.validate()?;
        let authority = self.require_signer(Operation::CreateMarket)?.pubkey();

        let ix = instruction::initialize_market(
            &self.program_id,
            &authority,
            &params.mint,
            params.authority_token_account,
            InitializeMarketArgs {
                outcome1: params.outcome1.clone(),
                outcome2: params.outcome2.clone(),
                description: params.description.clone(),
                initial_liquidity,
                market_name: params.market_name.clone(),
            },
        )?;
        Ok(self.pending(Operation::CreateMarket, &authority, ix))
    }

    /// Build a buy transaction.
    pub fn build_buy_outcome(&self, params: &BuyOutcomeParams) -> Result<PendingTransaction> {
        let (outcome, amount) = params.validate()?;
        let buyer = self.require_signer(Operation::BuyOutcome)?.pubkey();

        let ix = instruction::buy_outcome(
            &self.program_id,
            &buyer,
            &params.market,
            &params.mint,
            params.buyer_token_account,
            outcome.code(),
            amount,
        )?;
        Ok(self.pending(Operation::BuyOutcome, &buyer, ix))
    }

    /// Build a sell transaction.
    pub fn build_sell_outcome(&self, params: &SellOutcomeParams) -> Result<PendingTransaction> {
        let outcome = params.validate()?;
        let seller = self.require_signer(Operation::SellOutcome)?.pubkey();

        let ix = instruction::sell_outcome(
            &self.program_id,
            &seller,
            &params.market,
            outcome.code(),
            params.tokens_to_sell,
        )?;
        Ok(self.pending(Operation::SellOutcome, &seller, ix))
    }

    /// Build a resolve transaction. Authority is enforced by the program.
    pub fn build_resolve_market(&self, params: &ResolveMarketParams) -> Result<PendingTransaction> {
        let resolution = params.validate()?;
        let authority = self.require_signer(Operation::ResolveMarket)?.pubkey();

        let ix = instruction::resolve_market(
            &self.program_id,
            &authority,
            &params.market,
            resolution.code(),
        )?;
        Ok(self.pending(Operation::ResolveMarket, &authority, ix))
    }

    /// Build a claim transaction.
    pub fn build_claim_winnings(&self, params: &ClaimWinningsParams) -> Result<PendingTransaction> {
        params.validate()?;
        let user = self.require_signer(Operation::ClaimWinnings)?.pubkey();

        let ix = instruction::claim_winnings(&self.program_id, &user, &params.market, &params.mint)?;
        Ok(self.pending(Operation::ClaimWinnings, &user, ix))
    }

    // === Submission ===

    fn fail(&self, operation: Operation, err: ClientError) -> Result<TransactionResult> {
        let result = TransactionResult::from_error(err)?;
        if let Some((kind, error)) = result.failure() {
            warn!(operation = %operation, kind = %kind, error = %error, "Transaction failed");
            metrics::inc_tx_failed(operation.as_str(), kind.as_str());
        }
        Ok(result)
    }

    /// Sign and submit a built transaction.
    ///
    /// Submission is attempted once; a failure is reported, never retried.
    #[instrument(skip(self, pending), fields(operation = %pending.operation))]
    pub async fn submit(&self, pending: PendingTransaction) -> Result<TransactionResult> {
        let operation = pending.operation;
        let signer = match self.require_signer(operation) {
            Ok(signer) => signer,
            Err(e) => return self.fail(operation, e),
        };

        metrics::inc_tx_submitted(operation.as_str());
        match self.gateway.submit(pending.transaction, signer).await {
            Ok(signature) => {
                metrics::inc_tx_confirmed(operation.as_str());
                info!(operation = %operation, signature = %signature, "Transaction confirmed");
                Ok(TransactionResult::Confirmed { signature })
            }
            Err(e) => self.fail(operation, e.into()),
        }
    }

    async fn run(
        &self,
        operation: Operation,
        built: Result<PendingTransaction>,
    ) -> Result<TransactionResult> {
        match built {
            Ok(pending) => self.submit(pending).await,
            Err(e) => self.fail(operation, e),
        }
    }

    /// Create a market with the client's wallet as authority.
    #[instrument(skip(self, params), fields(name = %params.market_name))]
    pub async fn create_market(&self, params: &CreateMarketParams) -> Result<TransactionResult> {
        self.run(Operation::CreateMarket, self.build_create_market(params))
            .await
    }

    /// Buy outcome tokens.
    #[instrument(skip(self, params), fields(market = %params.market, outcome = params.outcome))]
    pub async fn buy_outcome(&self, params: &BuyOutcomeParams) -> Result<TransactionResult> {
        self.run(Operation::BuyOutcome, self.build_buy_outcome(params))
            .await
    }

    /// Sell outcome tokens.
    #[instrument(skip(self, params), fields(market = %params.market, outcome = params.outcome))]
    pub async fn sell_outcome(&self, params: &SellOutcomeParams) -> Result<TransactionResult> {
        self.run(Operation::SellOutcome, self.build_sell_outcome(params))
            .await
    }

    /// Resolve a market.
    #[instrument(skip(self, params), fields(market = %params.market, outcome = params.outcome))]
    pub async fn resolve_market(&self, params: &ResolveMarketParams) -> Result<TransactionResult> {
        self.run(Operation::ResolveMarket, self.build_resolve_market(params))
            .await
    }

    /// Claim winnings from a resolved market.
    ///
    /// A confirmed claim must not be resubmitted; later claims pay nothing.
    #[instrument(skip(self, params), fields(market = %params.market))]
    pub async fn claim_winnings(&self, params: &ClaimWinningsParams) -> Result<TransactionResult> {
        self.run(Operation::ClaimWinnings, self.build_claim_winnings(params))
            .await
    }

    // === Reads ===

    /// Read a market. `None` if it does not exist.
    #[instrument(skip(self))]
    pub async fn get_market(&self, market: &Pubkey) -> Result<Option<Market>> {
        let account = self.gateway.fetch_market(market).await?;
        if account.is_none() {
            debug!("Market account not found");
            metrics::inc_read_misses("market");
        }
        Ok(account)
    }

    /// Read a user's holdings in a market. `None` before the first buy.
    #[instrument(skip(self))]
    pub async fn get_user_holdings(
        &self,
        user: &Pubkey,
        market: &Pubkey,
    ) -> Result<Option<UserHoldings>> {
        let address = self.user_holdings_address(user, market);
        let account = self.gateway.fetch_user_holdings(&address).await?;
        if account.is_none() {
            debug!(holdings = %address, "Holdings account not found");
            metrics::inc_read_misses("user_holdings");
        }
        Ok(account)
    }

    /// Supply-derived statistics. `None` if the market does not exist.
    pub async fn get_market_stats(&self, market: &Pubkey) -> Result<Option<MarketStats>> {
        Ok(self.get_market(market).await?.as_ref().map(MarketStats::from))
    }

    /// A user's position. Missing holdings give an empty position.
    pub async fn get_user_position(&self, user: &Pubkey, market: &Pubkey) -> Result<UserPosition> {
        let holdings = self.get_user_holdings(user, market).await?;
        Ok(UserPosition::from(holdings.as_ref()))
    }

    /// SOL a user could claim now. Zero for unresolved or missing markets.
    #[instrument(skip(self))]
    pub async fn get_potential_winnings(&self, user: &Pubkey, market: &Pubkey) -> Result<Decimal> {
        let holdings_address = self.user_holdings_address(user, market);
        let (market, holdings) = self
            .gateway
            .fetch_market_with_holdings(market, &holdings_address)
            .await?;

        let winnings = match market {
            Some(market) => potential_winnings(&market, holdings.as_ref()),
            None => {
                metrics::inc_read_misses("market");
                Decimal::ZERO
            }
        };
        debug!(winnings = %winnings, "Computed potential winnings");
        Ok(winnings)
    }

    /// Lifecycle state as currently recorded on the ledger.
    pub async fn market_state(&self, market: &Pubkey) -> Result<MarketState> {
        Ok(match self.get_market(market).await? {
            Some(account) => account.state(),
            None => MarketState::Uninitialized,
        })
    }

    /// Markets created by `authority`.
    #[instrument(skip(self))]
    pub async fn markets_by_authority(&self, authority: &Pubkey) -> Result<Vec<MarketInfo>> {
        Ok(self.gateway.markets_by_authority(authority).await?)
    }

    /// Every holdings record of `user`.
    #[instrument(skip(self))]
    pub async fn holdings_by_user(&self, user: &Pubkey) -> Result<Vec<HoldingsInfo>> {
        Ok(self.gateway.holdings_by_user(user).await?)
    }
}
