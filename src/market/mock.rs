//! In-memory market program for testing.
//!
//! [`MockProgram`] implements [`ProgramGateway`] without a network. Submitted
//! transactions are signed, their instructions decoded, and the program's
//! state transitions applied to an in-memory account map. A transaction either
//! applies completely or not at all.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::Transaction;
use tracing::debug;

use super::gateway::{decode_account, ProgramGateway};
use super::types::{HoldingsInfo, MarketInfo, Outcome};
use crate::accounting::{lamports_to_sol, redeemable_tokens, sol_to_tokens, PRICE_PER_TOKEN};
use crate::error::GatewayError;
use crate::program::instruction::InitializeMarketArgs;
use crate::program::pda::{market_address, treasury_address, user_holdings_address};
use crate::program::{
    Market, MarketInstruction, MarketProgramError, ProgramAccount, UserHoldings,
    DISCRIMINATOR_LEN, PROGRAM_ID,
};

/// Configuration for mock program behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether to fail every submission before it reaches the program.
    pub fail_submissions: bool,
    /// Whether to fail account reads.
    pub fail_reads: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Default)]
struct Ledger {
    /// Program-owned account data by address.
    accounts: HashMap<Pubkey, Vec<u8>>,
    /// Escrowed lamports by treasury address.
    treasuries: HashMap<Pubkey, u64>,
    /// Lamports paid out by wallet.
    paid_out: HashMap<Pubkey, u64>,
    submissions: usize,
}

fn reject(error: MarketProgramError) -> GatewayError {
    GatewayError::Rejected {
        reason: error.to_string(),
    }
}

fn runtime_reject(reason: &str) -> GatewayError {
    GatewayError::Rejected {
        reason: reason.to_string(),
    }
}

fn account_at(accounts: &[Pubkey], index: usize) -> Result<Pubkey, GatewayError> {
    accounts
        .get(index)
        .copied()
        .ok_or_else(|| runtime_reject("not enough account keys"))
}

impl Ledger {
    fn load<T: ProgramAccount>(&self, address: &Pubkey) -> Result<Option<T>, GatewayError> {
        self.accounts
            .get(address)
            .map(|data| decode_account(address, data))
            .transpose()
    }

    fn store<T: ProgramAccount>(&mut self, address: Pubkey, account: &T) -> Result<(), GatewayError> {
        let data = account
            .encode()
            .map_err(|e| GatewayError::Rpc(format!("encode {address}: {e}")))?;
        self.accounts.insert(address, data);
        Ok(())
    }

    fn load_market(&self, address: &Pubkey) -> Result<Market, GatewayError> {
        self.load(address)?
            .ok_or_else(|| runtime_reject("market account not initialized"))
    }

    fn escrow(&mut self, treasury: Pubkey, lamports: u64) -> Result<(), GatewayError> {
        let balance = self.treasuries.entry(treasury).or_default();
        *balance = balance
            .checked_add(lamports)
            .ok_or(reject(MarketProgramError::InvalidAmount))?;
        Ok(())
    }

    fn pay(&mut self, treasury: Pubkey, to: Pubkey, lamports: u64) -> Result<(), GatewayError> {
        let balance = self.treasuries.entry(treasury).or_default();
        *balance = balance
            .checked_sub(lamports)
            .ok_or(reject(MarketProgramError::InsufficientLiquidity))?;
        *self.paid_out.entry(to).or_default() += lamports;
        Ok(())
    }

    fn apply(
        &mut self,
        program_id: &Pubkey,
        accounts: &[Pubkey],
        instruction: MarketInstruction,
    ) -> Result<(), GatewayError> {
        match instruction {
            MarketInstruction::InitializeMarket(args) => self.initialize(program_id, accounts, args),
            MarketInstruction::BuyOutcome { outcome, amount } => {
                self.buy(program_id, accounts, outcome, amount)
            }
            MarketInstruction::SellOutcome {
                outcome,
                tokens_to_sell,
            } => self.sell(program_id, accounts, outcome, tokens_to_sell),
            MarketInstruction::ResolveMarket { outcome } => self.resolve(accounts, outcome),
            MarketInstruction::ClaimWinnings => self.claim(program_id, accounts),
        }
    }

    fn initialize(
        &mut self,
        program_id: &Pubkey,
        accounts: &[Pubkey],
        args: InitializeMarketArgs,
    ) -> Result<(), GatewayError> {
        let market = account_at(accounts, 0)?;
        let mint = account_at(accounts, 1)?;
        let treasury = account_at(accounts, 2)?;
        let authority = account_at(accounts, 4)?;

        let derived = market_address(program_id, &authority, &args.market_name)
            .map_err(|e| runtime_reject(&e.to_string()))?;
        if derived.address != market || treasury_address(program_id, &market).address != treasury {
            return Err(runtime_reject("seeds constraint violated"));
        }
        if self.accounts.contains_key(&market) {
            return Err(runtime_reject("market account already in use"));
        }

        self.escrow(treasury, args.initial_liquidity)?;
        self.store(
            market,
            &Market {
                authority,
                name: args.market_name,
                outcome1: args.outcome1,
                outcome2: args.outcome2,
                description: args.description,
                resolved: false,
                asserted_outcome: 0,
                outcome1_supply: 0,
                outcome2_supply: 0,
                mint,
                treasury,
                bump: derived.bump,
            },
        )
    }

    fn buy(
        &mut self,
        program_id: &Pubkey,
        accounts: &[Pubkey],
        outcome: u8,
        amount: u64,
    ) -> Result<(), GatewayError> {
        let market_key = account_at(accounts, 0)?;
        let treasury = account_at(accounts, 2)?;
        let holdings_key = account_at(accounts, 4)?;
        let buyer = account_at(accounts, 5)?;

        let outcome = Outcome::from_code(outcome).ok_or(reject(MarketProgramError::InvalidOutcome))?;
        if amount == 0 {
            return Err(reject(MarketProgramError::InvalidAmount));
        }

        let mut market = self.load_market(&market_key)?;
        if !market.state().is_tradeable() {
            return Err(reject(MarketProgramError::MarketAlreadyResolved));
        }

        let tokens = sol_to_tokens(lamports_to_sol(amount)).unwrap_or(0);
        if tokens == 0 {
            return Err(reject(MarketProgramError::InvalidAmount));
        }

        let derived = user_holdings_address(program_id, &buyer, &market_key);
        if derived.address != holdings_key || treasury != market.treasury {
            return Err(runtime_reject("seeds constraint violated"));
        }

        let mut holdings = self
            .load::<UserHoldings>(&holdings_key)?
            .unwrap_or(UserHoldings {
                user: buyer,
                market: market_key,
                outcome1_tokens: 0,
                outcome2_tokens: 0,
                bump: derived.bump,
            });

        let overflow = || reject(MarketProgramError::InvalidAmount);
        let (supply, balance) = match outcome {
            Outcome::One => (&mut market.outcome1_supply, &mut holdings.outcome1_tokens),
            Outcome::Two => (&mut market.outcome2_supply, &mut holdings.outcome2_tokens),
        };
        *supply = supply.checked_add(tokens).ok_or_else(overflow)?;
        *balance = balance.checked_add(tokens).ok_or_else(overflow)?;

        self.escrow(treasury, amount)?;
        self.store(market_key, &market)?;
        self.store(holdings_key, &holdings)
    }

    fn sell(
        &mut self,
        program_id: &Pubkey,
        accounts: &[Pubkey],
        outcome: u8,
        tokens_to_sell: u64,
    ) -> Result<(), GatewayError> {
        let market_key = account_at(accounts, 0)?;
        let holdings_key = account_at(accounts, 1)?;
        let seller = account_at(accounts, 2)?;

        let outcome = Outcome::from_code(outcome).ok_or(reject(MarketProgramError::InvalidOutcome))?;
        if tokens_to_sell == 0 {
            return Err(reject(MarketProgramError::InvalidAmount));
        }

        let mut market = self.load_market(&market_key)?;
        if !market.state().is_tradeable() {
            return Err(reject(MarketProgramError::MarketAlreadyResolved));
        }

        if user_holdings_address(program_id, &seller, &market_key).address != holdings_key {
            return Err(runtime_reject("seeds constraint violated"));
        }
        let mut holdings = self
            .load::<UserHoldings>(&holdings_key)?
            .ok_or_else(|| runtime_reject("holdings account not initialized"))?;

        if holdings.balance(outcome) < tokens_to_sell {
            return Err(reject(MarketProgramError::InsufficientTokens));
        }
        let (balance, supply) = match outcome {
            Outcome::One => (&mut holdings.outcome1_tokens, &mut market.outcome1_supply),
            Outcome::Two => (&mut holdings.outcome2_tokens, &mut market.outcome2_supply),
        };
        *balance -= tokens_to_sell;
        *supply = supply
            .checked_sub(tokens_to_sell)
            .ok_or(reject(MarketProgramError::InvalidAmount))?;

        let payout = tokens_to_sell
            .checked_mul(PRICE_PER_TOKEN)
            .ok_or(reject(MarketProgramError::InvalidAmount))?;
        self.pay(market.treasury, seller, payout)?;
        self.store(market_key, &market)?;
        self.store(holdings_key, &holdings)
    }

    fn resolve(&mut self, accounts: &[Pubkey], outcome: u8) -> Result<(), GatewayError> {
        let market_key = account_at(accounts, 0)?;
        let authority = account_at(accounts, 1)?;

        if !(1..=3).contains(&outcome) {
            return Err(reject(MarketProgramError::InvalidOutcome));
        }

        let mut market = self.load_market(&market_key)?;
        if market.resolved {
            return Err(reject(MarketProgramError::MarketAlreadyResolved));
        }
        if market.authority != authority {
            return Err(reject(MarketProgramError::Unauthorized));
        }

        market.resolved = true;
        market.asserted_outcome = outcome;
        self.store(market_key, &market)
    }

    fn claim(&mut self, program_id: &Pubkey, accounts: &[Pubkey]) -> Result<(), GatewayError> {
        let market_key = account_at(accounts, 0)?;
        let holdings_key = account_at(accounts, 4)?;
        let user = account_at(accounts, 5)?;

        let market = self.load_market(&market_key)?;
        if !market.resolved {
            return Err(reject(MarketProgramError::MarketNotResolved));
        }
        if user_holdings_address(program_id, &user, &market_key).address != holdings_key {
            return Err(runtime_reject("seeds constraint violated"));
        }

        // No holdings record, or an emptied one, pays nothing.
        let Some(mut holdings) = self.load::<UserHoldings>(&holdings_key)? else {
            return Ok(());
        };
        if holdings.total_tokens() == 0 {
            return Ok(());
        }

        let tokens = redeemable_tokens(
            market.resolution(),
            holdings.outcome1_tokens,
            holdings.outcome2_tokens,
        );
        let payout = tokens
            .checked_mul(PRICE_PER_TOKEN)
            .ok_or(reject(MarketProgramError::InvalidAmount))?;

        holdings.outcome1_tokens = 0;
        holdings.outcome2_tokens = 0;
        self.pay(market.treasury, user, payout)?;
        self.store(holdings_key, &holdings)
    }
}

/// Mock market program for testing.
#[derive(Debug, Clone)]
pub struct MockProgram {
    /// Mock configuration.
    config: MockConfig,
    /// Program the mock answers for.
    program_id: Pubkey,
    /// Shared ledger state.
    ledger: Arc<Mutex<Ledger>>,
}

impl MockProgram {
    /// Create a new mock program with default configuration.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock program with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            program_id: PROGRAM_ID,
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }

    /// Answer for a different program id.
    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    fn check_reads(&self) -> Result<(), GatewayError> {
        if self.config.fail_reads {
            return Err(GatewayError::Rpc("Mock read failure".to_string()));
        }
        Ok(())
    }

    /// Seed raw account data at an address.
    pub fn set_account_data(&self, address: Pubkey, data: Vec<u8>) {
        self.ledger().accounts.insert(address, data);
    }

    /// Lamports escrowed in a treasury.
    pub fn treasury_balance(&self, treasury: &Pubkey) -> u64 {
        self.ledger().treasuries.get(treasury).copied().unwrap_or(0)
    }

    /// Lamports paid out to a wallet by sells and claims.
    pub fn paid_out(&self, wallet: &Pubkey) -> u64 {
        self.ledger().paid_out.get(wallet).copied().unwrap_or(0)
    }

    /// Number of transactions that reached the program, applied or not.
    pub fn submission_count(&self) -> usize {
        self.ledger().submissions
    }

    /// Clear all mock state.
    pub fn clear(&self) {
        *self.ledger() = Ledger::default();
    }

    fn scan<T: ProgramAccount>(&self, key: &Pubkey) -> Result<Vec<(Pubkey, T)>, GatewayError> {
        let ledger = self.ledger();
        let discriminator = T::discriminator();
        let mut found = ledger
            .accounts
            .iter()
            .filter(|(_, data)| {
                data.len() >= DISCRIMINATOR_LEN + 32
                    && data[..DISCRIMINATOR_LEN] == discriminator
                    && &data[DISCRIMINATOR_LEN..DISCRIMINATOR_LEN + 32] == key.as_ref()
            })
            .map(|(address, data)| decode_account(address, data).map(|account| (*address, account)))
            .collect::<Result<Vec<_>, _>>()?;
        found.sort_by_key(|(address, _)| *address);
        Ok(found)
    }

    fn execute(&self, transaction: &Transaction) -> Result<(), GatewayError> {
        let message = &transaction.message;
        let mut ledger = self.ledger();
        ledger.submissions += 1;

        let mut next = ledger.clone();
        for compiled in &message.instructions {
            let program = message
                .account_keys
                .get(usize::from(compiled.program_id_index))
                .ok_or_else(|| runtime_reject("program id index out of range"))?;
            if *program != self.program_id {
                return Err(runtime_reject("incorrect program id"));
            }

            let accounts = compiled
                .accounts
                .iter()
                .map(|index| account_at(&message.account_keys, usize::from(*index)))
                .collect::<Result<Vec<_>, _>>()?;
            let instruction = MarketInstruction::unpack(&compiled.data)
                .map_err(|e| runtime_reject(&e.to_string()))?;

            debug!(method = instruction.method_name(), "Mock applying instruction");
            next.apply(&self.program_id, &accounts, instruction)?;
        }

        *ledger = next;
        Ok(())
    }
}

impl Default for MockProgram {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgramGateway for MockProgram {
    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    async fn fetch_market(&self, address: &Pubkey) -> Result<Option<Market>, GatewayError> {
        self.simulate_latency().await;
        self.check_reads()?;
        self.ledger().load(address)
    }

    async fn fetch_user_holdings(
        &self,
        address: &Pubkey,
    ) -> Result<Option<UserHoldings>, GatewayError> {
        self.simulate_latency().await;
        self.check_reads()?;
        self.ledger().load(address)
    }

    async fn markets_by_authority(
        &self,
        authority: &Pubkey,
    ) -> Result<Vec<MarketInfo>, GatewayError> {
        self.simulate_latency().await;
        self.check_reads()?;
        Ok(self
            .scan::<Market>(authority)?
            .into_iter()
            .map(|(address, account)| MarketInfo { address, account })
            .collect())
    }

    async fn holdings_by_user(&self, user: &Pubkey) -> Result<Vec<HoldingsInfo>, GatewayError> {
        self.simulate_latency().await;
        self.check_reads()?;
        Ok(self
            .scan::<UserHoldings>(user)?
            .into_iter()
            .map(|(address, account)| HoldingsInfo { address, account })
            .collect())
    }

    async fn submit(
        &self,
        mut transaction: Transaction,
        signer: &Keypair,
    ) -> Result<Signature, GatewayError> {
        self.simulate_latency().await;

        if self.config.fail_submissions {
            return Err(GatewayError::Rpc("Mock submission failure".to_string()));
        }

        let signers: [&Keypair; 1] = [signer];
        transaction
            .try_sign(&signers[..], Hash::new_unique())
            .map_err(|e| GatewayError::Signing(e.to_string()))?;

        self.execute(&transaction)?;
        Ok(transaction.signatures[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::instruction;
    use solana_sdk::signature::Signer;

    fn args(name: &str) -> InitializeMarketArgs {
        InitializeMarketArgs {
            outcome1: "A".to_string(),
            outcome2: "B".to_string(),
            description: "Who wins?".to_string(),
            initial_liquidity: 10 * PRICE_PER_TOKEN,
            market_name: name.to_string(),
        }
    }

    fn tx(ix: solana_sdk::instruction::Instruction, payer: &Keypair) -> Transaction {
        Transaction::new_with_payer(&[ix], Some(&payer.pubkey()))
    }

    async fn create(mock: &MockProgram, authority: &Keypair, mint: &Pubkey) -> Pubkey {
        let ix = instruction::initialize_market(&PROGRAM_ID, &authority.pubkey(), mint, None, args("m1"))
            .unwrap();
        mock.submit(tx(ix, authority), authority).await.unwrap();
        market_address(&PROGRAM_ID, &authority.pubkey(), "m1").unwrap().address
    }

    #[tokio::test]
    async fn create_escrows_liquidity_without_minting_supply() {
        let mock = MockProgram::new();
        let authority = Keypair::new();
        let mint = Pubkey::new_unique();
        let market = create(&mock, &authority, &mint).await;

        let account = mock.fetch_market(&market).await.unwrap().unwrap();
        assert_eq!(account.outcome1_supply, 0);
        assert_eq!(account.outcome2_supply, 0);
        assert_eq!(account.authority, authority.pubkey());
        assert_eq!(mock.treasury_balance(&account.treasury), 10 * PRICE_PER_TOKEN);
    }

    #[tokio::test]
    async fn create_twice_is_rejected() {
        let mock = MockProgram::new();
        let authority = Keypair::new();
        let mint = Pubkey::new_unique();
        create(&mock, &authority, &mint).await;

        let ix = instruction::initialize_market(&PROGRAM_ID, &authority.pubkey(), &mint, None, args("m1"))
            .unwrap();
        let err = mock.submit(tx(ix, &authority), &authority).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { .. }));
        assert_eq!(mock.submission_count(), 2);
    }

    #[tokio::test]
    async fn buy_below_one_token_is_rejected() {
        let mock = MockProgram::new();
        let authority = Keypair::new();
        let mint = Pubkey::new_unique();
        let market = create(&mock, &authority, &mint).await;

        let ix = instruction::buy_outcome(&PROGRAM_ID, &authority.pubkey(), &market, &mint, None, 1, 500_000_000)
            .unwrap();
        let err = mock.submit(tx(ix, &authority), &authority).await.unwrap_err();
        assert_eq!(err.to_string(), "transaction rejected: Invalid amount");
    }

    #[tokio::test]
    async fn sell_more_than_held_is_rejected() {
        let mock = MockProgram::new();
        let user = Keypair::new();
        let mint = Pubkey::new_unique();
        let market = create(&mock, &user, &mint).await;

        let buy = instruction::buy_outcome(&PROGRAM_ID, &user.pubkey(), &market, &mint, None, 2, 3 * PRICE_PER_TOKEN)
            .unwrap();
        mock.submit(tx(buy, &user), &user).await.unwrap();

        let sell = instruction::sell_outcome(&PROGRAM_ID, &user.pubkey(), &market, 2, 4).unwrap();
        let err = mock.submit(tx(sell, &user), &user).await.unwrap_err();
        assert_eq!(err.to_string(), "transaction rejected: Insufficient tokens");

        let sell = instruction::sell_outcome(&PROGRAM_ID, &user.pubkey(), &market, 2, 1).unwrap();
        mock.submit(tx(sell, &user), &user).await.unwrap();
        assert_eq!(mock.paid_out(&user.pubkey()), PRICE_PER_TOKEN);

        let account = mock.fetch_market(&market).await.unwrap().unwrap();
        assert_eq!(account.outcome2_supply, 2);
    }

    #[tokio::test]
    async fn wrong_signer_cannot_submit() {
        let mock = MockProgram::new();
        let authority = Keypair::new();
        let ix = instruction::initialize_market(
            &PROGRAM_ID,
            &authority.pubkey(),
            &Pubkey::new_unique(),
            None,
            args("m1"),
        )
        .unwrap();

        let err = mock.submit(tx(ix, &authority), &Keypair::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Signing(_)));
        assert_eq!(mock.submission_count(), 0);
    }

    #[tokio::test]
    async fn rejected_transactions_leave_no_trace() {
        let mock = MockProgram::new();
        let user = Keypair::new();
        let mint = Pubkey::new_unique();
        let market = create(&mock, &user, &mint).await;

        let buy = instruction::buy_outcome(&PROGRAM_ID, &user.pubkey(), &market, &mint, None, 1, 2 * PRICE_PER_TOKEN)
            .unwrap();
        let bad_sell = instruction::sell_outcome(&PROGRAM_ID, &user.pubkey(), &market, 1, 5).unwrap();
        let transaction = Transaction::new_with_payer(&[buy, bad_sell], Some(&user.pubkey()));
        assert!(mock.submit(transaction, &user).await.is_err());

        let account = mock.fetch_market(&market).await.unwrap().unwrap();
        assert_eq!(account.outcome1_supply, 0);
        let holdings = user_holdings_address(&PROGRAM_ID, &user.pubkey(), &market).address;
        assert!(mock.fetch_user_holdings(&holdings).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn configured_failures() {
        let mock = MockProgram::with_config(MockConfig {
            fail_reads: true,
            fail_submissions: true,
            latency_ms: 0,
        });
        assert!(mock.fetch_market(&Pubkey::new_unique()).await.is_err());
        let user = Keypair::new();
        let ix = instruction::resolve_market(&PROGRAM_ID, &user.pubkey(), &Pubkey::new_unique(), 1)
            .unwrap();
        assert!(matches!(
            mock.submit(tx(ix, &user), &user).await,
            Err(GatewayError::Rpc(_))
        ));
    }

    #[tokio::test]
    async fn listings_filter_by_owner() {
        let mock = MockProgram::new();
        let alice = Keypair::new();
        let bob = Keypair::new();
        let mint = Pubkey::new_unique();
        create(&mock, &alice, &mint).await;
        create(&mock, &bob, &mint).await;

        let markets = mock.markets_by_authority(&alice.pubkey()).await.unwrap();
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].account.authority, alice.pubkey());
        assert!(mock.holdings_by_user(&alice.pubkey()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_program_id_rejects_default_program_instructions() {
        let program_id = Pubkey::new_unique();
        let mock = MockProgram::new().with_program_id(program_id);
        assert_eq!(mock.program_id(), program_id);

        let authority = Keypair::new();
        let mint = Pubkey::new_unique();
        let ix = instruction::initialize_market(&PROGRAM_ID, &authority.pubkey(), &mint, None, args("m1"))
            .unwrap();
        let err = mock.submit(tx(ix, &authority), &authority).await.unwrap_err();
        assert_eq!(err.to_string(), "transaction rejected: incorrect program id");

        let ix = instruction::initialize_market(&program_id, &authority.pubkey(), &mint, None, args("m1"))
            .unwrap();
        mock.submit(tx(ix, &authority), &authority).await.unwrap();
        let market = market_address(&program_id, &authority.pubkey(), "m1").unwrap().address;
        assert!(mock.fetch_market(&market).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_resets_accounts_and_ledgers() {
        let mock = MockProgram::new();
        let user = Keypair::new();
        let mint = Pubkey::new_unique();
        let market = create(&mock, &user, &mint).await;
        let treasury = treasury_address(&PROGRAM_ID, &market).address;

        mock.clear();

        assert!(mock.fetch_market(&market).await.unwrap().is_none());
        assert_eq!(mock.treasury_balance(&treasury), 0);
        assert_eq!(mock.submission_count(), 0);

        // The same market can be created again
        create(&mock, &user, &mint).await;
        assert!(mock.fetch_market(&market).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn claim_pays_only_the_winning_side() {
        let mock = MockProgram::new();
        let user = Keypair::new();
        let mint = Pubkey::new_unique();
        let market = create(&mock, &user, &mint).await;

        let buy = instruction::buy_outcome(&PROGRAM_ID, &user.pubkey(), &market, &mint, None, 2, 3 * PRICE_PER_TOKEN)
            .unwrap();
        mock.submit(tx(buy, &user), &user).await.unwrap();
        let resolve = instruction::resolve_market(&PROGRAM_ID, &user.pubkey(), &market, 1).unwrap();
        mock.submit(tx(resolve, &user), &user).await.unwrap();

        let claim = instruction::claim_winnings(&PROGRAM_ID, &user.pubkey(), &market, &mint).unwrap();
        mock.submit(tx(claim, &user), &user).await.unwrap();
        assert_eq!(mock.paid_out(&user.pubkey()), 0);

        let holdings = user_holdings_address(&PROGRAM_ID, &user.pubkey(), &market).address;
        let account = mock.fetch_user_holdings(&holdings).await.unwrap().unwrap();
        assert_eq!(account.total_tokens(), 0);
    }

    #[tokio::test]
    async fn corrupt_account_data_is_a_decode_error() {
        let mock = MockProgram::new();
        let address = Pubkey::new_unique();
        mock.set_account_data(address, vec![7u8; 20]);
        assert!(matches!(
            mock.fetch_market(&address).await,
            Err(GatewayError::Decode { .. })
        ));
    }
}
