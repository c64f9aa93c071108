//! Read-only checks against a live cluster.
//!
//! These tests read from the RPC endpoint in SOLANA_RPC_URL (devnet by default).
//! Run with: cargo test --test devnet -- --ignored

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use predictx_client::config::Config;
use predictx_client::market::{MarketClient, MarketState, RpcGateway};

fn test_client() -> Option<MarketClient<RpcGateway>> {
    let config = Config::load().ok()?;
    let gateway = RpcGateway::from_config(&config).ok()?;
    Some(MarketClient::new(gateway))
}

#[tokio::test]
#[ignore = "requires network access"]
async fn test_missing_market_reads_as_uninitialized() {
    let Some(client) = test_client() else {
        println!("Skipping: configuration not available");
        return;
    };

    let market = Pubkey::new_unique();
    assert!(client.get_market(&market).await.unwrap().is_none());
    assert_eq!(
        client.market_state(&market).await.unwrap(),
        MarketState::Uninitialized
    );
    assert_eq!(
        client
            .get_potential_winnings(&Pubkey::new_unique(), &market)
            .await
            .unwrap(),
        Decimal::ZERO
    );
}

#[tokio::test]
#[ignore = "requires network access"]
async fn test_list_markets_of_unknown_authority() {
    let Some(client) = test_client() else {
        println!("Skipping: configuration not available");
        return;
    };

    let markets = client
        .markets_by_authority(&Pubkey::new_unique())
        .await
        .unwrap();
    assert!(markets.is_empty());
}

#[tokio::test]
#[ignore = "requires SOLANA_KEYPAIR_PATH and network access"]
async fn test_wallet_holdings_decode() {
    let Ok(config) = Config::load() else {
        return;
    };
    let Ok(Some(keypair)) = config.load_signer() else {
        println!("Skipping: SOLANA_KEYPAIR_PATH not set");
        return;
    };
    let Some(client) = test_client() else {
        return;
    };
    let client = client.with_signer(keypair);
    let user = client.signer_pubkey().unwrap();

    let holdings = client.holdings_by_user(&user).await.unwrap();
    for info in holdings {
        assert_eq!(info.account.user, user);
    }
}
