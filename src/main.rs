//! PredictX market CLI entry point.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use predictx_client::config::Config;
use predictx_client::market::{
    BuyOutcomeParams, ClaimWinningsParams, CreateMarketParams, MarketClient, Outcome,
    ResolveMarketParams, RpcGateway, SellOutcomeParams, TransactionResult,
};
use predictx_client::metrics;
use predictx_client::program::pda;

const RULE: &str = "======================================================================";
const THIN_RULE: &str = "----------------------------------------------------------------------";

/// PredictX binary prediction market client.
#[derive(Parser, Debug)]
#[command(name = "predictx")]
#[command(about = "Create, trade, resolve and claim PredictX binary markets on Solana")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check configuration validity.
    CheckConfig,

    /// Derive market, treasury and holdings addresses.
    Derive {
        /// Market authority.
        #[arg(long)]
        authority: Pubkey,
        /// Market name.
        #[arg(long)]
        name: String,
        /// Also derive this user's holdings address.
        #[arg(long)]
        user: Option<Pubkey>,
    },

    /// Create a market with the configured wallet as authority.
    CreateMarket {
        /// Market name (address seed).
        #[arg(long)]
        name: String,
        /// First outcome label.
        #[arg(long)]
        outcome1: String,
        /// Second outcome label.
        #[arg(long)]
        outcome2: String,
        /// Market description.
        #[arg(long)]
        description: String,
        /// Initial liquidity in SOL.
        #[arg(long)]
        liquidity: f64,
        /// Settlement token mint.
        #[arg(long)]
        mint: Pubkey,
        /// Token account funding the liquidity.
        #[arg(long)]
        token_account: Option<Pubkey>,
    },

    /// Buy outcome tokens.
    Buy {
        /// Market address.
        #[arg(long)]
        market: Pubkey,
        /// Outcome (1 or 2).
        #[arg(long)]
        outcome: u8,
        /// Amount to spend in SOL.
        #[arg(long)]
        amount: f64,
        /// Settlement token mint.
        #[arg(long)]
        mint: Pubkey,
        /// Token account paying for the purchase.
        #[arg(long)]
        token_account: Option<Pubkey>,
    },

    /// Sell outcome tokens.
    Sell {
        /// Market address.
        #[arg(long)]
        market: Pubkey,
        /// Outcome (1 or 2).
        #[arg(long)]
        outcome: u8,
        /// Number of tokens to sell.
        #[arg(long)]
        tokens: u64,
    },

    /// Resolve a market (authority only).
    Resolve {
        /// Market address.
        #[arg(long)]
        market: Pubkey,
        /// Outcome (1, 2, or 3 for unresolvable).
        #[arg(long)]
        outcome: u8,
    },

    /// Claim winnings from a resolved market.
    Claim {
        /// Market address.
        #[arg(long)]
        market: Pubkey,
        /// Settlement token mint.
        #[arg(long)]
        mint: Pubkey,
    },

    /// Show a market account.
    Market {
        /// Market address.
        market: Pubkey,
    },

    /// Show market statistics.
    Stats {
        /// Market address.
        market: Pubkey,
    },

    /// Show a user's position in a market.
    Position {
        /// Market address.
        market: Pubkey,
        /// User (defaults to the configured wallet).
        #[arg(long)]
        user: Option<Pubkey>,
    },

    /// Show a user's potential winnings in a market.
    Winnings {
        /// Market address.
        market: Pubkey,
        /// User (defaults to the configured wallet).
        #[arg(long)]
        user: Option<Pubkey>,
    },

    /// List markets created by an authority.
    Markets {
        /// Authority (defaults to the configured wallet).
        #[arg(long)]
        authority: Option<Pubkey>,
    },

    /// List a user's holdings across markets.
    Holdings {
        /// User (defaults to the configured wallet).
        #[arg(long)]
        user: Option<Pubkey>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("predictx_client=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Initialize metrics
    metrics::init_metrics();

    match args.command {
        Command::CheckConfig => cmd_check_config().await,
        Command::Derive {
            authority,
            name,
            user,
        } => cmd_derive(authority, &name, user),
        Command::CreateMarket {
            name,
            outcome1,
            outcome2,
            description,
            liquidity,
            mint,
            token_account,
        } => {
            let params = CreateMarketParams {
                market_name: name,
                outcome1,
                outcome2,
                description,
                initial_liquidity: liquidity,
                mint,
                authority_token_account: token_account,
            };
            let client = connect()?;
            let result = client.create_market(&params).await?;
            if result.is_success() {
                if let Some(authority) = client.signer_pubkey() {
                    println!("Market: {}", client.market_address(&authority, &params.market_name)?);
                }
            }
            report("CREATE MARKET", result)
        }
        Command::Buy {
            market,
            outcome,
            amount,
            mint,
            token_account,
        } => {
            let params = BuyOutcomeParams {
                market,
                outcome,
                amount,
                mint,
                buyer_token_account: token_account,
            };
            report("BUY", connect()?.buy_outcome(&params).await?)
        }
        Command::Sell {
            market,
            outcome,
            tokens,
        } => {
            let params = SellOutcomeParams {
                market,
                outcome,
                tokens_to_sell: tokens,
            };
            report("SELL", connect()?.sell_outcome(&params).await?)
        }
        Command::Resolve { market, outcome } => {
            let params = ResolveMarketParams { market, outcome };
            report("RESOLVE", connect()?.resolve_market(&params).await?)
        }
        Command::Claim { market, mint } => {
            let params = ClaimWinningsParams { market, mint };
            report("CLAIM", connect()?.claim_winnings(&params).await?)
        }
        Command::Market { market } => cmd_market(market).await,
        Command::Stats { market } => cmd_stats(market).await,
        Command::Position { market, user } => cmd_position(market, user).await,
        Command::Winnings { market, user } => cmd_winnings(market, user).await,
        Command::Markets { authority } => cmd_markets(authority).await,
        Command::Holdings { user } => cmd_holdings(user).await,
    }
}

/// Build a client from the environment, with a signer when one is configured.
fn connect() -> anyhow::Result<MarketClient<RpcGateway>> {
    let config = Config::load()?;
    let gateway = RpcGateway::from_config(&config)?;
    let client = MarketClient::new(gateway);

    match config.load_signer()? {
        Some(keypair) => Ok(client.with_signer(keypair)),
        None => {
            info!("No keypair configured, client is read-only");
            Ok(client)
        }
    }
}

fn wallet_or(
    client: &MarketClient<RpcGateway>,
    explicit: Option<Pubkey>,
    flag: &str,
) -> anyhow::Result<Pubkey> {
    explicit
        .or_else(|| client.signer_pubkey())
        .ok_or_else(|| anyhow!("{flag} is required when SOLANA_KEYPAIR_PATH is not set"))
}

fn report(title: &str, result: TransactionResult) -> anyhow::Result<()> {
    println!("{RULE}");
    println!("{title}");
    println!("{RULE}");
    match result {
        TransactionResult::Confirmed { signature } => {
            println!("CONFIRMED");
            println!("  Signature: {}", signature);
            Ok(())
        }
        TransactionResult::Failed { kind, error } => {
            println!("FAILED ({})", kind);
            println!("  Error: {}", error);
            Err(anyhow!("{title} failed"))
        }
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("{RULE}");
    println!("PREDICTX - CONFIGURATION CHECK");
    println!("{RULE}");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow!("Configuration validation failed"));
        }
    }

    // Check keypair
    print!("Checking keypair... ");
    match config.load_signer() {
        Ok(Some(keypair)) => {
            use solana_sdk::signature::Signer;
            println!("OK");
            println!("  Wallet address: {}", keypair.pubkey());
        }
        Ok(None) => println!("NONE (read-only)"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow!("Keypair invalid"));
        }
    }

    println!("{THIN_RULE}");
    println!("Configuration Summary:");
    println!("  RPC URL: {}", config.solana_rpc_url);
    println!("  Program ID: {}", config.program_id()?);
    println!("  Commitment: {}", config.solana_commitment);
    println!("  Timeout: {}ms", config.rpc_timeout_ms);
    println!("{RULE}");
    println!("CONFIGURATION CHECK PASSED");
    println!("{RULE}");

    Ok(())
}

fn cmd_derive(authority: Pubkey, name: &str, user: Option<Pubkey>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let program_id = config.program_id()?;

    let market = pda::market_address(&program_id, &authority, name)
        .with_context(|| format!("cannot derive market address for {name:?}"))?;
    let treasury = pda::treasury_address(&program_id, &market.address);

    println!("Program:  {}", program_id);
    println!("Market:   {} (bump {})", market.address, market.bump);
    println!("Treasury: {} (bump {})", treasury.address, treasury.bump);
    if let Some(user) = user {
        let holdings = pda::user_holdings_address(&program_id, &user, &market.address);
        println!("Holdings: {} (bump {})", holdings.address, holdings.bump);
    }
    Ok(())
}

async fn cmd_market(market: Pubkey) -> anyhow::Result<()> {
    let client = connect()?;
    let Some(account) = client.get_market(&market).await? else {
        println!("Market {} not found", market);
        return Ok(());
    };

    println!("{RULE}");
    println!("MARKET {}", account.name);
    println!("{RULE}");
    println!("  Address: {}", market);
    println!("  Authority: {}", account.authority);
    println!("  Description: {}", account.description);
    for (code, outcome) in [(1, Outcome::One), (2, Outcome::Two)] {
        println!(
            "  Outcome {}: {} (supply {})",
            code,
            account.label(outcome),
            account.supply(outcome)
        );
    }
    println!("  State: {}", account.state());
    println!("  Mint: {}", account.mint);
    println!("  Treasury: {}", account.treasury);
    Ok(())
}

async fn cmd_stats(market: Pubkey) -> anyhow::Result<()> {
    let client = connect()?;
    match client.get_market_stats(&market).await? {
        Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
        None => println!("Market {} not found", market),
    }
    Ok(())
}

async fn cmd_position(market: Pubkey, user: Option<Pubkey>) -> anyhow::Result<()> {
    let client = connect()?;
    let user = wallet_or(&client, user, "--user")?;
    let position = client.get_user_position(&user, &market).await?;
    println!("{}", serde_json::to_string_pretty(&position)?);
    Ok(())
}

async fn cmd_winnings(market: Pubkey, user: Option<Pubkey>) -> anyhow::Result<()> {
    let client = connect()?;
    let user = wallet_or(&client, user, "--user")?;
    let winnings = client.get_potential_winnings(&user, &market).await?;
    println!("Potential winnings: {} SOL", winnings);
    Ok(())
}

async fn cmd_markets(authority: Option<Pubkey>) -> anyhow::Result<()> {
    let client = connect()?;
    let authority = wallet_or(&client, authority, "--authority")?;
    let markets = client.markets_by_authority(&authority).await?;

    println!("Markets by {}: {}", authority, markets.len());
    for info in &markets {
        println!(
            "  - {} {:<20} {}",
            info.address,
            info.account.name,
            info.account.state()
        );
    }
    Ok(())
}

async fn cmd_holdings(user: Option<Pubkey>) -> anyhow::Result<()> {
    let client = connect()?;
    let user = wallet_or(&client, user, "--user")?;
    let holdings = client.holdings_by_user(&user).await?;

    println!("Holdings of {}: {}", user, holdings.len());
    for info in &holdings {
        println!(
            "  - market {} outcome1={} outcome2={}",
            info.account.market, info.account.outcome1_tokens, info.account.outcome2_tokens
        );
    }
    Ok(())
}
