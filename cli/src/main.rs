//! walletscope - wallet trades, holdings and token markets from the terminal

#![forbid(unsafe_code)]

mod display;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use display::{
    format_count, format_percent, format_price, format_time_ms, format_token_amount, format_usd,
    short_address, trade_kind_label, wide_address,
};
use market_data::{DetailedToken, MarketDataClient, MarketToken, SearchResult, TokenSort};
use portfolio_manager::{PortfolioClient, PortfolioTracker};
use services_common::{ApiClient, ApiConfig};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wallet_session::{KeypairWallet, PROVIDER_NOT_FOUND_MESSAGE, WalletSession};
use wallet_trades::{HttpTradesSource, LoaderEvent, TradeHistoryLoader, classify};

#[derive(Parser)]
#[command(name = "walletscope")]
#[command(about = "Solana wallet trades, holdings and token markets")]
#[command(version)]
struct Cli {
    /// Market-data API base URL (overrides WALLETSCOPE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// API key (overrides WALLETSCOPE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Debug logging; repeat for trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trade history and statistics of a wallet
    Trades {
        /// Wallet address; defaults to WALLETSCOPE_WALLET
        address: Option<String>,
        /// Pages to load, at least one
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Token holdings of a wallet
    Portfolio {
        /// Wallet address; defaults to WALLETSCOPE_WALLET
        address: Option<String>,
    },
    /// Token listing
    Tokens {
        /// trending, latest, volume or graduated
        #[arg(long, default_value_t = TokenSort::Trending)]
        sort: TokenSort,
    },
    /// Search trending tokens by name, symbol or mint
    Search { query: String },
    /// Details of one token
    Token { mint: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = ApiClient::new(load_config(&cli)?)?;
    debug!(base_url = %client.config().base_url, "API client ready");

    match cli.command {
        Commands::Trades { address, pages } => run_trades(client, address, pages).await,
        Commands::Portfolio { address } => run_portfolio(client, address).await,
        Commands::Tokens { sort } => run_tokens(client, sort).await,
        Commands::Search { query } => run_search(client, &query).await,
        Commands::Token { mint } => run_token(client, &mint).await,
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<ApiConfig> {
    let mut config = ApiConfig::from_env().context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.base_url.clone_from(url);
    }
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Address from the command line, else the configured wallet connected through a session
async fn resolve_wallet(address: Option<String>) -> Result<String> {
    if let Some(address) = address {
        return Ok(address);
    }

    let provider = KeypairWallet::from_env()?.map(Arc::new);
    let session = WalletSession::new(provider);
    let state = session.connect().await;
    if let Some(error) = state.error {
        bail!("{error}");
    }
    match state.address {
        Some(address) => Ok(address),
        None => bail!(PROVIDER_NOT_FOUND_MESSAGE),
    }
}

async fn run_trades(client: ApiClient, address: Option<String>, pages: u32) -> Result<()> {
    let wallet = resolve_wallet(address).await?;
    let loader = TradeHistoryLoader::new(HttpTradesSource::new(client));

    let mut events = loader.subscribe();
    let notices = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(LoaderEvent::RateLimitRetry {
                    attempt,
                    max_retries,
                    delay,
                    ..
                }) => eprintln!(
                    "Rate limited, retrying in {}s ({attempt}/{max_retries})",
                    delay.as_secs()
                ),
                Ok(LoaderEvent::ConnectionRestored { .. }) => eprintln!("Connection restored"),
                Ok(event) => debug!(?event, "Loader event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Missed loader events"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut snapshot = loader.load(&wallet).await;
    let mut loaded = 1;
    while loaded < pages && snapshot.has_next_page && snapshot.error.is_none() {
        snapshot = loader.load_more().await;
        loaded += 1;
    }
    drop(loader);
    // The sender went with the loader, so the notice task ends after draining
    join_notices(notices).await;

    if let Some(error) = snapshot.error {
        bail!("{error}");
    }
    info!(wallet = %wallet, trades = snapshot.trades.len(), "Trades loaded");

    let stats = snapshot.stats;
    println!("Wallet   {wallet}");
    println!(
        "Trades   {}  (received {}, sent {}, swaps {})",
        stats.total(),
        stats.received,
        stats.sent,
        stats.swapped
    );
    println!("Volume   {}", format_usd(stats.total_volume));
    if snapshot.has_next_page {
        println!("More trades available; raise --pages to load them");
    }
    if snapshot.trades.is_empty() {
        println!("\nNo trades found");
        return Ok(());
    }

    println!(
        "\n{:<23}  {:<8}  {:>12} {:<8}  {:>12} {:<8}  {:>10}  {:<11}",
        "TIME", "KIND", "FROM", "", "TO", "", "VALUE", "TX"
    );
    for trade in &snapshot.trades {
        println!(
            "{:<23}  {:<8}  {:>12} {:<8}  {:>12} {:<8}  {:>10}  {:<11}",
            format_time_ms(trade.time),
            trade_kind_label(classify(trade, &wallet)),
            format_token_amount(trade.from.amount, trade.from.token.decimals),
            trade.from.token.symbol,
            format_token_amount(trade.to.amount, trade.to.token.decimals),
            trade.to.token.symbol,
            format_usd(trade.volume.usd),
            short_address(&trade.tx),
        );
    }
    Ok(())
}

/// Wait for the notice task; a failed task is logged, not fatal
async fn join_notices(notices: JoinHandle<()>) -> bool {
    match notices.await {
        Ok(()) => true,
        Err(err) => {
            warn!("Loader notice task failed: {}", err);
            false
        }
    }
}

async fn run_portfolio(client: ApiClient, address: Option<String>) -> Result<()> {
    let wallet = resolve_wallet(address).await?;
    let tracker = PortfolioTracker::new(PortfolioClient::new(client));

    let snapshot = tracker.set_wallet(Some(&wallet)).await;
    if let Some(error) = snapshot.error {
        bail!("{error}");
    }
    let Some(portfolio) = snapshot.portfolio else {
        bail!("No portfolio returned for {wallet}");
    };

    println!("Wallet   {}", portfolio.address);
    println!("Value    {}", format_usd(portfolio.total_value_usd));
    println!("SOL      {:.4}", portfolio.sol_balance);
    if portfolio.holdings.is_empty() {
        println!("\nNo token holdings");
        return Ok(());
    }

    println!(
        "\n{:<10}  {:<24}  {:>14}  {:>14}  {:>10}",
        "SYMBOL", "NAME", "AMOUNT", "PRICE", "VALUE"
    );
    for holding in portfolio.by_value() {
        println!(
            "{:<10}  {:<24}  {:>14}  {:>14}  {:>10}",
            holding.symbol,
            holding.name,
            format_token_amount(holding.ui_amount, holding.decimals),
            format_price(holding.price),
            format_usd(holding.value_usd),
        );
    }
    Ok(())
}

async fn run_tokens(client: ApiClient, sort: TokenSort) -> Result<()> {
    let tokens = MarketDataClient::new(client).list_tokens(sort).await?;
    println!("{} tokens ({sort})", tokens.len());
    print_token_table(&tokens);
    Ok(())
}

async fn run_search(client: ApiClient, query: &str) -> Result<()> {
    match MarketDataClient::new(client).search(query).await? {
        SearchResult::Matches(tokens) if tokens.is_empty() => println!("No tokens match '{query}'"),
        SearchResult::Matches(tokens) => print_token_table(&tokens),
        SearchResult::Token(token) => print_token_details(&token),
    }
    Ok(())
}

async fn run_token(client: ApiClient, mint: &str) -> Result<()> {
    let token = MarketDataClient::new(client).token_details(mint).await?;
    print_token_details(&token);
    Ok(())
}

fn print_token_table(tokens: &[MarketToken]) {
    if tokens.is_empty() {
        return;
    }
    println!(
        "\n{:>4}  {:<10}  {:<24}  {:>14}  {:>9}  {:>10}  {:>10}  {:<19}",
        "#", "SYMBOL", "NAME", "PRICE", "24H", "VOLUME", "MCAP", "MINT"
    );
    for token in tokens {
        let symbol = if token.is_verified {
            format!("{}*", token.symbol)
        } else {
            token.symbol.clone()
        };
        println!(
            "{:>4}  {:<10}  {:<24}  {:>14}  {:>9}  {:>10}  {:>10}  {:<19}",
            token.rank,
            symbol,
            token.name,
            format_price(token.price),
            format_percent(token.price_change_percent_24h),
            format_usd(token.volume_24h),
            format_usd(token.market_cap),
            wide_address(&token.mint),
        );
    }
}

fn print_token_details(token: &DetailedToken) {
    let verified = if token.is_verified { " (verified)" } else { "" };
    println!("{} ({}){verified}", token.name, token.symbol);
    println!("Mint         {}", token.mint);
    println!("Price        {}", format_price(token.price));
    println!("Change 1h    {}", format_percent(token.price_change_1h));
    println!("Change 24h   {}", format_percent(token.price_change_24h));
    println!("Market cap   {}", format_usd(token.market_cap));
    println!("Volume 24h   {}", format_usd(token.volume_24h));
    println!("Liquidity    {}", format_usd(token.liquidity));
    println!("Holders      {}", format_count(token.holders));
    println!(
        "Txns         {}  (buys {}, sells {})",
        format_count(token.total_txns),
        format_count(token.buys),
        format_count(token.sells)
    );
    println!("Top 10       {:.2}%", token.top10_percentage);
    println!("LP burn      {:.2}%", token.lp_burn);
    match token.risk_score {
        Some(score) => println!("Risk         {} (score {score:.1})", token.risk_level),
        None => println!("Risk         {} (no score)", token.risk_level),
    }
    for risk in &token.risks {
        println!("  - [{}] {}: {}", risk.level, risk.name, risk.description);
    }
}
