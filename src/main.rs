use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use coinledger::clock::SystemClock;
use coinledger::config::{default_config_path, ResolvedConfig};
use coinledger::ledger::{TradeOptions, TransactionLedger};
use coinledger::market_data::{CoinMarketCapProvider, MarketDataProvider};
use coinledger::portfolio::PortfolioService;
use coinledger::storage::{JsonFileStorage, Storage};

#[derive(Parser)]
#[command(name = "coinledger")]
#[command(about = "Personal crypto trading journal and portfolio analytics")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct TradeArgs {
    /// Asset symbol, e.g. BTC
    symbol: String,
    /// Quantity traded
    amount: Decimal,
    /// Unit price in the quote currency
    price: Decimal,
    /// Trade time (e.g. 2025-01-15T12:00), interpreted in the configured
    /// local timezone; current time when omitted
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    exchange: Option<String>,
    #[arg(long)]
    wallet: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl TradeArgs {
    fn options(&self) -> TradeOptions {
        TradeOptions {
            date: self.date.clone(),
            exchange: self.exchange.clone(),
            wallet: self.wallet.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Record a purchase
    Buy(TradeArgs),
    /// Record a sale against an existing position
    Sell(TradeArgs),
    /// List transactions, newest first
    Transactions {
        /// Limit to one symbol
        symbol: Option<String>,
    },
    /// Export the transaction log as CSV
    Export {
        /// Limit to one symbol
        symbol: Option<String>,
        /// Directory to write the file into (default: current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Full portfolio view as JSON
    Portfolio,
    /// Global market metrics as JSON
    Global,
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = ResolvedConfig::load_or_default(&config_path)?;

    let storage: Arc<dyn Storage> = Arc::new(JsonFileStorage::new(&config.data_dir));
    let clock = Arc::new(SystemClock);
    let provider: Arc<dyn MarketDataProvider> = Arc::new(
        CoinMarketCapProvider::new(&config.market_data).with_convert(&config.quote_currency),
    );
    let ledger = TransactionLedger::new(storage.clone(), clock.clone(), config.local_timezone);

    match cli.command {
        Command::Buy(trade) => {
            let record = ledger
                .record_buy(
                    &trade.symbol.to_uppercase(),
                    trade.amount,
                    trade.price,
                    trade.options(),
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Sell(trade) => {
            let record = ledger
                .record_sell(
                    &trade.symbol.to_uppercase(),
                    trade.amount,
                    trade.price,
                    trade.options(),
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Transactions { symbol } => {
            let transactions = match symbol {
                Some(symbol) => ledger.list_by_symbol(&symbol.to_uppercase()).await,
                None => ledger.list_all().await,
            };
            println!("{}", serde_json::to_string_pretty(&transactions)?);
        }
        Command::Export { symbol, out } => {
            let symbol = symbol.map(|s| s.to_uppercase());
            let export = ledger.export_csv(symbol.as_deref()).await;
            let content = export
                .content
                .context("Transaction log could not be read; nothing exported")?;
            let path = out.unwrap_or_else(|| PathBuf::from(".")).join(&export.filename);
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported {}", path.display());
        }
        Command::Portfolio => {
            let service = PortfolioService::new(storage, provider, clock);
            let view = service.build_view().await;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Global => {
            let metrics = provider.fetch_global_metrics().await?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Command::Config => {
            println!("Config file: {}", config_path.display());
            println!("Data directory: {}", config.data_dir.display());
            println!("Quote currency: {}", config.quote_currency);
            println!("Local timezone: {}", config.local_timezone);
            println!(
                "Market data key: {}",
                if config.market_data.api_key.is_some() {
                    "configured"
                } else {
                    "not set"
                }
            );
        }
    }

    Ok(())
}
