// apps/terminal/src/main.rs
mod config;
mod render;

use adapters::{CoinGeckoFeed, PriceBook, PriceFeed, StaticPriceFeed};
use analyzer::{AnalysisHistory, Analyzer, RandomSignalProvider, SignalProvider};
use clap::{Parser, Subcommand};
use common::*;
use config::AppConfig;
use render::{HistorySummary, Report, Suggestions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "terminal", version, about = "Five-phase crypto asset analysis")]
struct Cli {
    /// Config file (defaults to config/analyzer.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one or more assets by name or symbol
    Analyze {
        #[arg(required = true)]
        queries: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Seed for reproducible synthetic signals
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the live price feed
        #[arg(long)]
        offline: bool,
    },
    /// Search the asset catalog
    Search {
        query: String,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reports go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze {
            queries,
            json,
            seed,
            offline,
        } => run_analyze(&config, &queries, json, seed, offline).await,
        Command::Search { query, limit } => {
            let hits = catalog::suggest(&query, limit);
            println!("{}", Suggestions(&hits));
            Ok(())
        }
    }
}

async fn run_analyze(
    config: &AppConfig,
    queries: &[String],
    json: bool,
    seed: Option<u64>,
    offline: bool,
) -> anyhow::Result<()> {
    let prices = build_price_feed(config, offline).await?;

    let signals: Arc<dyn SignalProvider> = match seed.or(config.signals.seed) {
        Some(seed) => {
            tracing::info!("Using seeded signals (seed {})", seed);
            Arc::new(RandomSignalProvider::seeded(seed))
        }
        None => Arc::new(RandomSignalProvider::new()),
    };

    let analyzer = Analyzer::new(config.analyzer(), signals, prices)?;
    let mut history = AnalysisHistory::new(config.history.capacity)?;
    let mut rejected = 0usize;

    for query in queries {
        match analyzer.analyze_query(query).await {
            Ok(result) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!("{}\n", Report(&result));
                }
                history.push(result);
            }
            Err(Error::Validation(e)) => {
                eprintln!("Rejected {:?}: invalid {}: {}", query, e.field(), e);
                rejected += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if !json && !history.is_empty() {
        println!("{}", HistorySummary(&history));
    }

    if rejected > 0 {
        anyhow::bail!("{} of {} analyses rejected", rejected, queries.len());
    }
    Ok(())
}

/// Live prices through a pre-filled price book, or an empty feed offline
async fn build_price_feed(config: &AppConfig, offline: bool) -> Result<Arc<dyn PriceFeed>> {
    if offline || !config.price_feed.enabled {
        tracing::info!("Price feed disabled, prices will show as N/A");
        return Ok(Arc::new(StaticPriceFeed::new()));
    }

    let source = Arc::new(CoinGeckoFeed::new(config.coingecko())?);
    let book = PriceBook::for_catalog(source, config.refresh_interval());

    match book.refresh().await {
        Ok(priced) => tracing::info!("Loaded {} prices", priced),
        Err(e) => tracing::warn!("Price refresh failed, continuing without prices: {}", e),
    }

    Ok(Arc::new(book))
}
