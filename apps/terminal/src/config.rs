// apps/terminal/src/config.rs
use adapters::CoinGeckoConfig;
use analyzer::{AnalyzerConfig, TierThresholds};
use common::*;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub price_feed: PriceFeedSection,
    pub history: HistorySection,
    pub signals: SignalsSection,
    pub classifier: TierThresholds,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceFeedSection {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
    pub refresh_interval_secs: u64,
    pub rate_limit_capacity: usize,
    pub rate_limit_per_sec: f64,
    /// How long one analysis waits on the price book
    pub lookup_timeout_ms: u64,
}

impl Default for PriceFeedSection {
    fn default() -> Self {
        let coingecko = CoinGeckoConfig::default();
        Self {
            enabled: true,
            base_url: coingecko.base_url,
            timeout_secs: coingecko.timeout.as_secs(),
            refresh_interval_secs: 60,
            rate_limit_capacity: coingecko.rate_limit_capacity,
            rate_limit_per_sec: coingecko.rate_limit_per_sec,
            lookup_timeout_ms: AnalyzerConfig::default().price_timeout_ms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    pub capacity: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignalsSection {
    /// Fixed seed for reproducible synthetic signals
    pub seed: Option<u64>,
}

impl AppConfig {
    pub fn coingecko(&self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.price_feed.base_url.clone(),
            timeout: Duration::from_secs(self.price_feed.timeout_secs),
            rate_limit_capacity: self.price_feed.rate_limit_capacity,
            rate_limit_per_sec: self.price_feed.rate_limit_per_sec,
        }
    }

    pub fn analyzer(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            price_timeout_ms: self.price_feed.lookup_timeout_ms,
            thresholds: self.classifier,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.price_feed.refresh_interval_secs)
    }

    /// Apply overrides from an environment lookup
    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = env("COINGECKO_BASE_URL") {
            self.price_feed.base_url = url;
        }
        if let Some(seed) = env("ANALYZER_SIGNAL_SEED") {
            let seed = seed
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid ANALYZER_SIGNAL_SEED {:?}: {}", seed, e)))?;
            self.signals.seed = Some(seed);
        }
        Ok(())
    }
}

/// Load the config file, then environment overrides.
///
/// With no explicit path a missing default file falls back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = read_config(path)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn read_config(path: Option<&Path>) -> Result<AppConfig> {
    let (path, explicit) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_CONFIG_PATH), false),
    };

    let config_str = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{} not found, using default configuration", path.display());
            return Ok(AppConfig::default());
        }
        Err(e) => {
            return Err(Error::Config(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            )));
        }
    };

    parse_config(&config_str)
}

fn parse_config(config_str: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(config_str)
        .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

    if config.price_feed.rate_limit_capacity == 0 || config.price_feed.rate_limit_per_sec <= 0.0 {
        return Err(Error::Config(
            "price_feed rate limit capacity and refill rate must be positive".to_string(),
        ));
    }
    config.classifier.validate()?;

    Ok(config)
}
