// crates/analyzer/src/provider.rs
use crate::report::*;
use async_trait::async_trait;
use common::*;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};

/// Source of raw per-phase signals for an asset
#[async_trait]
pub trait SignalProvider: Send + Sync {
    async fn signals(&self, asset: &Asset) -> Result<SignalReport>;
}

/// Synthetic signals drawn from fixed per-field distributions.
///
/// Every report it produces satisfies the input contract.
pub struct RandomSignalProvider {
    rng: Mutex<StdRng>,
}

impl RandomSignalProvider {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible sequence of reports
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn sample<R: Rng>(rng: &mut R) -> SignalReport {
        SignalReport {
            prescreen: RawPreScreen {
                market_cap: if rng.random_bool(0.7) { "Mid Cap" } else { "Small Cap" }.to_string(),
                market_cap_usd: rng.random_range(100..=600u64) * 1_000_000,
                exchanges: if rng.random_bool(0.8) {
                    vec!["Binance", "Coinbase", "Kraken"]
                } else {
                    vec!["Binance", "KuCoin"]
                }
                .into_iter()
                .map(String::from)
                .collect(),
                active_months: rng.random_range(6..=30),
                daily_volume_usd: rng.random_range(5..=55u64) * 1_000_000,
                has_product: rng.random_bool(0.7),
                checks: flags(
                    rng,
                    &[
                        ("exchanges", 0.8),
                        ("active6months", 1.0),
                        ("volume", 0.7),
                        ("no_breach", 0.6),
                        ("has_mainnet", 0.7),
                        ("active_community", 0.6),
                        ("documentation", 0.7),
                    ],
                ),
            },
            fundamentals: RawFundamentals {
                tokenomics: ["supply", "distribution", "utility", "value_accrual", "vesting"]
                    .into_iter()
                    .map(|dim| (dim.to_string(), rng.random_range(3..=5i64)))
                    .collect(),
                team: flags(
                    rng,
                    &[
                        ("identifiable", 0.7),
                        ("experience", 0.6),
                        ("communication", 0.7),
                        ("audited", 0.6),
                        ("github_active", 0.7),
                        ("open_source", 0.5),
                    ],
                ),
            },
            onchain: RawOnChain {
                metrics: [
                    "active_addresses",
                    "tx_volume",
                    "tvl",
                    "dev_activity",
                    "nvt_ratio",
                    "token_velocity",
                    "whale_activity",
                ]
                .into_iter()
                .map(|metric| {
                    let tag = if rng.random_bool(0.5) { "bullish" } else { "bearish" };
                    (metric.to_string(), tag.to_string())
                })
                .collect(),
                competitive_advantage: rng.random_bool(0.6),
            },
            timing: RawTiming {
                rsi: rng.random_range(30..=70),
                trend: ["Uptrend", "Sideways", "Downtrend"][rng.random_range(0..3)].to_string(),
                fear_greed: rng.random_range(20..=80),
                macd: if rng.random_bool(0.5) { "Bullish" } else { "Bearish" }.to_string(),
                volume: if rng.random_bool(0.6) { "Above Average" } else { "Below Average" }
                    .to_string(),
            },
        }
    }
}

impl Default for RandomSignalProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Named flags, each true with the given probability
fn flags<R: Rng>(rng: &mut R, odds: &[(&str, f64)]) -> BTreeMap<String, bool> {
    odds.iter()
        .map(|(name, p)| (name.to_string(), rng.random_bool(*p)))
        .collect()
}

#[async_trait]
impl SignalProvider for RandomSignalProvider {
    async fn signals(&self, asset: &Asset) -> Result<SignalReport> {
        let report = Self::sample(&mut *self.rng.lock());
        tracing::debug!("Sampled synthetic signals for {}", asset);
        Ok(report)
    }
}

/// Canned reports keyed by asset id, with an optional fallback
#[derive(Debug, Clone, Default)]
pub struct StaticSignalProvider {
    reports: HashMap<String, SignalReport>,
    fallback: Option<SignalReport>,
}

impl StaticSignalProvider {
    /// Same report for every asset
    pub fn new(report: SignalReport) -> Self {
        Self {
            reports: HashMap::new(),
            fallback: Some(report),
        }
    }

    pub fn with_asset(mut self, asset_id: impl Into<String>, report: SignalReport) -> Self {
        self.reports.insert(asset_id.into(), report);
        self
    }
}

#[async_trait]
impl SignalProvider for StaticSignalProvider {
    async fn signals(&self, asset: &Asset) -> Result<SignalReport> {
        self.reports
            .get(&asset.id)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| Error::SignalProvider(format!("no signals for {}", asset)))
    }
}
