// crates/analyzer/src/report.rs
//! Wire shape of a signal provider's answer: string keys and free-text tags,
//! as an external data source would emit them.

use crate::signals::*;
use common::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub prescreen: RawPreScreen,
    pub fundamentals: RawFundamentals,
    pub onchain: RawOnChain,
    pub timing: RawTiming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPreScreen {
    pub market_cap: String,
    pub market_cap_usd: u64,
    pub exchanges: Vec<String>,
    pub active_months: u32,
    pub daily_volume_usd: u64,
    pub has_product: bool,
    pub checks: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFundamentals {
    pub tokenomics: BTreeMap<String, i64>,
    pub team: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOnChain {
    pub metrics: BTreeMap<String, String>,
    pub competitive_advantage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTiming {
    pub rsi: i64,
    pub trend: String,
    pub fear_greed: i64,
    pub macd: String,
    pub volume: String,
}

impl SignalReport {
    /// Convert into typed phase inputs, rejecting the first contract violation.
    pub fn validate(&self) -> Result<PhaseSignals, ValidationError> {
        let prescreen = PreScreen {
            market_cap_tier: MarketCapTier::parse_tag(MarketCapTier::FIELD, &self.prescreen.market_cap)?,
            market_cap_usd: self.prescreen.market_cap_usd,
            exchanges: self.prescreen.exchanges.clone(),
            active_months: self.prescreen.active_months,
            daily_volume_usd: self.prescreen.daily_volume_usd,
            has_product: self.prescreen.has_product,
            checks: PreScreenSignals::try_from_raw(&self.prescreen.checks, |_, v| Ok(*v))?,
        };

        let fundamentals = Fundamentals {
            tokenomics: TokenomicsScores::try_from_raw(&self.fundamentals.tokenomics, |dim, v| {
                SubScore::new(&entry_field(dim), *v)
            })?,
            team: TeamSignals::try_from_raw(&self.fundamentals.team, |_, v| Ok(*v))?,
        };

        let onchain = OnChain {
            metrics: OnChainMetrics::try_from_raw(&self.onchain.metrics, |metric, tag| {
                Sentiment::parse_tag(&entry_field(metric), tag)
            })?,
            competitive_advantage: self.onchain.competitive_advantage,
        };

        let timing = TimingSignals {
            oscillator: self.timing.rsi,
            trend: Trend::parse_tag(Trend::FIELD, &self.timing.trend)?,
            fear_greed: self.timing.fear_greed,
            momentum: Sentiment::parse_tag("timing.macd", &self.timing.macd)?,
            volume: VolumeProfile::parse_tag(VolumeProfile::FIELD, &self.timing.volume)?,
        };

        Ok(PhaseSignals {
            prescreen,
            fundamentals,
            onchain,
            timing,
        })
    }
}

fn raw_map<K: Vocabulary, V, R>(map: &SignalMap<K, V>, f: impl Fn(&V) -> R) -> BTreeMap<String, R> {
    map.iter().map(|(k, v)| (k.key().to_string(), f(v))).collect()
}

impl From<&PhaseSignals> for SignalReport {
    fn from(signals: &PhaseSignals) -> Self {
        let p = &signals.prescreen;
        let t = &signals.timing;

        Self {
            prescreen: RawPreScreen {
                market_cap: p.market_cap_tier.key().to_string(),
                market_cap_usd: p.market_cap_usd,
                exchanges: p.exchanges.clone(),
                active_months: p.active_months,
                daily_volume_usd: p.daily_volume_usd,
                has_product: p.has_product,
                checks: raw_map(&p.checks, |v| *v),
            },
            fundamentals: RawFundamentals {
                tokenomics: raw_map(&signals.fundamentals.tokenomics, |s| s.get() as i64),
                team: raw_map(&signals.fundamentals.team, |v| *v),
            },
            onchain: RawOnChain {
                metrics: raw_map(&signals.onchain.metrics, |s| s.key().to_string()),
                competitive_advantage: signals.onchain.competitive_advantage,
            },
            timing: RawTiming {
                rsi: t.oscillator,
                trend: t.trend.key().to_string(),
                fear_greed: t.fear_greed,
                macd: match t.momentum {
                    Sentiment::Bullish => "Bullish",
                    Sentiment::Bearish => "Bearish",
                }
                .to_string(),
                volume: t.volume.key().to_string(),
            },
        }
    }
}
