// crates/analyzer/src/signals.rs
//! Typed per-phase inputs. Every vocabulary is a closed enum, so a value of
//! these types is complete and in-domain by construction; raw provider data
//! only becomes one of these through [`crate::report::SignalReport::validate`].

use common::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of named entries with stable string keys
pub trait Vocabulary: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Path used in validation errors
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn key(self) -> &'static str;

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.key() == key)
    }

    /// Case-insensitive tag parsing for free-text provider values
    fn parse_tag(field: &str, raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.key().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownTag {
                field: field.to_string(),
                tag: raw.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|k| k.key())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident @ $field:literal {
            $($variant:ident => $key:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl Vocabulary for $name {
            const FIELD: &'static str = $field;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}

vocabulary! {
    /// Phase 1 market-structure checks
    PreScreenCheck @ "prescreen.checks" {
        ListedOnMajorExchanges => "exchanges",
        ActiveSixMonths => "active6months",
        SufficientVolume => "volume",
        NoSecurityBreach => "no_breach",
        HasMainnet => "has_mainnet",
        ActiveCommunity => "active_community",
        HasDocumentation => "documentation",
    }
}

vocabulary! {
    /// Phase 2 tokenomics sub-dimensions
    TokenomicsDimension @ "fundamentals.tokenomics" {
        Supply => "supply",
        Distribution => "distribution",
        Utility => "utility",
        ValueAccrual => "value_accrual",
        Vesting => "vesting",
    }
}

vocabulary! {
    /// Phase 2 team checks
    TeamCheck @ "fundamentals.team" {
        Identifiable => "identifiable",
        Experience => "experience",
        Communication => "communication",
        Audited => "audited",
        GithubActive => "github_active",
        OpenSource => "open_source",
    }
}

vocabulary! {
    /// Phase 3 on-chain health metrics
    OnChainMetric @ "onchain.metrics" {
        ActiveAddresses => "active_addresses",
        TransactionVolume => "tx_volume",
        TotalValueLocked => "tvl",
        DeveloperActivity => "dev_activity",
        NvtRatio => "nvt_ratio",
        TokenVelocity => "token_velocity",
        WhaleActivity => "whale_activity",
    }
}

vocabulary! {
    Sentiment @ "sentiment" {
        Bullish => "bullish",
        Bearish => "bearish",
    }
}

vocabulary! {
    Trend @ "timing.trend" {
        Uptrend => "Uptrend",
        Sideways => "Sideways",
        Downtrend => "Downtrend",
    }
}

vocabulary! {
    VolumeProfile @ "timing.volume" {
        AboveAverage => "Above Average",
        BelowAverage => "Below Average",
    }
}

vocabulary! {
    MarketCapTier @ "prescreen.market_cap" {
        SmallCap => "Small Cap",
        MidCap => "Mid Cap",
    }
}

/// Complete mapping from a vocabulary to values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SignalMap<K: Vocabulary, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Vocabulary, V> SignalMap<K, V> {
    /// Build a complete map by evaluating `f` for every key
    pub fn from_fn(mut f: impl FnMut(K) -> V) -> Self {
        Self {
            entries: K::ALL.iter().map(|&k| (k, f(k))).collect(),
        }
    }

    /// Validate a string-keyed map: exact cardinality, known keys only, every
    /// value accepted by `convert`.
    pub fn try_from_raw<R>(
        raw: &BTreeMap<String, R>,
        mut convert: impl FnMut(K, &R) -> Result<V, ValidationError>,
    ) -> Result<Self, ValidationError> {
        if raw.len() != K::ALL.len() {
            return Err(ValidationError::Cardinality {
                field: K::FIELD.to_string(),
                expected: K::ALL.len(),
                actual: raw.len(),
            });
        }

        // Known keys are distinct, so with the right cardinality every
        // vocabulary entry is present.
        let mut keyed = raw
            .iter()
            .map(|(raw_key, value)| {
                K::from_key(raw_key)
                    .map(|key| (key, value))
                    .ok_or_else(|| ValidationError::UnknownKey {
                        field: K::FIELD.to_string(),
                        key: raw_key.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        keyed.sort_by_key(|(key, _)| *key);

        let mut entries = BTreeMap::new();
        for (key, value) in keyed {
            entries.insert(key, convert(key, value)?);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.entries.get(&key)
    }

    /// Entries in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, mut pred: impl FnMut(&V) -> bool) -> u32 {
        self.entries.values().filter(|v| pred(v)).count() as u32
    }
}

impl<K: Vocabulary, V: Clone> SignalMap<K, V> {
    /// Copy with one entry replaced
    pub fn with(&self, key: K, value: V) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key, value);
        Self { entries }
    }
}

/// Field path of a single entry, e.g. `fundamentals.tokenomics.vesting`
pub fn entry_field<K: Vocabulary>(key: K) -> String {
    format!("{}.{}", K::FIELD, key.key())
}

/// Tokenomics sub-score in [1, 5]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubScore(u8);

impl SubScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(field: &str, value: i64) -> Result<Self, ValidationError> {
        if value < Self::MIN as i64 || value > Self::MAX as i64 {
            return Err(ValidationError::ScoreOutOfRange {
                field: field.to_string(),
                value,
                min: Self::MIN as i64,
                max: Self::MAX as i64,
            });
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

pub type PreScreenSignals = SignalMap<PreScreenCheck, bool>;
pub type TokenomicsScores = SignalMap<TokenomicsDimension, SubScore>;
pub type TeamSignals = SignalMap<TeamCheck, bool>;
pub type OnChainMetrics = SignalMap<OnChainMetric, Sentiment>;

/// Phase 1: checks plus descriptive market context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreScreen {
    pub market_cap_tier: MarketCapTier,
    pub market_cap_usd: u64,
    pub exchanges: Vec<String>,
    pub active_months: u32,
    pub daily_volume_usd: u64,
    pub has_product: bool,
    pub checks: PreScreenSignals,
}

/// Phase 2
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fundamentals {
    pub tokenomics: TokenomicsScores,
    pub team: TeamSignals,
}

/// Phase 3
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnChain {
    pub metrics: OnChainMetrics,
    pub competitive_advantage: bool,
}

/// Phase 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimingSignals {
    /// RSI-like reading, conventionally 0-100, not clamped
    pub oscillator: i64,
    pub trend: Trend,
    pub fear_greed: i64,
    pub momentum: Sentiment,
    pub volume: VolumeProfile,
}

/// Validated inputs of all four signal phases
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSignals {
    pub prescreen: PreScreen,
    pub fundamentals: Fundamentals,
    pub onchain: OnChain,
    pub timing: TimingSignals,
}
