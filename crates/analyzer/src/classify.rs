// crates/analyzer/src/classify.rs
use crate::aggregate::PhaseAggregates;
use crate::signals::{OnChainMetric, PreScreenCheck, SubScore, TokenomicsDimension, Vocabulary};
use common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rows of the decision table, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    CoreHolding,
    Satellite,
    Speculative,
    HighRisk,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::CoreHolding => "core_holding",
            Tier::Satellite => "satellite",
            Tier::Speculative => "speculative",
            Tier::HighRisk => "high_risk",
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Tier::CoreHolding => Confidence::VeryHigh,
            Tier::Satellite => Confidence::High,
            Tier::Speculative => Confidence::Medium,
            Tier::HighRisk => Confidence::Low,
        }
    }

    pub fn allocation(&self) -> AllocationBand {
        match self {
            Tier::CoreHolding => AllocationBand::new(5.0, 10.0),
            Tier::Satellite => AllocationBand::new(2.0, 5.0),
            Tier::Speculative => AllocationBand::new(1.0, 2.0),
            Tier::HighRisk => AllocationBand::new(0.25, 0.5),
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Tier::CoreHolding => "Strong Buy — Core Holding",
            Tier::Satellite => "Buy — Satellite Position",
            Tier::Speculative => "Speculative — Small Position",
            Tier::HighRisk => "High Risk — Not Recommended",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Tier::CoreHolding | Tier::Satellite => Severity::Favorable,
            Tier::Speculative => Severity::Caution,
            Tier::HighRisk => Severity::Unfavorable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::VeryHigh => "Very High",
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        })
    }
}

/// Suggested share of a portfolio, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationBand {
    pub min_pct: f64,
    pub max_pct: f64,
}

impl AllocationBand {
    pub const fn new(min_pct: f64, max_pct: f64) -> Self {
        Self { min_pct, max_pct }
    }
}

impl fmt::Display for AllocationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}%", self.min_pct, self.max_pct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Favorable,
    Caution,
    Unfavorable,
}

impl Severity {
    /// Display colour used by front ends
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Favorable => "green",
            Severity::Caution => "yellow",
            Severity::Unfavorable => "red",
        }
    }
}

/// Classifier output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub tier: Tier,
    pub confidence: Confidence,
    pub allocation: AllocationBand,
    pub recommendation: &'static str,
    pub severity: Severity,
}

impl From<Tier> for Decision {
    fn from(tier: Tier) -> Self {
        Self {
            tier,
            confidence: tier.confidence(),
            allocation: tier.allocation(),
            recommendation: tier.recommendation(),
            severity: tier.severity(),
        }
    }
}

/// Minimums a tier requires; all must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierGate {
    pub min_pass_count: u32,
    pub min_tokenomics_total: u32,
    pub min_bullish_count: u32,
}

impl TierGate {
    pub const fn new(min_pass_count: u32, min_tokenomics_total: u32, min_bullish_count: u32) -> Self {
        Self {
            min_pass_count,
            min_tokenomics_total,
            min_bullish_count,
        }
    }

    fn admits(&self, pass_count: u32, tokenomics_total: u32, bullish_count: u32) -> bool {
        pass_count >= self.min_pass_count
            && tokenomics_total >= self.min_tokenomics_total
            && bullish_count >= self.min_bullish_count
    }

    fn at_most(&self, other: &TierGate) -> bool {
        self.min_pass_count <= other.min_pass_count
            && self.min_tokenomics_total <= other.min_tokenomics_total
            && self.min_bullish_count <= other.min_bullish_count
    }
}

/// Decision table parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub core_holding: TierGate,
    /// Core holding also requires the oscillator strictly below this
    pub core_holding_oscillator_below: i64,
    pub satellite: TierGate,
    pub speculative: TierGate,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            core_holding: TierGate::new(6, 23, 5),
            core_holding_oscillator_below: 60,
            satellite: TierGate::new(5, 18, 4),
            speculative: TierGate::new(4, 15, 3),
        }
    }
}

impl TierThresholds {
    /// Tiers must get no stricter going down the table, otherwise raising an
    /// input could land in a weaker tier.
    pub fn validate(&self) -> Result<()> {
        if !self.satellite.at_most(&self.core_holding) {
            return Err(Error::Config(format!(
                "satellite thresholds {:?} exceed core holding thresholds {:?}",
                self.satellite, self.core_holding
            )));
        }
        if !self.speculative.at_most(&self.satellite) {
            return Err(Error::Config(format!(
                "speculative thresholds {:?} exceed satellite thresholds {:?}",
                self.speculative, self.satellite
            )));
        }
        Ok(())
    }
}

/// Ordered waterfall over the phase aggregates
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    thresholds: TierThresholds,
}

impl Classifier {
    pub fn new(thresholds: TierThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn classify(&self, aggregates: &PhaseAggregates, oscillator: i64) -> Decision {
        self.classify_counts(
            aggregates.prescreen_pass_count,
            aggregates.tokenomics_total,
            aggregates.onchain_bullish_count,
            oscillator,
        )
    }

    /// First matching tier wins. The oscillator only gates the top tier.
    pub fn classify_counts(
        &self,
        pass_count: u32,
        tokenomics_total: u32,
        bullish_count: u32,
        oscillator: i64,
    ) -> Decision {
        debug_assert!(pass_count as usize <= PreScreenCheck::ALL.len());
        debug_assert!(
            tokenomics_total as usize >= TokenomicsDimension::ALL.len() * SubScore::MIN as usize
                && tokenomics_total as usize <= TokenomicsDimension::ALL.len() * SubScore::MAX as usize
        );
        debug_assert!(bullish_count as usize <= OnChainMetric::ALL.len());

        let t = &self.thresholds;
        let tier = if t.core_holding.admits(pass_count, tokenomics_total, bullish_count)
            && oscillator < t.core_holding_oscillator_below
        {
            Tier::CoreHolding
        } else if t.satellite.admits(pass_count, tokenomics_total, bullish_count) {
            Tier::Satellite
        } else if t.speculative.admits(pass_count, tokenomics_total, bullish_count) {
            Tier::Speculative
        } else {
            Tier::HighRisk
        };

        Decision::from(tier)
    }
}

/// Classify with the default decision table
pub fn classify(aggregates: &PhaseAggregates, oscillator: i64) -> Decision {
    Classifier::default().classify(aggregates, oscillator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(pass: u32, tokenomics: u32, bullish: u32, oscillator: i64) -> Decision {
        Classifier::default().classify_counts(pass, tokenomics, bullish, oscillator)
    }

    #[test]
    fn test_core_holding_boundary() {
        let d = decide(6, 23, 5, 59);
        assert_eq!(d.tier, Tier::CoreHolding);
        assert_eq!(d.recommendation, "Strong Buy — Core Holding");
        assert_eq!(d.allocation.to_string(), "5–10%");
        assert_eq!(d.confidence, Confidence::VeryHigh);
        assert_eq!(d.severity, Severity::Favorable);
    }

    #[test]
    fn test_overbought_falls_to_satellite() {
        let d = decide(6, 23, 5, 60);
        assert_eq!(d.tier, Tier::Satellite);
        assert_eq!(d.recommendation, "Buy — Satellite Position");
        assert_eq!(d.allocation.to_string(), "2–5%");
        assert_eq!(d.confidence, Confidence::High);
    }

    #[test]
    fn test_speculative_boundary_ignores_oscillator() {
        for oscillator in [-10, 0, 59, 60, 99, 250] {
            let d = decide(4, 15, 3, oscillator);
            assert_eq!(d.tier, Tier::Speculative);
            assert_eq!(d.recommendation, "Speculative — Small Position");
            assert_eq!(d.allocation.to_string(), "1–2%");
            assert_eq!(d.severity, Severity::Caution);
        }
    }

    #[test]
    fn test_below_all_thresholds() {
        let d = decide(0, 5, 0, 50);
        assert_eq!(d.tier, Tier::HighRisk);
        assert_eq!(d.recommendation, "High Risk — Not Recommended");
        assert_eq!(d.allocation.to_string(), "0.25–0.5%");
        assert_eq!(d.confidence, Confidence::Low);
        assert_eq!(d.severity.color(), "red");
    }

    #[test]
    fn test_each_gate_needs_every_condition() {
        assert_eq!(decide(5, 23, 5, 10).tier, Tier::Satellite);
        assert_eq!(decide(6, 22, 5, 10).tier, Tier::Satellite);
        assert_eq!(decide(6, 23, 4, 10).tier, Tier::Satellite);
        assert_eq!(decide(4, 25, 7, 10).tier, Tier::Speculative);
        assert_eq!(decide(7, 17, 7, 10).tier, Tier::Speculative);
        assert_eq!(decide(7, 25, 3, 10).tier, Tier::Speculative);
        assert_eq!(decide(3, 25, 7, 10).tier, Tier::HighRisk);
        assert_eq!(decide(7, 14, 7, 10).tier, Tier::HighRisk);
        assert_eq!(decide(7, 25, 2, 10).tier, Tier::HighRisk);
    }

    #[test]
    fn test_waterfall_is_monotone() {
        // Tier derives Ord strongest-first, so "not weaker" means `<=`.
        for oscillator in [30, 59, 60, 70] {
            for pass in 0..=7u32 {
                for tokenomics in 5..=25u32 {
                    for bullish in 0..=7u32 {
                        let base = decide(pass, tokenomics, bullish, oscillator).tier;
                        if pass < 7 {
                            assert!(decide(pass + 1, tokenomics, bullish, oscillator).tier <= base);
                        }
                        if tokenomics < 25 {
                            assert!(decide(pass, tokenomics + 1, bullish, oscillator).tier <= base);
                        }
                        if bullish < 7 {
                            assert!(decide(pass, tokenomics, bullish + 1, oscillator).tier <= base);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_classify_uses_aggregates() {
        let aggregates = PhaseAggregates {
            prescreen_pass_count: 6,
            tokenomics_total: 23,
            onchain_bullish_count: 5,
            market_health_pct: 71,
            team_pass_count: 2,
        };
        assert_eq!(classify(&aggregates, 52).tier, Tier::CoreHolding);
        assert_eq!(classify(&aggregates, 65).tier, Tier::Satellite);
    }

    #[test]
    fn test_thresholds_must_not_tighten_downwards() {
        assert!(Classifier::new(TierThresholds::default()).is_ok());

        let inverted = TierThresholds {
            speculative: TierGate::new(6, 15, 3),
            ..Default::default()
        };
        assert!(matches!(Classifier::new(inverted), Err(Error::Config(_))));

        let inverted = TierThresholds {
            satellite: TierGate::new(5, 24, 4),
            ..Default::default()
        };
        assert!(matches!(Classifier::new(inverted), Err(Error::Config(_))));
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = Classifier::new(TierThresholds {
            core_holding: TierGate::new(7, 25, 7),
            core_holding_oscillator_below: 50,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(strict.classify_counts(6, 23, 5, 40).tier, Tier::Satellite);
        assert_eq!(strict.classify_counts(7, 25, 7, 49).tier, Tier::CoreHolding);
        assert_eq!(strict.classify_counts(7, 25, 7, 50).tier, Tier::Satellite);
    }
}
