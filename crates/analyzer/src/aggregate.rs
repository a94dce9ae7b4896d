// crates/analyzer/src/aggregate.rs
use crate::report::SignalReport;
use crate::signals::*;
use common::ValidationError;
use serde::{Deserialize, Serialize};

/// Per-phase reductions consumed by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseAggregates {
    pub prescreen_pass_count: u32,
    pub tokenomics_total: u32,
    pub onchain_bullish_count: u32,
    /// Bullish share as a rounded percentage, reporting only
    pub market_health_pct: u32,
    /// Reporting only
    pub team_pass_count: u32,
}

impl PhaseAggregates {
    pub fn from_signals(signals: &PhaseSignals) -> Self {
        let bullish = onchain_bullish_count(&signals.onchain.metrics);
        Self {
            prescreen_pass_count: prescreen_pass_count(&signals.prescreen.checks),
            tokenomics_total: tokenomics_total(&signals.fundamentals.tokenomics),
            onchain_bullish_count: bullish,
            market_health_pct: market_health(bullish),
            team_pass_count: team_pass_count(&signals.fundamentals.team),
        }
    }
}

pub fn prescreen_pass_count(checks: &PreScreenSignals) -> u32 {
    checks.count(|passed| *passed)
}

pub fn tokenomics_total(scores: &TokenomicsScores) -> u32 {
    scores.iter().map(|(_, score)| score.get() as u32).sum()
}

pub fn team_pass_count(team: &TeamSignals) -> u32 {
    team.count(|passed| *passed)
}

pub fn onchain_bullish_count(metrics: &OnChainMetrics) -> u32 {
    metrics.count(|tag| *tag == Sentiment::Bullish)
}

/// `round(bullish / 7 * 100)`
pub fn market_health(bullish_count: u32) -> u32 {
    let total = OnChainMetric::ALL.len() as f64;
    (bullish_count as f64 / total * 100.0).round() as u32
}

/// Validate a provider report and reduce it. Nothing is computed unless the
/// whole report satisfies the input contract.
pub fn aggregate(report: &SignalReport) -> Result<(PhaseSignals, PhaseAggregates), ValidationError> {
    let signals = report.validate()?;
    let aggregates = PhaseAggregates::from_signals(&signals);

    tracing::debug!(
        pass_count = aggregates.prescreen_pass_count,
        tokenomics_total = aggregates.tokenomics_total,
        bullish_count = aggregates.onchain_bullish_count,
        "Aggregated phase signals"
    );

    Ok((signals, aggregates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    fn scores(values: [i64; 5]) -> TokenomicsScores {
        let mut i = 0;
        TokenomicsScores::from_fn(|dim| {
            let score = SubScore::new(&entry_field(dim), values[i]).unwrap();
            i += 1;
            score
        })
    }

    #[test]
    fn test_tokenomics_total_bounds() {
        assert_eq!(tokenomics_total(&scores([5, 5, 5, 5, 5])), 25);
        assert_eq!(tokenomics_total(&scores([1, 1, 1, 1, 1])), 5);
        assert_eq!(tokenomics_total(&scores([3, 4, 5, 2, 1])), 15);

        // Every combination stays in [5, 25] and equals the literal sum
        for a in 1..=5 {
            for b in 1..=5 {
                for c in 1..=5 {
                    let total = tokenomics_total(&scores([a, b, c, 3, 4]));
                    assert_eq!(total as i64, a + b + c + 7);
                    assert!((5..=25).contains(&total));
                }
            }
        }
    }

    #[test]
    fn test_onchain_bullish_count() {
        let all_bullish = OnChainMetrics::from_fn(|_| Sentiment::Bullish);
        let all_bearish = OnChainMetrics::from_fn(|_| Sentiment::Bearish);
        assert_eq!(onchain_bullish_count(&all_bullish), 7);
        assert_eq!(onchain_bullish_count(&all_bearish), 0);

        let mixed = all_bearish
            .with(OnChainMetric::TotalValueLocked, Sentiment::Bullish)
            .with(OnChainMetric::WhaleActivity, Sentiment::Bullish);
        assert_eq!(onchain_bullish_count(&mixed), 2);
    }

    #[test]
    fn test_market_health() {
        assert_eq!(market_health(0), 0);
        assert_eq!(market_health(1), 14);
        assert_eq!(market_health(4), 57);
        assert_eq!(market_health(5), 71);
        assert_eq!(market_health(7), 100);
    }

    #[test]
    fn test_pass_count_independent_of_order() {
        let mut report = sample_report();
        let forward = prescreen_pass_count(&report.validate().unwrap().prescreen.checks);

        // Same checks inserted in reverse order
        let reversed: Vec<_> = report.prescreen.checks.clone().into_iter().rev().collect();
        report.prescreen.checks.clear();
        report.prescreen.checks.extend(reversed);
        let backward = prescreen_pass_count(&report.validate().unwrap().prescreen.checks);

        assert_eq!(forward, 6);
        assert_eq!(forward, backward);

        let none = PreScreenSignals::from_fn(|_| false);
        let all = PreScreenSignals::from_fn(|_| true);
        assert_eq!(prescreen_pass_count(&none), 0);
        assert_eq!(prescreen_pass_count(&all), 7);
    }

    #[test]
    fn test_aggregate_sample() {
        let (signals, aggregates) = aggregate(&sample_report()).unwrap();

        assert_eq!(
            aggregates,
            PhaseAggregates {
                prescreen_pass_count: 6,
                tokenomics_total: 23,
                onchain_bullish_count: 5,
                market_health_pct: 71,
                team_pass_count: 4,
            }
        );
        assert_eq!(signals.timing.oscillator, 52);
    }

    #[test]
    fn test_aggregate_rejects_invalid_score() {
        let mut report = sample_report();
        report.fundamentals.tokenomics.insert("utility".to_string(), 6);

        let err = aggregate(&report).unwrap_err();
        assert_eq!(err.field(), "fundamentals.tokenomics.utility");
    }
}
