// crates/analyzer/src/lib.rs
use adapters::PriceFeed;
use chrono::{DateTime, Utc};
use common::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{Duration, timeout};

pub mod aggregate;
pub mod classify;
pub mod history;
pub mod provider;
pub mod report;
pub mod signals;

pub use aggregate::{PhaseAggregates, aggregate};
pub use classify::{
    AllocationBand, Classifier, Confidence, Decision, Severity, Tier, TierGate, TierThresholds,
    classify,
};
pub use history::AnalysisHistory;
pub use provider::{RandomSignalProvider, SignalProvider, StaticSignalProvider};
pub use report::SignalReport;
pub use signals::PhaseSignals;

/// Analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Upper bound on a single price lookup before the sentinel is used
    pub price_timeout_ms: u64,
    pub thresholds: TierThresholds,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            price_timeout_ms: 2_000,
            thresholds: TierThresholds::default(),
        }
    }
}

/// One completed analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Creation time in epoch milliseconds
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub asset: Asset,
    /// Zero-filled when the feed had nothing
    pub price: PriceQuote,
    pub signals: PhaseSignals,
    pub aggregates: PhaseAggregates,
    pub decision: Decision,
}

/// Runs the five-phase pipeline for one asset at a time.
///
/// Holds no per-analysis state; safe to share across tasks.
pub struct Analyzer {
    config: AnalyzerConfig,
    classifier: Classifier,
    signals: Arc<dyn SignalProvider>,
    prices: Arc<dyn PriceFeed>,
}

impl Analyzer {
    pub fn new(
        config: AnalyzerConfig,
        signals: Arc<dyn SignalProvider>,
        prices: Arc<dyn PriceFeed>,
    ) -> Result<Self> {
        let classifier = Classifier::new(config.thresholds)?;
        Ok(Self {
            config,
            classifier,
            signals,
            prices,
        })
    }

    /// Resolve a free-text query against the catalog and analyze it
    pub async fn analyze_query(&self, query: &str) -> Result<AnalysisResult> {
        let asset = catalog::resolve(query)?;
        self.analyze(&asset).await
    }

    pub async fn analyze(&self, asset: &Asset) -> Result<AnalysisResult> {
        tracing::info!("Analyzing {}", asset);
        let start = std::time::Instant::now();

        let result = self.run_pipeline(asset).await;

        match &result {
            Ok(analysis) => {
                let elapsed = start.elapsed();
                tracing::info!(
                    "{} -> {} ({}, {}) in {:?}",
                    asset,
                    analysis.decision.recommendation,
                    analysis.decision.confidence,
                    analysis.decision.allocation,
                    elapsed
                );
                metrics::histogram!("analysis_duration_ms").record(elapsed.as_millis() as f64);
                metrics::counter!("analyses_total", "tier" => analysis.decision.tier.as_str())
                    .increment(1);
            }
            Err(Error::Validation(e)) => {
                tracing::warn!("Rejected analysis of {}: {}", asset, e);
                metrics::counter!("analyses_rejected_total").increment(1);
            }
            Err(e) => {
                tracing::error!("Analysis of {} failed: {}", asset, e);
            }
        }

        result
    }

    async fn run_pipeline(&self, asset: &Asset) -> Result<AnalysisResult> {
        let report = self.signals.signals(asset).await?;
        let price = self.fetch_price(asset).await;
        price.validate()?;

        let (signals, aggregates) = aggregate(&report)?;
        let decision = self.classifier.classify(&aggregates, signals.timing.oscillator);

        let timestamp = Utc::now();
        Ok(AnalysisResult {
            id: timestamp.timestamp_millis(),
            timestamp,
            asset: asset.clone(),
            price,
            signals,
            aggregates,
            decision,
        })
    }

    /// Never fails: errors and timeouts degrade to the unavailable sentinel
    async fn fetch_price(&self, asset: &Asset) -> PriceQuote {
        if !asset.is_listed() {
            return PriceQuote::UNAVAILABLE;
        }

        let limit = Duration::from_millis(self.config.price_timeout_ms);
        match timeout(limit, self.prices.quote(&asset.id)).await {
            Ok(Ok(quote)) => quote,
            Ok(Err(e)) => {
                tracing::warn!("Price lookup for {} failed: {}", asset.id, e);
                PriceQuote::UNAVAILABLE
            }
            Err(_) => {
                tracing::warn!("Price lookup for {} timed out after {:?}", asset.id, limit);
                PriceQuote::UNAVAILABLE
            }
        }
    }
}
