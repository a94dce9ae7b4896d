// apps/terminal/src/render.rs
//! Plain-text reports for the terminal.

use analyzer::signals::{OnChainMetric, PreScreenCheck, SubScore, TeamCheck, TokenomicsDimension, Vocabulary};
use analyzer::{AnalysisHistory, AnalysisResult};
use common::catalog::Listing;
use common::format::{format_change, format_price, humanize_key};
use std::fmt;

/// Full five-phase report for one analysis
pub struct Report<'a>(pub &'a AnalysisResult);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        let s = &r.signals;
        let a = &r.aggregates;
        let d = &r.decision;

        writeln!(f, "=== {} ===", r.asset)?;
        if r.price.is_unavailable() {
            writeln!(f, "Price: N/A")?;
        } else {
            writeln!(
                f,
                "Price: {}  24h: {}%",
                format_price(r.price.price_usd),
                format_change(r.price.change_24h_pct)
            )?;
        }
        writeln!(f, "Recommendation: {} [{}]", d.recommendation, d.severity.color())?;
        writeln!(f, "Confidence: {}  Allocation: {}", d.confidence, d.allocation)?;
        writeln!(
            f,
            "Quick stats: pre-screen {}/{} | tokenomics {}/{} | on-chain {}/{} bullish | market health {}% | RSI {}",
            a.prescreen_pass_count,
            PreScreenCheck::ALL.len(),
            a.tokenomics_total,
            TokenomicsDimension::ALL.len() * SubScore::MAX as usize,
            a.onchain_bullish_count,
            OnChainMetric::ALL.len(),
            a.market_health_pct,
            s.timing.oscillator
        )?;

        let p = &s.prescreen;
        writeln!(f)?;
        writeln!(f, "Phase 1: Pre-Screen")?;
        writeln!(
            f,
            "  Market cap: {} ({})",
            p.market_cap_tier,
            format_price(p.market_cap_usd as f64)
        )?;
        writeln!(f, "  Exchanges: {}", p.exchanges.join(", "))?;
        writeln!(
            f,
            "  Active {} months, daily volume {}, product {}",
            p.active_months,
            format_price(p.daily_volume_usd as f64),
            yes_no(p.has_product)
        )?;
        for (check, passed) in p.checks.iter() {
            writeln!(f, "  {} {}", mark(*passed), humanize_key(check.key()))?;
        }

        let fundamentals = &s.fundamentals;
        writeln!(f)?;
        writeln!(f, "Phase 2: Fundamentals")?;
        writeln!(f, "  Tokenomics {}", a.tokenomics_total)?;
        for (dim, score) in fundamentals.tokenomics.iter() {
            writeln!(f, "    {:<16}{}/{}", humanize_key(dim.key()), score.get(), SubScore::MAX)?;
        }
        writeln!(f, "  Team {}/{}", a.team_pass_count, TeamCheck::ALL.len())?;
        for (check, passed) in fundamentals.team.iter() {
            writeln!(f, "    {} {}", mark(*passed), humanize_key(check.key()))?;
        }

        writeln!(f)?;
        writeln!(f, "Phase 3: On-Chain")?;
        for (metric, sentiment) in s.onchain.metrics.iter() {
            writeln!(f, "  {:<18}{}", humanize_key(metric.key()), sentiment)?;
        }
        writeln!(
            f,
            "  Competitive advantage: {}",
            yes_no(s.onchain.competitive_advantage)
        )?;

        let t = &s.timing;
        writeln!(f)?;
        writeln!(f, "Phase 4: Timing")?;
        writeln!(f, "  RSI {}  Trend {}  Fear & Greed {}", t.oscillator, t.trend, t.fear_greed)?;
        writeln!(f, "  MACD {}  Volume {}", t.momentum, t.volume)?;

        writeln!(f)?;
        writeln!(f, "Phase 5: Decision")?;
        writeln!(f, "  {}", d.recommendation)?;
        write!(f, "  Allocate {} of portfolio ({} confidence)", d.allocation, d.confidence)
    }
}

/// One line per past analysis, newest first
pub struct HistorySummary<'a>(pub &'a AnalysisHistory);

impl fmt::Display for HistorySummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "History ({}/{}):", self.0.len(), self.0.capacity())?;
        for r in self.0.iter() {
            write!(
                f,
                "\n  {}  {:<6} {:<10} {}",
                r.timestamp.format("%H:%M:%S"),
                r.asset.symbol,
                format_price(r.price.price_usd),
                r.decision.recommendation
            )?;
        }
        Ok(())
    }
}

/// Catalog search results
pub struct Suggestions<'a>(pub &'a [&'static Listing]);

impl fmt::Display for Suggestions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No matching assets");
        }
        for (i, listing) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<6} {}", listing.symbol, listing.name)?;
        }
        Ok(())
    }
}

fn mark(passed: bool) -> &'static str {
    if passed { "[x]" } else { "[ ]" }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapters::StaticPriceFeed;
    use analyzer::{Analyzer, AnalyzerConfig, RandomSignalProvider};
    use common::PriceQuote;
    use common::catalog;
    use std::sync::Arc;

    async fn analysis(query: &str, quote: PriceQuote) -> AnalysisResult {
        let analyzer = Analyzer::new(
            AnalyzerConfig::default(),
            Arc::new(RandomSignalProvider::seeded(3)),
            Arc::new(StaticPriceFeed::new().with_quote("bitcoin", quote)),
        )
        .unwrap();
        analyzer.analyze_query(query).await.unwrap()
    }

    #[tokio::test]
    async fn test_report_sections() {
        let result = analysis("btc", PriceQuote::new(43_250.1, 2.4)).await;
        let text = Report(&result).to_string();

        assert!(text.starts_with("=== Bitcoin (BTC) ==="));
        assert!(text.contains("Price: $43,250.10  24h: 2.40%"));
        assert!(text.contains(result.decision.recommendation));
        for phase in 1..=5 {
            assert!(text.contains(&format!("Phase {}:", phase)));
        }
        assert!(text.contains("No Breach"));
        assert!(text.contains("Active Addresses"));
        assert!(text.contains("Value Accrual"));
    }

    #[tokio::test]
    async fn test_unavailable_price() {
        let result = analysis("mooncoin", PriceQuote::UNAVAILABLE).await;
        let text = Report(&result).to_string();
        assert!(text.contains("Price: N/A"));
        assert!(text.starts_with("=== mooncoin (MOON) ==="));
    }

    #[tokio::test]
    async fn test_history_summary_newest_first() {
        let mut history = AnalysisHistory::new(5).unwrap();
        history.push(analysis("btc", PriceQuote::new(43_250.1, 2.4)).await);
        history.push(analysis("eth", PriceQuote::UNAVAILABLE).await);

        let text = HistorySummary(&history).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "History (2/5):");
        assert!(lines[1].contains("ETH"));
        assert!(lines[1].contains("N/A"));
        assert!(lines[2].contains("BTC"));
        assert!(lines[2].contains("$43,250.10"));
    }

    #[test]
    fn test_suggestions() {
        let hits = catalog::suggest("coin", 10);
        let text = Suggestions(&hits).to_string();
        assert!(text.contains("BTC    Bitcoin"));
        assert!(text.contains("LTC    Litecoin"));

        assert_eq!(Suggestions(&[]).to_string(), "No matching assets");
    }
}
