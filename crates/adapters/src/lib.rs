// crates/adapters/src/lib.rs
use async_trait::async_trait;
use common::*;
use std::collections::HashMap;

pub mod coingecko;
pub mod price_book;
mod rate_limiter;

pub use coingecko::{CoinGeckoConfig, CoinGeckoFeed};
pub use price_book::PriceBook;
pub use rate_limiter::RateLimiter;

/// Price source interface
///
/// Implementations return [`PriceQuote::UNAVAILABLE`] for ids they know
/// nothing about instead of failing the whole call.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Quotes for a batch of asset ids
    async fn quotes(&self, asset_ids: &[String]) -> Result<HashMap<String, PriceQuote>>;

    /// Quote for a single asset id
    async fn quote(&self, asset_id: &str) -> Result<PriceQuote> {
        let mut quotes = self.quotes(&[asset_id.to_string()]).await?;
        Ok(quotes.remove(asset_id).unwrap_or(PriceQuote::UNAVAILABLE))
    }
}

/// Fixed quotes, used offline and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed {
    quotes: HashMap<String, PriceQuote>,
}

impl StaticPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, asset_id: impl Into<String>, quote: PriceQuote) -> Self {
        self.quotes.insert(asset_id.into(), quote);
        self
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn quotes(&self, asset_ids: &[String]) -> Result<HashMap<String, PriceQuote>> {
        Ok(asset_ids
            .iter()
            .map(|id| {
                let quote = self.quotes.get(id).copied().unwrap_or(PriceQuote::UNAVAILABLE);
                (id.clone(), quote)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_feed_fills_sentinel() {
        let feed = StaticPriceFeed::new().with_quote("bitcoin", PriceQuote::new(43_000.0, 1.5));

        let btc = feed.quote("bitcoin").await.unwrap();
        assert_eq!(btc.price_usd, 43_000.0);

        let missing = feed.quote("unknown").await.unwrap();
        assert_eq!(missing, PriceQuote::UNAVAILABLE);

        let batch = feed
            .quotes(&["bitcoin".to_string(), "solana".to_string()])
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch["solana"].is_unavailable());
    }
}
