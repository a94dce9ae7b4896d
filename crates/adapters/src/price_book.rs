// crates/adapters/src/price_book.rs
use crate::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, interval};

/// Cached quotes for a fixed set of ids, refreshed from an upstream feed.
///
/// Lookups never touch the network; ids that have not been fetched yet
/// resolve to [`PriceQuote::UNAVAILABLE`].
pub struct PriceBook {
    source: Arc<dyn PriceFeed>,
    asset_ids: Vec<String>,
    refresh_interval: Duration,
    quotes: RwLock<HashMap<String, PriceQuote>>,
    last_refresh: RwLock<Option<DateTime<Utc>>>,
}

impl PriceBook {
    pub fn new(source: Arc<dyn PriceFeed>, asset_ids: Vec<String>, refresh_interval: Duration) -> Self {
        Self {
            source,
            asset_ids,
            refresh_interval,
            quotes: RwLock::new(HashMap::new()),
            last_refresh: RwLock::new(None),
        }
    }

    /// Price book over every catalog asset
    pub fn for_catalog(source: Arc<dyn PriceFeed>, refresh_interval: Duration) -> Self {
        Self::new(source, catalog::feed_ids(), refresh_interval)
    }

    /// Run the periodic refresh loop until shutdown
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut refresh_timer = interval(self.refresh_interval);
        // First tick completes immediately
        refresh_timer.tick().await;

        if let Err(e) = self.refresh().await {
            tracing::warn!("Initial price refresh failed: {}", e);
        }

        loop {
            tokio::select! {
                _ = refresh_timer.tick() => {
                    match self.refresh().await {
                        Ok(_) => {}
                        Err(e) if e.is_retryable() => {
                            tracing::warn!("Price refresh failed, retrying next interval: {}", e);
                        }
                        Err(e) => tracing::error!("Failed to refresh prices: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    // A dropped sender can never signal again
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Price book shutting down");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Fetch all tracked ids in one batch. On failure the previous cache is kept.
    pub async fn refresh(&self) -> Result<usize> {
        let start = std::time::Instant::now();

        let fresh = self.source.quotes(&self.asset_ids).await?;
        let priced = fresh.values().filter(|q| !q.is_unavailable()).count();

        {
            let mut quotes = self.quotes.write();
            for (id, quote) in fresh {
                quotes.insert(id, quote);
            }
        }
        *self.last_refresh.write() = Some(Utc::now());

        let elapsed = start.elapsed();
        tracing::debug!("Refreshed {} prices in {:?}", priced, elapsed);
        metrics::histogram!("price_book_refresh_duration_ms").record(elapsed.as_millis() as f64);

        Ok(priced)
    }

    /// Cached quote, or the unavailable sentinel
    pub fn get(&self, asset_id: &str) -> PriceQuote {
        self.quotes
            .read()
            .get(asset_id)
            .copied()
            .unwrap_or(PriceQuote::UNAVAILABLE)
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.read()
    }

    /// True when the cache has never been filled or is older than two intervals
    pub fn is_stale(&self) -> bool {
        match self.last_refresh() {
            None => true,
            Some(at) => {
                let age = Utc::now().signed_duration_since(at);
                age.to_std().map_or(false, |age| age > self.refresh_interval * 2)
            }
        }
    }
}

#[async_trait]
impl PriceFeed for PriceBook {
    async fn quotes(&self, asset_ids: &[String]) -> Result<HashMap<String, PriceQuote>> {
        Ok(asset_ids.iter().map(|id| (id.clone(), self.get(id))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingFeed;

    #[async_trait]
    impl PriceFeed for FailingFeed {
        async fn quotes(&self, _asset_ids: &[String]) -> Result<HashMap<String, PriceQuote>> {
            Err(Error::PriceFeed("upstream down".to_string()))
        }
    }

    fn static_source() -> Arc<dyn PriceFeed> {
        Arc::new(
            StaticPriceFeed::new()
                .with_quote("bitcoin", PriceQuote::new(43_000.0, 2.0))
                .with_quote("ethereum", PriceQuote::new(2_300.0, -1.0)),
        )
    }

    #[tokio::test]
    async fn test_refresh_and_lookup() {
        let book = PriceBook::for_catalog(static_source(), Duration::from_secs(60));
        assert!(book.is_stale());
        assert!(book.get("bitcoin").is_unavailable());

        let priced = book.refresh().await.unwrap();
        assert_eq!(priced, 2);
        assert!(!book.is_stale());
        assert_eq!(book.get("bitcoin").price_usd, 43_000.0);
        assert_eq!(book.get("ethereum").change_24h_pct, -1.0);
        assert!(book.get("solana").is_unavailable());
        assert!(book.get("not-tracked").is_unavailable());

        let quote = book.quote("bitcoin").await.unwrap();
        assert_eq!(quote.price_usd, 43_000.0);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cache() {
        let book = PriceBook::new(
            Arc::new(FailingFeed),
            vec!["bitcoin".to_string()],
            Duration::from_secs(60),
        );

        assert!(book.refresh().await.is_err());
        assert!(book.last_refresh().is_none());
        assert!(book.get("bitcoin").is_unavailable());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let book = Arc::new(PriceBook::for_catalog(static_source(), Duration::from_secs(3600)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = {
            let book = book.clone();
            tokio::spawn(async move { book.run(shutdown_rx).await })
        };

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();

        // Initial refresh always runs before the loop
        assert_eq!(book.get("bitcoin").price_usd, 43_000.0);
    }

    #[tokio::test]
    async fn test_run_stops_when_shutdown_sender_dropped() {
        let book = Arc::new(PriceBook::for_catalog(static_source(), Duration::from_secs(3600)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = {
            let book = book.clone();
            tokio::spawn(async move { book.run(shutdown_rx).await })
        };

        drop(shutdown_tx);
        let finished = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(finished.is_ok(), "run kept looping after the sender was dropped");
        finished.unwrap().unwrap().unwrap();
    }
}
