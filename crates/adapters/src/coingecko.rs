// crates/adapters/src/coingecko.rs
use crate::*;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const VS_CURRENCY: &str = "usd";

/// CoinGecko client settings
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub rate_limit_capacity: usize,
    pub rate_limit_per_sec: f64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            rate_limit_capacity: 5,
            rate_limit_per_sec: 0.5, // public tier allows ~30 req/min
        }
    }
}

/// `simple/price` entry; fields are absent for ids CoinGecko does not track
#[derive(Debug, Default, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

impl From<SimplePrice> for PriceQuote {
    fn from(p: SimplePrice) -> Self {
        PriceQuote::new(p.usd.unwrap_or(0.0), p.usd_24h_change.unwrap_or(0.0))
    }
}

pub struct CoinGeckoFeed {
    base_url: String,
    rate_limiter: RateLimiter,
    client: reqwest::Client,
}

impl CoinGeckoFeed {
    pub fn new(config: CoinGeckoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(config.rate_limit_capacity, config.rate_limit_per_sec),
            client,
        })
    }

    fn simple_price_query(asset_ids: &[String]) -> Vec<(&'static str, String)> {
        vec![
            ("ids", asset_ids.join(",")),
            ("vs_currencies", VS_CURRENCY.to_string()),
            ("include_24hr_change", "true".to_string()),
        ]
    }

    async fn get_request<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<R> {
        let _guard = self.rate_limiter.acquire().await?;

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimit("CoinGecko returned 429".to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(Error::PriceFeed(format!(
                "CoinGecko API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }
}

fn into_quotes(
    asset_ids: &[String],
    mut body: HashMap<String, SimplePrice>,
) -> HashMap<String, PriceQuote> {
    asset_ids
        .iter()
        .map(|id| {
            let quote = body.remove(id).map(PriceQuote::from).unwrap_or(PriceQuote::UNAVAILABLE);
            (id.clone(), quote)
        })
        .collect()
}

#[async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn quotes(&self, asset_ids: &[String]) -> Result<HashMap<String, PriceQuote>> {
        let ids: Vec<String> = asset_ids
            .iter()
            .filter(|id| id.as_str() != UNKNOWN_ASSET_ID)
            .cloned()
            .collect();

        if ids.is_empty() {
            return Ok(into_quotes(asset_ids, HashMap::new()));
        }

        let body: HashMap<String, SimplePrice> = self
            .get_request("simple/price", &Self::simple_price_query(&ids))
            .await?;

        tracing::debug!("CoinGecko returned {} of {} quotes", body.len(), ids.len());

        Ok(into_quotes(asset_ids, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_price_parsing() {
        let json = r#"{
            "bitcoin": {"usd": 43250.1, "usd_24h_change": -1.25},
            "ethereum": {"usd": 2301.5},
            "solana": {}
        }"#;
        let body: HashMap<String, SimplePrice> = serde_json::from_str(json).unwrap();

        let ids: Vec<String> = ["bitcoin", "ethereum", "solana", "cardano"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let quotes = into_quotes(&ids, body);

        assert_eq!(quotes["bitcoin"], PriceQuote::new(43250.1, -1.25));
        assert_eq!(quotes["ethereum"], PriceQuote::new(2301.5, 0.0));
        assert!(quotes["solana"].is_unavailable());
        assert!(quotes["cardano"].is_unavailable());
    }

    #[test]
    fn test_simple_price_query() {
        let query = CoinGeckoFeed::simple_price_query(&["bitcoin".to_string(), "sui".to_string()]);
        assert_eq!(query[0], ("ids", "bitcoin,sui".to_string()));
        assert_eq!(query[1], ("vs_currencies", "usd".to_string()));
        assert_eq!(query[2], ("include_24hr_change", "true".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_assets_skip_the_network() {
        let feed = CoinGeckoFeed::new(CoinGeckoConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            ..Default::default()
        })
        .unwrap();

        let quote = feed.quote(UNKNOWN_ASSET_ID).await.unwrap();
        assert_eq!(quote, PriceQuote::UNAVAILABLE);
    }
}
