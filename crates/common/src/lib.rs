// crates/common/src/lib.rs
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod catalog;
pub mod error;
pub mod format;

pub use error::{Error, Result, ValidationError};

/// Identifier used for assets that are not in the catalog
pub const UNKNOWN_ASSET_ID: &str = "unknown";

/// Tradable asset identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// Price-feed identifier (CoinGecko id)
    pub id: String,
    pub name: String,
    pub symbol: String,
}

impl Asset {
    pub fn new(id: impl Into<String>, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    /// Asset typed in by a user that is not listed in the catalog.
    pub fn ad_hoc(query: &str) -> Self {
        let name = query.trim();
        let symbol: String = name.chars().take(4).collect::<String>().to_uppercase();
        Self::new(UNKNOWN_ASSET_ID, name, symbol)
    }

    pub fn is_listed(&self) -> bool {
        self.id != UNKNOWN_ASSET_ID
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

/// Spot price in USD and 24h percent change
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price_usd: f64,
    pub change_24h_pct: f64,
}

impl PriceQuote {
    /// Sentinel returned when the feed has no data for an asset
    pub const UNAVAILABLE: PriceQuote = PriceQuote {
        price_usd: 0.0,
        change_24h_pct: 0.0,
    };

    pub fn new(price_usd: f64, change_24h_pct: f64) -> Self {
        Self {
            price_usd,
            change_24h_pct,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.price_usd == 0.0
    }

    /// Reject quotes that cannot come from a sane feed.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !self.price_usd.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "price_usd".to_string(),
                value: self.price_usd,
            });
        }
        if !self.change_24h_pct.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "change_24h_pct".to_string(),
                value: self.change_24h_pct,
            });
        }
        if self.price_usd < 0.0 {
            return Err(ValidationError::NegativePrice {
                field: "price_usd".to_string(),
                value: self.price_usd,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ad_hoc_asset() {
        let asset = Asset::ad_hoc("  pepecoin ");
        assert_eq!(asset.name, "pepecoin");
        assert_eq!(asset.symbol, "PEPE");
        assert_eq!(asset.id, UNKNOWN_ASSET_ID);
        assert!(!asset.is_listed());

        let short = Asset::ad_hoc("ab");
        assert_eq!(short.symbol, "AB");
    }

    #[test]
    fn test_price_quote_validation() {
        assert!(PriceQuote::UNAVAILABLE.validate().is_ok());
        assert!(PriceQuote::UNAVAILABLE.is_unavailable());
        assert!(PriceQuote::new(43_250.1, -2.5).validate().is_ok());

        let err = PriceQuote::new(-1.0, 0.0).validate().unwrap_err();
        assert_eq!(err.field(), "price_usd");

        let err = PriceQuote::new(1.0, f64::NAN).validate().unwrap_err();
        assert_eq!(err.field(), "change_24h_pct");
    }
}
