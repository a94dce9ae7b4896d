// crates/common/src/catalog.rs
use crate::{Asset, Error, Result};

/// Catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub name: &'static str,
    pub symbol: &'static str,
    pub id: &'static str,
}

impl Listing {
    const fn new(name: &'static str, symbol: &'static str, id: &'static str) -> Self {
        Self { name, symbol, id }
    }

    pub fn to_asset(&self) -> Asset {
        Asset::new(self.id, self.name, self.symbol)
    }

    fn matches_exactly(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query) || self.symbol.eq_ignore_ascii_case(query)
    }

    fn contains(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.symbol.to_lowercase().contains(needle_lower)
    }
}

/// Assets with a known price-feed id
pub const LISTINGS: &[Listing] = &[
    Listing::new("Bitcoin", "BTC", "bitcoin"),
    Listing::new("Ethereum", "ETH", "ethereum"),
    Listing::new("Solana", "SOL", "solana"),
    Listing::new("Cardano", "ADA", "cardano"),
    Listing::new("Ripple", "XRP", "ripple"),
    Listing::new("Polkadot", "DOT", "polkadot"),
    Listing::new("Avalanche", "AVAX", "avalanche-2"),
    Listing::new("Polygon", "MATIC", "matic-network"),
    Listing::new("Chainlink", "LINK", "chainlink"),
    Listing::new("Uniswap", "UNI", "uniswap"),
    Listing::new("Litecoin", "LTC", "litecoin"),
    Listing::new("Cosmos", "ATOM", "cosmos"),
    Listing::new("Algorand", "ALGO", "algorand"),
    Listing::new("VeChain", "VET", "vechain"),
    Listing::new("Hedera", "HBAR", "hedera-hashgraph"),
    Listing::new("Internet Computer", "ICP", "internet-computer"),
    Listing::new("Filecoin", "FIL", "filecoin"),
    Listing::new("Arbitrum", "ARB", "arbitrum"),
    Listing::new("Optimism", "OP", "optimism"),
    Listing::new("Aptos", "APT", "aptos"),
    Listing::new("Sui", "SUI", "sui"),
    Listing::new("Stellar", "XLM", "stellar"),
    Listing::new("The Graph", "GRT", "the-graph"),
    Listing::new("Sandbox", "SAND", "the-sandbox"),
    Listing::new("Decentraland", "MANA", "decentraland"),
    Listing::new("Aave", "AAVE", "aave"),
    Listing::new("Maker", "MKR", "maker"),
    Listing::new("Injective", "INJ", "injective-protocol"),
    Listing::new("Near Protocol", "NEAR", "near"),
    Listing::new("Fantom", "FTM", "fantom"),
];

/// Price-feed ids of every listed asset
pub fn feed_ids() -> Vec<String> {
    LISTINGS.iter().map(|l| l.id.to_string()).collect()
}

/// Exact, case-insensitive match on name or symbol
pub fn find(query: &str) -> Option<&'static Listing> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    LISTINGS.iter().find(|l| l.matches_exactly(query))
}

/// Substring suggestions in catalog order
pub fn suggest(query: &str, limit: usize) -> Vec<&'static Listing> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    LISTINGS
        .iter()
        .filter(|l| l.contains(&needle))
        .take(limit)
        .collect()
}

/// Catalog asset for the query, or an ad-hoc asset if nothing matches
pub fn resolve(query: &str) -> Result<Asset> {
    if query.trim().is_empty() {
        return Err(Error::InvalidData("empty asset query".to_string()));
    }

    // Ad-hoc assets have no feed id, so price lookups fall back to the sentinel.
    Ok(find(query).map_or_else(|| Asset::ad_hoc(query), Listing::to_asset))
}
