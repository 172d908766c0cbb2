//! The tracked asset registry.
//!
//! The market page shows a fixed set of assets; each entry routes to the
//! upstream that prices it.

/// Where an asset's price comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    /// Binance spot ticker against USDT.
    CryptoUsdt {
        /// Base symbol ("BTC").
        symbol: &'static str,
    },
    /// metals.live spot price.
    MetalSpot {
        /// Spot symbol ("XAU").
        symbol: &'static str,
    },
    /// Alpha Vantage currency exchange rate.
    Forex {
        /// From currency.
        from: &'static str,
        /// To currency.
        to: &'static str,
    },
    /// Yahoo Finance chart meta price.
    EquityIndex {
        /// Yahoo chart symbol ("XU100.IS").
        symbol: &'static str,
    },
}

/// A tracked asset.
#[derive(Debug, Clone, Copy)]
pub struct Asset {
    /// Stable key used in URLs and the cache ("btc", "gold", ...).
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Display logo (emoji, matching the frontend cards).
    pub logo: &'static str,
    /// Upstream routing.
    pub source: AssetSource,
    /// Decimal places used when formatting the display value.
    pub display_decimals: u32,
}

/// All assets shown on the market page.
pub const TRACKED_ASSETS: &[Asset] = &[
    Asset {
        key: "btc",
        name: "Bitcoin",
        logo: "₿",
        source: AssetSource::CryptoUsdt { symbol: "BTC" },
        display_decimals: 2,
    },
    Asset {
        key: "gold",
        name: "Gold (oz)",
        logo: "🥇",
        source: AssetSource::MetalSpot { symbol: "XAU" },
        display_decimals: 2,
    },
    Asset {
        key: "silver",
        name: "Silver (oz)",
        logo: "🥈",
        source: AssetSource::MetalSpot { symbol: "XAG" },
        display_decimals: 2,
    },
    Asset {
        key: "copper",
        name: "Copper (lb)",
        logo: "🥉",
        source: AssetSource::MetalSpot { symbol: "COPPER" },
        display_decimals: 2,
    },
    Asset {
        key: "usd_try",
        name: "USD/TRY",
        logo: "💵",
        source: AssetSource::Forex {
            from: "USD",
            to: "TRY",
        },
        display_decimals: 4,
    },
    Asset {
        key: "eur_try",
        name: "EUR/TRY",
        logo: "💶",
        source: AssetSource::Forex {
            from: "EUR",
            to: "TRY",
        },
        display_decimals: 4,
    },
    Asset {
        key: "bist100",
        name: "BIST 100",
        logo: "📊",
        source: AssetSource::EquityIndex { symbol: "XU100.IS" },
        display_decimals: 2,
    },
];

/// Look up a tracked asset by key.
#[must_use]
pub fn find_asset(key: &str) -> Option<&'static Asset> {
    TRACKED_ASSETS.iter().find(|a| a.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<_> = TRACKED_ASSETS.iter().map(|a| a.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), TRACKED_ASSETS.len());
    }

    #[test]
    fn find_asset_by_key() {
        assert!(find_asset("btc").is_some());
        assert!(find_asset("bist100").is_some());
        assert!(find_asset("dogecoin").is_none());
    }
}
