use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Live quote for one symbol, in the configured quote currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Display name reported by the provider (e.g. "Bitcoin").
    pub name: String,
    pub price: Decimal,
    pub percent_change_24h: Decimal,
    pub percent_change_7d: Decimal,
}

/// Aggregate market metrics, in the configured quote currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    pub total_market_cap: Decimal,
    pub total_volume_24h: Decimal,
    pub btc_dominance: Decimal,
    pub eth_dominance: Decimal,
    #[serde(default)]
    pub defi_market_cap: Decimal,
    #[serde(default)]
    pub defi_volume_24h: Decimal,
}
