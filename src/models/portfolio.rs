use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position held for one symbol.
///
/// `average_price` and `total_investment` track the cost basis and are
/// maintained by buys only; a sell reduces `quantity` and leaves both
/// untouched (matching the journal's historical ledger files).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub total_investment: Decimal,
    /// Derived share of the portfolio at the last write. Display-only;
    /// the reconciler recomputes allocations from live quotes on every read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_percentage: Option<Decimal>,
}

/// The holdings ledger document, keyed by symbol.
///
/// Serialized with entries flattened beside the `last_update` metadata key,
/// so the JSON document reads as `{"BTC": {...}, "last_update": ...}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioLedger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, PortfolioEntry>,
}

impl PortfolioLedger {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Symbols of all held assets, skipping ledger metadata.
    pub fn symbols(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn get(&self, symbol: &str) -> Option<&PortfolioEntry> {
        self.entries.get(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ledger_round_trips_with_metadata_key() {
        let mut ledger = PortfolioLedger::default();
        ledger.entries.insert(
            "BTC".to_string(),
            PortfolioEntry {
                quantity: dec!(0.5),
                average_price: dec!(30000),
                total_investment: dec!(15000),
                allocation_percentage: None,
            },
        );
        ledger.last_update = Some(chrono::Utc::now());

        let json = serde_json::to_string_pretty(&ledger).unwrap();
        let parsed: PortfolioLedger = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.symbols(), vec!["BTC".to_string()]);
        assert_eq!(parsed.get("BTC").unwrap().quantity, dec!(0.5));
        assert!(parsed.last_update.is_some());
    }

    #[test]
    fn symbols_excludes_last_update() {
        let json = r#"{
            "BTC": {"quantity": 1.0, "average_price": 30000.0, "total_investment": 30000.0},
            "last_update": "2025-01-15T12:00:00Z"
        }"#;
        let ledger: PortfolioLedger = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.symbols(), vec!["BTC".to_string()]);
    }
}
