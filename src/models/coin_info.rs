use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk score assumed for symbols absent from the risk table.
pub const DEFAULT_RISK_SCORE: u32 = 85;

/// Display metadata for one coin (frontend name, accent color, icon path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl CoinInfo {
    /// Placeholder entry for symbols the registry does not know about.
    pub fn fallback(symbol: &str) -> Self {
        Self {
            name: symbol.to_lowercase(),
            color: "#F0F0F0".to_string(),
            icon: None,
        }
    }
}

/// Symbol -> display metadata lookup, loaded from `coin_mappings.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinRegistry(pub BTreeMap<String, CoinInfo>);

impl CoinRegistry {
    /// Metadata for `symbol`, or the neutral fallback entry if unmapped.
    pub fn lookup(&self, symbol: &str) -> CoinInfo {
        self.0
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| CoinInfo::fallback(symbol))
    }
}

/// Symbol -> risk score lookup, loaded from `asset_risk_levels.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskTable(pub BTreeMap<String, Decimal>);

impl RiskTable {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Score for `symbol`, defaulting to [`DEFAULT_RISK_SCORE`] when unknown.
    pub fn score(&self, symbol: &str) -> Decimal {
        self.0
            .get(symbol)
            .copied()
            .unwrap_or_else(|| Decimal::from(DEFAULT_RISK_SCORE))
    }
}
