use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

/// One buy/sell event in the append-only transaction log.
///
/// Records are never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub symbol: String,
    pub action: TradeAction,
    /// Quantity traded, rounded to 6 decimal places at write time.
    pub amount: Decimal,
    /// Unit price, rounded to 6 decimal places at write time.
    pub price: Decimal,
    /// `amount * price` rounded to 2 decimal places.
    pub total: Decimal,
    #[serde(default = "default_unknown")]
    pub exchange: String,
    #[serde(default = "default_unknown")]
    pub wallet: String,
    #[serde(default)]
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

fn default_unknown() -> String {
    "Unknown".to_string()
}

impl TransactionRecord {
    pub fn new(
        symbol: impl Into<String>,
        action: TradeAction,
        amount: Decimal,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let amount = amount.round_dp(6);
        let price = price.round_dp(6);
        Self {
            symbol: symbol.into(),
            action,
            amount,
            price,
            total: (amount * price).round_dp(2),
            exchange: default_unknown(),
            wallet: default_unknown(),
            notes: String::new(),
            timestamp,
        }
    }

    pub fn with_exchange(mut self, exchange: Option<String>) -> Self {
        if let Some(exchange) = exchange {
            self.exchange = exchange;
        }
        self
    }

    pub fn with_wallet(mut self, wallet: Option<String>) -> Self {
        if let Some(wallet) = wallet {
            self.wallet = wallet;
        }
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        if let Some(notes) = notes {
            self.notes = notes;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn total_is_rounded_to_cents() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let tx = TransactionRecord::new("BTC", TradeAction::Buy, dec!(0.333333), dec!(29999.99), ts);
        assert_eq!(tx.total, dec!(9999.99));
    }

    #[test]
    fn action_serializes_uppercase() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let tx = TransactionRecord::new("ETH", TradeAction::Sell, dec!(2), dec!(2200), ts);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["action"], "SELL");
        assert_eq!(json["exchange"], "Unknown");
        assert_eq!(json["notes"], "");
    }

    #[test]
    fn defaults_apply_when_fields_missing() {
        let json = r#"{
            "symbol": "BTC",
            "action": "BUY",
            "amount": 0.1,
            "price": 35000.0,
            "total": 3500.0,
            "timestamp": "2023-01-15T12:00:00Z"
        }"#;
        let tx: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(tx.exchange, "Unknown");
        assert_eq!(tx.wallet, "Unknown");
        assert_eq!(tx.notes, "");
    }
}
