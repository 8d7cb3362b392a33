use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the history snapshot writer.
pub const HISTORY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A point-in-time valuation appended by the snapshot job.
///
/// Read-only here: the analytics layer consumes these, it never writes them.
/// `datetime` is kept as the raw stored string; malformed entries get a
/// fallback timestamp at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub datetime: String,
    pub total_value: Decimal,
    pub total_investment: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percentage: Decimal,
}

impl HistorySnapshot {
    /// Parse the stored timestamp, if well-formed.
    pub fn parsed_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.datetime, HISTORY_DATETIME_FORMAT).ok()
    }
}
