use anyhow::{Context, Result};

use crate::format::{format_amount, format_usd};
use crate::models::TransactionRecord;

/// A rendered export. `content` is absent when the log could not be read.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub content: Option<String>,
    pub filename: String,
}

const HEADER: [&str; 8] = [
    "Date", "Time", "Action", "Symbol", "Amount", "Price", "Total", "Status",
];

/// Render transactions in the given order (the ledger queries hand them over
/// newest first). Timestamps are split into UTC date and time columns.
pub(crate) fn render_csv(transactions: &[TransactionRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER).context("Failed to write CSV header")?;

    for tx in transactions {
        writer
            .write_record([
                tx.timestamp.format("%Y-%m-%d").to_string(),
                tx.timestamp.format("%H:%M:%S").to_string(),
                tx.action.to_string(),
                tx.symbol.clone(),
                format_amount(tx.amount),
                format_usd(tx.price),
                format!("{:.2}", tx.total),
                "Completed".to_string(),
            ])
            .context("Failed to write CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeAction;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn renders_header_and_formatted_row() {
        let ts = Utc.with_ymd_and_hms(2023, 1, 15, 12, 0, 0).unwrap();
        let tx = TransactionRecord::new("BTC", TradeAction::Buy, dec!(0.1), dec!(35000), ts);

        let csv = render_csv(&[tx]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Date,Time,Action,Symbol,Amount,Price,Total,Status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2023-01-15,12:00:00,BUY,BTC,0.10,\"$35,000.00\",3500.00,Completed"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_log_renders_header_only() {
        let csv = render_csv(&[]).unwrap();
        assert_eq!(csv.trim(), "Date,Time,Action,Symbol,Amount,Price,Total,Status");
    }
}
