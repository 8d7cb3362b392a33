mod csv_export;

pub use csv_export::CsvExport;

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::models::{PortfolioEntry, TradeAction, TransactionRecord};
use crate::storage::Storage;

/// Failures from ledger mutations.
///
/// These are the only hard errors in the journal; analytics degrade to
/// defaults, but a rejected trade must reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("amount and price must be positive numbers (amount {amount}, price {price})")]
    InvalidAmount { amount: Decimal, price: Decimal },

    #[error("no position held for {symbol}")]
    UnknownAsset { symbol: String },

    #[error("unrecognized trade date {value:?}")]
    InvalidDate { value: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Optional per-trade fields.
#[derive(Debug, Clone, Default)]
pub struct TradeOptions {
    /// Trade time as entered by the user, interpreted in the configured
    /// local timezone. Current time when absent.
    pub date: Option<String>,
    pub exchange: Option<String>,
    pub wallet: Option<String>,
    pub notes: Option<String>,
}

/// Append-only trade log plus the derived holdings ledger.
///
/// Every buy/sell writes the updated ledger entry first, then appends the
/// transaction record. No cross-document transaction; a crash between the
/// two writes is reconciled manually.
pub struct TransactionLedger {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    local_timezone: Tz,
}

impl TransactionLedger {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, local_timezone: Tz) -> Self {
        Self {
            storage,
            clock,
            local_timezone,
        }
    }

    /// Record a purchase, folding it into the weighted-average cost basis.
    pub async fn record_buy(
        &self,
        symbol: &str,
        amount: Decimal,
        price: Decimal,
        options: TradeOptions,
    ) -> Result<TransactionRecord, LedgerError> {
        validate_trade(amount, price)?;
        let timestamp = self.resolve_timestamp(options.date.as_deref())?;

        let mut ledger = self.storage.load_portfolio().await?;
        let cost = amount * price;

        let entry = match ledger.entries.get(symbol) {
            Some(existing) => {
                let quantity = existing.quantity + amount;
                let total_investment = (existing.total_investment + cost).round_dp(2);
                let average_price = if quantity.is_zero() {
                    price
                } else {
                    total_investment / quantity
                };
                PortfolioEntry {
                    quantity,
                    average_price,
                    total_investment,
                    allocation_percentage: existing.allocation_percentage,
                }
            }
            None => PortfolioEntry {
                quantity: amount,
                average_price: price,
                total_investment: cost.round_dp(2),
                allocation_percentage: None,
            },
        };

        ledger.entries.insert(symbol.to_string(), entry);
        ledger.last_update = Some(self.clock.now());
        self.storage.save_portfolio(&ledger).await?;

        let record = TransactionRecord::new(symbol, TradeAction::Buy, amount, price, timestamp)
            .with_exchange(options.exchange)
            .with_wallet(options.wallet)
            .with_notes(options.notes);
        self.storage.append_transaction(&record).await?;

        info!(symbol, %amount, %price, "Recorded buy");
        Ok(record)
    }

    /// Record a sale against an existing position.
    ///
    /// Quantity is reduced without clamping and the cost basis fields are
    /// carried over unchanged, matching the historical ledger files.
    pub async fn record_sell(
        &self,
        symbol: &str,
        amount: Decimal,
        price: Decimal,
        options: TradeOptions,
    ) -> Result<TransactionRecord, LedgerError> {
        validate_trade(amount, price)?;
        let timestamp = self.resolve_timestamp(options.date.as_deref())?;

        let mut ledger = self.storage.load_portfolio().await?;
        let existing = ledger
            .entries
            .get(symbol)
            .ok_or_else(|| LedgerError::UnknownAsset {
                symbol: symbol.to_string(),
            })?;

        let entry = PortfolioEntry {
            quantity: existing.quantity - amount,
            average_price: existing.average_price,
            total_investment: existing.total_investment,
            allocation_percentage: existing.allocation_percentage,
        };

        ledger.entries.insert(symbol.to_string(), entry);
        ledger.last_update = Some(self.clock.now());
        self.storage.save_portfolio(&ledger).await?;

        let record = TransactionRecord::new(symbol, TradeAction::Sell, amount, price, timestamp)
            .with_exchange(options.exchange)
            .with_wallet(options.wallet)
            .with_notes(options.notes);
        self.storage.append_transaction(&record).await?;

        info!(symbol, %amount, %price, "Recorded sell");
        Ok(record)
    }

    /// All transactions, newest first. An unreadable log degrades to empty.
    pub async fn list_all(&self) -> Vec<TransactionRecord> {
        let mut transactions = match self.storage.load_transactions().await {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!(error = %e, "Failed to load transactions; treating log as empty");
                return Vec::new();
            }
        };
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        transactions
    }

    /// Transactions for one symbol, newest first.
    pub async fn list_by_symbol(&self, symbol: &str) -> Vec<TransactionRecord> {
        let mut transactions = self.list_all().await;
        transactions.retain(|tx| tx.symbol == symbol);
        transactions
    }

    /// Materialize the log (or one symbol's slice of it) as CSV.
    ///
    /// Never fails: on a storage problem the export carries no content and
    /// the default filename.
    pub async fn export_csv(&self, symbol: Option<&str>) -> CsvExport {
        let stamp = self.clock.now().format("%Y%m%d_%H%M%S");
        let (transactions, filename) = match symbol {
            Some(symbol) => (
                self.list_by_symbol(symbol).await,
                format!("{symbol}_transactions_{stamp}.csv"),
            ),
            None => (
                self.list_all().await,
                format!("all_transactions_{stamp}.csv"),
            ),
        };

        match csv_export::render_csv(&transactions) {
            Ok(content) => CsvExport {
                content: Some(content),
                filename,
            },
            Err(e) => {
                warn!(error = %e, "Failed to render transaction CSV");
                CsvExport {
                    content: None,
                    filename: "transactions.csv".to_string(),
                }
            }
        }
    }

    /// Resolve the trade timestamp: explicit local-time input converted to
    /// UTC, or the current time.
    fn resolve_timestamp(&self, date: Option<&str>) -> Result<DateTime<Utc>, LedgerError> {
        let Some(date) = date else {
            return Ok(self.clock.now());
        };

        // Inputs carrying an explicit offset are already unambiguous.
        if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
            return Ok(parsed.with_timezone(&Utc));
        }

        let naive = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M"))
            .map_err(|_| LedgerError::InvalidDate {
                value: date.to_string(),
            })?;

        let local = self
            .local_timezone
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| LedgerError::InvalidDate {
                value: date.to_string(),
            })?;

        Ok(local.with_timezone(&Utc))
    }
}

fn validate_trade(amount: Decimal, price: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO || price <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount { amount, price });
    }
    Ok(())
}
