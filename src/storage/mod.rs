mod json_file;
mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

use anyhow::Result;

use crate::models::{CoinRegistry, HistorySnapshot, PortfolioLedger, RiskTable, TransactionRecord};

/// Storage trait for the journal's persisted collections.
///
/// Absence of a collection is not an error: loads return empty defaults for
/// data that was never written. An `Err` means the backing document exists
/// but could not be read or parsed; services decide whether to degrade to an
/// empty collection or surface the failure.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    // Holdings ledger
    async fn load_portfolio(&self) -> Result<PortfolioLedger>;
    async fn save_portfolio(&self, ledger: &PortfolioLedger) -> Result<()>;

    // Transaction log (append-only)
    async fn load_transactions(&self) -> Result<Vec<TransactionRecord>>;
    async fn append_transaction(&self, tx: &TransactionRecord) -> Result<()>;

    // Valuation history, written by the snapshot job
    async fn load_history(&self) -> Result<Vec<HistorySnapshot>>;

    // Static lookup tables
    async fn load_coin_registry(&self) -> Result<CoinRegistry>;
    async fn load_risk_table(&self) -> Result<RiskTable>;
}
