//! In-memory storage implementation for testing.

use anyhow::Result;
use tokio::sync::Mutex;

use crate::models::{CoinRegistry, HistorySnapshot, PortfolioLedger, RiskTable, TransactionRecord};

use super::Storage;

/// In-memory storage for testing purposes.
#[derive(Default)]
pub struct MemoryStorage {
    portfolio: Mutex<PortfolioLedger>,
    transactions: Mutex<Vec<TransactionRecord>>,
    history: Mutex<Vec<HistorySnapshot>>,
    coin_registry: Mutex<CoinRegistry>,
    risk_table: Mutex<RiskTable>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_history(&self, entries: Vec<HistorySnapshot>) {
        *self.history.lock().await = entries;
    }

    pub async fn set_coin_registry(&self, registry: CoinRegistry) {
        *self.coin_registry.lock().await = registry;
    }

    pub async fn set_risk_table(&self, table: RiskTable) {
        *self.risk_table.lock().await = table;
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn load_portfolio(&self) -> Result<PortfolioLedger> {
        Ok(self.portfolio.lock().await.clone())
    }

    async fn save_portfolio(&self, ledger: &PortfolioLedger) -> Result<()> {
        *self.portfolio.lock().await = ledger.clone();
        Ok(())
    }

    async fn load_transactions(&self) -> Result<Vec<TransactionRecord>> {
        Ok(self.transactions.lock().await.clone())
    }

    async fn append_transaction(&self, tx: &TransactionRecord) -> Result<()> {
        self.transactions.lock().await.push(tx.clone());
        Ok(())
    }

    async fn load_history(&self) -> Result<Vec<HistorySnapshot>> {
        Ok(self.history.lock().await.clone())
    }

    async fn load_coin_registry(&self) -> Result<CoinRegistry> {
        Ok(self.coin_registry.lock().await.clone())
    }

    async fn load_risk_table(&self) -> Result<RiskTable> {
        Ok(self.risk_table.lock().await.clone())
    }
}
