use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::models::{CoinRegistry, HistorySnapshot, PortfolioLedger, RiskTable, TransactionRecord};

use super::Storage;

/// JSON file-based storage implementation.
///
/// One pretty-printed document per collection:
/// ```text
/// data/
///   portfolio.json            holdings ledger, keyed by symbol
///   transactions.json         append-only trade log
///   portfolio_history.json    valuation snapshots (external writer)
///   coin_mappings.json        symbol -> display metadata
///   asset_risk_levels.json    symbol -> risk score
/// ```
pub struct JsonFileStorage {
    base_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn portfolio_file(&self) -> PathBuf {
        self.base_path.join("portfolio.json")
    }

    fn transactions_file(&self) -> PathBuf {
        self.base_path.join("transactions.json")
    }

    fn history_file(&self) -> PathBuf {
        self.base_path.join("portfolio_history.json")
    }

    fn coin_mappings_file(&self) -> PathBuf {
        self.base_path.join("coin_mappings.json")
    }

    fn risk_table_file(&self) -> PathBuf {
        self.base_path.join("asset_risk_levels.json")
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create directory")?;
        }
        Ok(())
    }

    /// Read a JSON document, returning the default when the file is absent.
    async fn read_json_or_default<T>(&self, path: &Path) -> Result<T>
    where
        T: Default + for<'de> serde::Deserialize<'de>,
    {
        match fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON from {:?}", path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", path)),
        }
    }

    async fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir(path).await?;
        let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Storage for JsonFileStorage {
    async fn load_portfolio(&self) -> Result<PortfolioLedger> {
        self.read_json_or_default(&self.portfolio_file()).await
    }

    async fn save_portfolio(&self, ledger: &PortfolioLedger) -> Result<()> {
        self.write_json(&self.portfolio_file(), ledger).await
    }

    async fn load_transactions(&self) -> Result<Vec<TransactionRecord>> {
        self.read_json_or_default(&self.transactions_file()).await
    }

    async fn append_transaction(&self, tx: &TransactionRecord) -> Result<()> {
        let mut transactions = self.load_transactions().await?;
        transactions.push(tx.clone());
        self.write_json(&self.transactions_file(), &transactions)
            .await
    }

    async fn load_history(&self) -> Result<Vec<HistorySnapshot>> {
        self.read_json_or_default(&self.history_file()).await
    }

    async fn load_coin_registry(&self) -> Result<CoinRegistry> {
        self.read_json_or_default(&self.coin_mappings_file()).await
    }

    async fn load_risk_table(&self) -> Result<RiskTable> {
        self.read_json_or_default(&self.risk_table_file()).await
    }
}
