mod coin_info;
mod history;
mod portfolio;
mod transaction;

pub use coin_info::{CoinInfo, CoinRegistry, RiskTable, DEFAULT_RISK_SCORE};
pub use history::HistorySnapshot;
pub use portfolio::{PortfolioEntry, PortfolioLedger};
pub use transaction::{TradeAction, TransactionRecord};
