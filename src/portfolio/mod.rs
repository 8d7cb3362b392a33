mod analytics;
mod holdings;
mod models;
mod performance;
mod risk;
mod service;

pub use analytics::{all_time_low_high, diversity_score, period_changes, profit_loss};
pub use holdings::HoldingsReconciler;
pub use models::*;
pub use performance::{chart_series, drawdown_and_sharpe};
pub use risk::{classify_metric, classify_metric_named, portfolio_risk, portfolio_volatility, RiskBand, RiskMetric};
pub use service::PortfolioService;
