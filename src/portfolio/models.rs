use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{CoinInfo, TransactionRecord};

use super::risk::RiskBand;

/// A valued position, regenerated from the ledger and live quotes on every
/// request. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    /// Display name from the quote provider (e.g. "Bitcoin").
    pub asset: String,
    pub symbol: String,
    /// Quantity held, rounded for display.
    pub holdings: Decimal,
    pub exchange: String,
    pub avg_price: Decimal,
    pub current_price: Decimal,
    pub value: Decimal,
    pub day_change: Decimal,
    pub week_change: Decimal,
    pub pnl_amount: Decimal,
    pub pnl_percentage: Decimal,
    /// Share of the portfolio's current value, in percent.
    pub allocation: Decimal,
    pub coin_info: CoinInfo,
}

/// Point-in-time valuation of the whole ledger.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HoldingsView {
    pub holdings: Vec<Holding>,
    pub current_value: Decimal,
    pub initial_investment: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfitLoss {
    pub amount: Decimal,
    pub percentage: Decimal,
}

/// Value change against a past history snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodChange {
    pub amount: Decimal,
    pub percentage: Decimal,
    pub is_positive: bool,
}

impl Default for PeriodChange {
    fn default() -> Self {
        Self {
            amount: Decimal::ZERO,
            percentage: Decimal::ZERO,
            is_positive: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PeriodChanges {
    #[serde(rename = "24h")]
    pub day: PeriodChange,
    #[serde(rename = "7d")]
    pub week: PeriodChange,
    #[serde(rename = "30d")]
    pub month: PeriodChange,
}

/// Named bucket for a metric value, with the gauge styling the frontend
/// renders (accent color and fill width).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierRating {
    pub level: String,
    pub color: String,
    pub width: String,
}

impl TierRating {
    pub(crate) fn new(level: &str, color: &str, width: &str) -> Self {
        Self {
            level: level.to_string(),
            color: color.to_string(),
            width: width.to_string(),
        }
    }
}

/// Tier classifications for the four headline risk metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricTiers {
    pub volatility: TierRating,
    pub diversity: TierRating,
    pub max_drawdown: TierRating,
    pub sharpe_ratio: TierRating,
}

/// One chart sample; `x` is epoch milliseconds for the frontend plotter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: i64,
    pub total_value: Decimal,
    pub total_investment: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percentage: Decimal,
}

/// History samples bucketed into the chart's selectable windows. An entry
/// appears in every window whose span covers it; each window is sorted
/// ascending by timestamp.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartData {
    #[serde(rename = "1D")]
    pub one_day: Vec<ChartPoint>,
    #[serde(rename = "1W")]
    pub one_week: Vec<ChartPoint>,
    #[serde(rename = "1M")]
    pub one_month: Vec<ChartPoint>,
    #[serde(rename = "3M")]
    pub three_months: Vec<ChartPoint>,
    #[serde(rename = "1Y")]
    pub one_year: Vec<ChartPoint>,
    #[serde(rename = "All")]
    pub all: Vec<ChartPoint>,
}

/// The consolidated read model the presentation layer consumes.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioView {
    pub holdings: Vec<Holding>,
    pub current_value: Decimal,
    pub initial_investment: Decimal,

    /// Allocation-weighted 24h change across holdings, in percent.
    pub weighted_change_24h: Decimal,
    pub is_positive_total_value: bool,
    pub all_time_low: Decimal,
    pub all_time_high: Decimal,

    pub profit_loss: ProfitLoss,
    pub is_positive_all_time: bool,
    pub changes: PeriodChanges,

    pub assets_count: usize,
    pub diversity_score: Decimal,
    pub risk_band: RiskBand,
    pub risk_score: Decimal,
    pub volatility: Decimal,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub risk_levels: MetricTiers,

    pub transactions: Vec<TransactionRecord>,
    pub chart_data: ChartData,
}
