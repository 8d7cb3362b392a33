//! The single read path the presentation layer consumes.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

use crate::clock::Clock;
use crate::market_data::MarketDataProvider;
use crate::models::{HistorySnapshot, RiskTable, TransactionRecord};
use crate::storage::Storage;

use super::analytics::{all_time_low_high, diversity_score, period_changes, profit_loss};
use super::holdings::HoldingsReconciler;
use super::models::{Holding, MetricTiers, PortfolioView};
use super::performance::{chart_series, drawdown_and_sharpe};
use super::risk::{classify_metric, portfolio_risk, portfolio_volatility, RiskMetric};

/// Composes the holdings valuation with the full analytics suite.
///
/// Everything is recomputed from scratch on every call; nothing is cached.
/// The view is read-only; mutations go through the transaction ledger.
pub struct PortfolioService {
    storage: Arc<dyn Storage>,
    reconciler: HoldingsReconciler,
    clock: Arc<dyn Clock>,
}

impl PortfolioService {
    pub fn new(
        storage: Arc<dyn Storage>,
        market_data: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reconciler: HoldingsReconciler::new(storage.clone(), market_data),
            storage,
            clock,
        }
    }

    pub async fn build_view(&self) -> PortfolioView {
        let valuation = self.reconciler.compute().await;
        let now = self.clock.now_naive();

        let history = self.load_history().await;
        let risk_table = self.load_risk_table().await;
        let transactions = self.load_transactions().await;

        let profit_loss = profit_loss(valuation.current_value, valuation.initial_investment);
        let (all_time_low, all_time_high) = all_time_low_high(&history);
        let changes = period_changes(&history, now);

        let diversity = diversity_score(&valuation.holdings);
        let (risk_band, risk_score) = portfolio_risk(&valuation.holdings, &risk_table);
        let volatility = portfolio_volatility(&valuation.holdings);
        let (max_drawdown, sharpe_ratio) = drawdown_and_sharpe(&history, now);

        let weighted_change_24h = weighted_day_change(&valuation.holdings);

        let risk_levels = MetricTiers {
            volatility: classify_metric(decimal_as_f64(volatility), RiskMetric::Volatility),
            diversity: classify_metric(decimal_as_f64(diversity), RiskMetric::Diversity),
            max_drawdown: classify_metric(max_drawdown, RiskMetric::MaxDrawdown),
            sharpe_ratio: classify_metric(sharpe_ratio, RiskMetric::SharpeRatio),
        };

        PortfolioView {
            assets_count: valuation.holdings.len(),
            is_positive_total_value: weighted_change_24h > Decimal::ZERO,
            is_positive_all_time: profit_loss.amount > Decimal::ZERO,
            chart_data: chart_series(&history, now),
            holdings: valuation.holdings,
            current_value: valuation.current_value,
            initial_investment: valuation.initial_investment,
            weighted_change_24h,
            all_time_low,
            all_time_high,
            profit_loss,
            changes,
            diversity_score: diversity,
            risk_band,
            risk_score,
            volatility,
            max_drawdown,
            sharpe_ratio,
            risk_levels,
            transactions,
        }
    }

    async fn load_history(&self) -> Vec<HistorySnapshot> {
        match self.storage.load_history().await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "Failed to load valuation history; treating as empty");
                Vec::new()
            }
        }
    }

    async fn load_risk_table(&self) -> RiskTable {
        match self.storage.load_risk_table().await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Failed to load risk table; treating as empty");
                RiskTable::default()
            }
        }
    }

    async fn load_transactions(&self) -> Vec<TransactionRecord> {
        match self.storage.load_transactions().await {
            Ok(mut transactions) => {
                transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                transactions
            }
            Err(e) => {
                warn!(error = %e, "Failed to load transactions; treating log as empty");
                Vec::new()
            }
        }
    }
}

/// Allocation-weighted 24h change across holdings, in percent, 2dp.
fn weighted_day_change(holdings: &[Holding]) -> Decimal {
    holdings
        .iter()
        .map(|h| h.day_change * h.allocation / Decimal::ONE_HUNDRED)
        .sum::<Decimal>()
        .round_dp(2)
}

fn decimal_as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
