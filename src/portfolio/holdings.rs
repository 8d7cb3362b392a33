//! Reconciles the holdings ledger against live quotes into a point-in-time
//! valuation.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::market_data::MarketDataProvider;
use crate::storage::Storage;

use super::models::{Holding, HoldingsView};

/// Exchange label shown in the holdings table; the ledger does not track
/// per-position venues.
const DEFAULT_EXCHANGE: &str = "Binance";

/// Combines the persisted ledger with one batched quote fetch.
///
/// Valuation fails closed: if the quote fetch fails, or any held symbol comes
/// back without a quote, the whole view degrades to empty holdings and zero
/// totals.
pub struct HoldingsReconciler {
    storage: Arc<dyn Storage>,
    market_data: Arc<dyn MarketDataProvider>,
}

impl HoldingsReconciler {
    pub fn new(storage: Arc<dyn Storage>, market_data: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            storage,
            market_data,
        }
    }

    pub async fn compute(&self) -> HoldingsView {
        let ledger = match self.storage.load_portfolio().await {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!(error = %e, "Failed to load portfolio ledger; valuing nothing");
                return HoldingsView::default();
            }
        };
        if ledger.is_empty() {
            return HoldingsView::default();
        }

        let symbols = ledger.symbols();
        let quotes = match self.market_data.fetch_quotes(&symbols).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(
                    error = %e,
                    provider = self.market_data.name(),
                    "Quote fetch failed; valuation fails closed"
                );
                return HoldingsView::default();
            }
        };

        let mut priced = Vec::with_capacity(ledger.entries.len());
        for (symbol, entry) in &ledger.entries {
            match quotes.get(symbol.as_str()) {
                Some(quote) => priced.push((symbol, entry, quote)),
                None => {
                    warn!(symbol = %symbol, "No quote for held symbol; valuation fails closed");
                    return HoldingsView::default();
                }
            }
        }

        let registry = match self.storage.load_coin_registry().await {
            Ok(registry) => registry,
            Err(e) => {
                warn!(error = %e, "Failed to load coin registry; using fallback entries");
                Default::default()
            }
        };

        let mut current_value = Decimal::ZERO;
        let mut initial_investment = Decimal::ZERO;
        for (_, entry, quote) in &priced {
            current_value += entry.quantity * quote.price;
            initial_investment += entry.total_investment;
        }

        let holdings = priced
            .into_iter()
            .map(|(symbol, entry, quote)| {
                let value = entry.quantity * quote.price;
                let pnl_amount = value - entry.total_investment;
                let pnl_percentage = if entry.total_investment > Decimal::ZERO {
                    pnl_amount / entry.total_investment * Decimal::ONE_HUNDRED
                } else {
                    Decimal::ZERO
                };
                let allocation = if current_value > Decimal::ZERO {
                    (value / current_value * Decimal::ONE_HUNDRED).round_dp(2)
                } else {
                    Decimal::ZERO
                };

                Holding {
                    asset: quote.name.clone(),
                    symbol: symbol.clone(),
                    holdings: entry.quantity.round_dp(2),
                    exchange: DEFAULT_EXCHANGE.to_string(),
                    avg_price: entry.average_price,
                    current_price: quote.price,
                    value,
                    day_change: quote.percent_change_24h.round_dp(2),
                    week_change: quote.percent_change_7d.round_dp(2),
                    pnl_amount,
                    pnl_percentage,
                    allocation,
                    coin_info: registry.lookup(symbol),
                }
            })
            .collect();

        HoldingsView {
            holdings,
            current_value,
            initial_investment,
        }
    }
}
