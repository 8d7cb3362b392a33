mod coinmarketcap;
mod models;
mod provider;

pub use coinmarketcap::CoinMarketCapProvider;
pub use models::{GlobalMetrics, Quote};
pub use provider::MarketDataProvider;

#[cfg(test)]
pub(crate) use provider::StaticQuotesProvider;
