use std::collections::HashMap;

use anyhow::Result;

use super::{GlobalMetrics, Quote};

/// Source of live quotes and aggregate market metrics.
///
/// Any upstream problem (missing credentials, non-2xx response, transport
/// error, unexpected payload shape) surfaces as `Err`. Callers fail closed:
/// no partial valuations from a partial quote set.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch quotes for all `symbols` in one batched call.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<HashMap<String, Quote>>;

    async fn fetch_global_metrics(&self) -> Result<GlobalMetrics>;

    fn name(&self) -> &str;
}

/// Fixed in-memory provider for unit tests.
#[cfg(test)]
pub(crate) struct StaticQuotesProvider {
    pub quotes: HashMap<String, Quote>,
    pub fail: bool,
}

#[cfg(test)]
impl StaticQuotesProvider {
    pub fn new(quotes: HashMap<String, Quote>) -> Self {
        Self {
            quotes,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            quotes: HashMap::new(),
            fail: true,
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl MarketDataProvider for StaticQuotesProvider {
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<HashMap<String, Quote>> {
        if self.fail {
            anyhow::bail!("static provider configured to fail");
        }
        Ok(symbols
            .iter()
            .filter_map(|s| self.quotes.get(s).map(|q| (s.clone(), q.clone())))
            .collect())
    }

    async fn fetch_global_metrics(&self) -> Result<GlobalMetrics> {
        anyhow::bail!("static provider has no global metrics")
    }

    fn name(&self) -> &str {
        "static"
    }
}
