//! CoinMarketCap market data provider.
//!
//! Uses the `cryptocurrency/quotes/latest` endpoint for batched symbol
//! quotes and `global-metrics/quotes/latest` for aggregate market data.
//! Both require an API key sent in the `X-CMC_PRO_API_KEY` header.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::MarketDataConfig;

use super::{GlobalMetrics, MarketDataProvider, Quote};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: HashMap<String, CoinEntry>,
}

#[derive(Debug, Deserialize)]
struct CoinEntry {
    name: String,
    quote: HashMap<String, QuoteEntry>,
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    price: Decimal,
    #[serde(default)]
    percent_change_24h: Decimal,
    #[serde(default)]
    percent_change_7d: Decimal,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    btc_dominance: Decimal,
    eth_dominance: Decimal,
    #[serde(default)]
    defi_market_cap: Decimal,
    #[serde(default)]
    defi_volume_24h: Decimal,
    quote: HashMap<String, GlobalQuoteEntry>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteEntry {
    total_market_cap: Decimal,
    total_volume_24h: Decimal,
}

/// CoinMarketCap client.
///
/// The base URL is overridable so tests can point it at a mock server.
pub struct CoinMarketCapProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    convert: String,
}

impl CoinMarketCapProvider {
    pub fn new(config: &MarketDataConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            convert: "USD".to_string(),
        }
    }

    /// Overrides the base URL (mock servers, self-hosted proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the conversion currency for quotes (default "USD").
    pub fn with_convert(mut self, convert: impl Into<String>) -> Self {
        self.convert = convert.into().to_uppercase();
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("CoinMarketCap API key not configured")
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("X-CMC_PRO_API_KEY", api_key)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .with_context(|| format!("CoinMarketCap request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("CoinMarketCap API error: {} - {}", status, body));
        }

        response
            .json()
            .await
            .with_context(|| format!("CoinMarketCap response did not match schema: {path}"))
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for CoinMarketCapProvider {
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<HashMap<String, Quote>> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let symbol_list = symbols.join(",");
        tracing::debug!(symbols = %symbol_list, "Requesting quotes");

        let response: QuotesResponse = self
            .get_json(
                "/v1/cryptocurrency/quotes/latest",
                &[("symbol", symbol_list.as_str()), ("convert", &self.convert)],
            )
            .await?;

        let mut quotes = HashMap::new();
        for (symbol, entry) in response.data {
            let quote = entry.quote.get(&self.convert).with_context(|| {
                format!("Quote for {symbol} missing {} conversion", self.convert)
            })?;
            quotes.insert(
                symbol,
                Quote {
                    name: entry.name,
                    price: quote.price,
                    percent_change_24h: quote.percent_change_24h,
                    percent_change_7d: quote.percent_change_7d,
                },
            );
        }

        Ok(quotes)
    }

    async fn fetch_global_metrics(&self) -> Result<GlobalMetrics> {
        let response: GlobalResponse = self
            .get_json(
                "/v1/global-metrics/quotes/latest",
                &[("convert", self.convert.as_str())],
            )
            .await?;

        let quote = response.data.quote.get(&self.convert).with_context(|| {
            format!("Global metrics missing {} conversion", self.convert)
        })?;

        Ok(GlobalMetrics {
            total_market_cap: quote.total_market_cap,
            total_volume_24h: quote.total_volume_24h,
            btc_dominance: response.data.btc_dominance,
            eth_dominance: response.data.eth_dominance,
            defi_market_cap: response.data.defi_market_cap,
            defi_volume_24h: response.data.defi_volume_24h,
        })
    }

    fn name(&self) -> &str {
        "coinmarketcap"
    }
}
