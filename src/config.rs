use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default reporting/conversion currency.
fn default_quote_currency() -> String {
    "USD".to_string()
}

/// Default timezone in which user-supplied trade dates are interpreted.
fn default_local_timezone() -> String {
    "Europe/Bucharest".to_string()
}

fn default_api_base_url() -> String {
    "https://pro-api.coinmarketcap.com".to_string()
}

/// Market data provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// CoinMarketCap API key. Without it, quote fetches fail and the
    /// portfolio view degrades to empty holdings.
    pub api_key: Option<String>,

    /// Provider base URL. Overridable for self-hosted proxies and tests.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_api_base_url(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to data directory. If relative, resolved from config file location.
    /// If not specified, defaults to the config file's directory.
    pub data_dir: Option<PathBuf>,

    /// Currency quotes and valuations are denominated in (e.g., "USD").
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,

    /// IANA timezone for interpreting user-supplied trade dates.
    #[serde(default = "default_local_timezone")]
    pub local_timezone: String,

    /// Market data provider settings.
    #[serde(default)]
    pub market_data: MarketDataConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            quote_currency: default_quote_currency(),
            local_timezone: default_local_timezone(),
            market_data: MarketDataConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the data directory path.
    ///
    /// If `data_dir` is set and relative, it's resolved relative to `config_dir`.
    /// If `data_dir` is not set, returns `config_dir`.
    pub fn resolve_data_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.data_dir {
            Some(data_dir) if data_dir.is_absolute() => data_dir.clone(),
            Some(data_dir) => config_dir.join(data_dir),
            None => config_dir.to_path_buf(),
        }
    }
}

/// Loaded configuration with resolved paths and parsed timezone.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The resolved data directory path.
    pub data_dir: PathBuf,

    /// Currency quotes and valuations are denominated in.
    pub quote_currency: String,

    /// Timezone for interpreting user-supplied trade dates.
    pub local_timezone: chrono_tz::Tz,

    /// Market data provider settings.
    pub market_data: MarketDataConfig,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./coinledger.toml` if it exists in current directory
/// 2. `~/.local/share/coinledger/coinledger.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("coinledger.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("coinledger").join("coinledger.toml");
    }

    local_config
}

impl ResolvedConfig {
    fn resolve(config: Config, config_dir: &Path) -> Result<Self> {
        let local_timezone: chrono_tz::Tz = config
            .local_timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid timezone {:?}: {e}", config.local_timezone))?;

        Ok(Self {
            data_dir: config.resolve_data_dir(config_dir),
            quote_currency: config.quote_currency,
            local_timezone,
            market_data: config.market_data,
        })
    }

    /// Load and resolve config from a file path.
    ///
    /// The data directory is resolved relative to the config file's parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        let config = Config::load(&config_path)?;
        Self::resolve(config, config_dir)
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// With no config file, the config file's intended parent directory
    /// becomes the data directory.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            let config_path = if config_path.is_relative() {
                std::env::current_dir()
                    .context("Failed to get current directory")?
                    .join(config_path)
            } else {
                config_path.to_path_buf()
            };

            let config_dir = config_path
                .parent()
                .context("Config path has no parent directory")?
                .to_path_buf();

            Self::resolve(Config::default(), &config_dir)
        }
    }
}
