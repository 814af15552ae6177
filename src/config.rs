use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DATABASE_URL: &str = "sqlite:./local_db.sqlite?mode=rwc";

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com";
pub const DEFAULT_CRYPTOCOMPARE_URL: &str = "https://min-api.cryptocompare.com";
pub const DEFAULT_COINBASE_URL: &str = "https://api.coinbase.com";

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database: DbSettings,
    pub pricing: PricingSettings,
}

#[derive(Debug, Clone)]
pub struct DbSettings {
    pub url: String,
    /// Attempts after the first failed handshake.
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub connect_timeout: Duration,
    pub max_connections: u32,
    /// Create missing tables on first connect.
    pub sync_schema: bool,
}

impl DbSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            connect_timeout: Duration::from_secs(5),
            max_connections: 10,
            sync_schema: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PricingSettings {
    pub coingecko_url: String,
    pub coingecko_api_key: Option<String>,
    pub cryptocompare_url: String,
    pub cryptocompare_api_key: Option<String>,
    pub coinbase_url: String,
    pub timeout: Duration,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            coingecko_url: DEFAULT_COINGECKO_URL.to_string(),
            coingecko_api_key: None,
            cryptocompare_url: DEFAULT_CRYPTOCOMPARE_URL.to_string(),
            cryptocompare_api_key: None,
            coinbase_url: DEFAULT_COINBASE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database = DbSettings {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_retries: parse_var("DB_CONNECT_RETRIES", 3)?,
            retry_delay: Duration::from_millis(parse_var("DB_RETRY_DELAY_MS", 1000)?),
            connect_timeout: Duration::from_secs(parse_var("DB_CONNECT_TIMEOUT_SECS", 5)?),
            max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
            sync_schema: parse_var("DB_SYNC_SCHEMA", true)?,
        };

        let pricing = PricingSettings {
            coingecko_url: env::var("COINGECKO_URL").unwrap_or_else(|_| DEFAULT_COINGECKO_URL.to_string()),
            coingecko_api_key: optional_var("COINGECKO_API_KEY"),
            cryptocompare_url: env::var("CRYPTOCOMPARE_URL")
                .unwrap_or_else(|_| DEFAULT_CRYPTOCOMPARE_URL.to_string()),
            cryptocompare_api_key: optional_var("CRYPTOCOMPARE_API_KEY"),
            coinbase_url: env::var("COINBASE_URL").unwrap_or_else(|_| DEFAULT_COINBASE_URL.to_string()),
            timeout: Duration::from_secs(parse_var("PRICE_TIMEOUT_SECS", 5)?),
        };

        Ok(Config {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            database,
            pricing,
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}
