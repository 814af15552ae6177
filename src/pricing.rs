//! ETH/USD quotes from public price APIs, with a static last resort.
//!
//! Providers are tried in a fixed order and the first positive rate wins.
//! When every provider fails the oracle answers with `FALLBACK_ETH_USD_RATE`
//! rather than an error; callers can tell from `RateSource::Fallback`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use utoipa::ToSchema;

use crate::config::PricingSettings;

/// Rate used when no provider answers (USD per ETH).
pub const FALLBACK_ETH_USD_RATE: f64 = 3000.0;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Eth,
}

impl Currency {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "usd" => Some(Currency::Usd),
            "eth" => Some(Currency::Eth),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => f.write_str("USD"),
            Currency::Eth => f.write_str("ETH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateSource {
    Live(&'static str),
    Fallback,
}

impl RateSource {
    pub fn label(&self) -> &'static str {
        match self {
            RateSource::Live(provider) => provider,
            RateSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// USD per ETH
    pub rate: f64,
    pub source: RateSource,
}

impl Quote {
    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub from: Currency,
    pub to: Currency,
    pub result: f64,
    pub quote: Quote,
}

#[derive(Debug, Clone)]
enum QuoteProvider {
    CoinGecko { base_url: String, api_key: Option<String> },
    CryptoCompare { base_url: String, api_key: Option<String> },
    Coinbase { base_url: String },
}

impl QuoteProvider {
    fn name(&self) -> &'static str {
        match self {
            QuoteProvider::CoinGecko { .. } => "coingecko",
            QuoteProvider::CryptoCompare { .. } => "cryptocompare",
            QuoteProvider::Coinbase { .. } => "coinbase",
        }
    }

    async fn fetch_eth_usd(&self, client: &Client) -> Result<f64, BoxError> {
        match self {
            QuoteProvider::CoinGecko { base_url, api_key } => {
                let url = format!(
                    "{}/api/v3/simple/price?ids=ethereum&vs_currencies=usd",
                    base_url.trim_end_matches('/')
                );
                let mut request = client.get(&url);
                if let Some(key) = api_key {
                    request = request.header("x-cg-demo-api-key", key);
                }
                let body: CoinGeckoPrice = request.send().await?.error_for_status()?.json().await?;
                Ok(body.ethereum.usd)
            }
            QuoteProvider::CryptoCompare { base_url, api_key } => {
                let url = format!(
                    "{}/data/price?fsym=ETH&tsyms=USD",
                    base_url.trim_end_matches('/')
                );
                let mut request = client.get(&url);
                if let Some(key) = api_key {
                    request = request.header("authorization", format!("Apikey {}", key));
                }
                let body: CryptoComparePrice = request.send().await?.error_for_status()?.json().await?;
                Ok(body.usd)
            }
            QuoteProvider::Coinbase { base_url } => {
                let url = format!("{}/v2/prices/ETH-USD/spot", base_url.trim_end_matches('/'));
                let body: CoinbaseSpot = client.get(&url).send().await?.error_for_status()?.json().await?;
                Ok(body.data.amount.parse::<f64>()?)
            }
        }
    }
}

#[derive(Deserialize)]
struct CoinGeckoPrice {
    ethereum: UsdField,
}

#[derive(Deserialize)]
struct UsdField {
    usd: f64,
}

#[derive(Deserialize)]
struct CryptoComparePrice {
    #[serde(rename = "USD")]
    usd: f64,
}

#[derive(Deserialize)]
struct CoinbaseSpot {
    data: CoinbaseAmount,
}

#[derive(Deserialize)]
struct CoinbaseAmount {
    amount: String,
}

#[derive(Debug, Clone)]
pub struct PriceOracle {
    client: Client,
    providers: Vec<QuoteProvider>,
}

impl PriceOracle {
    pub fn new(settings: &PricingSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let providers = vec![
            QuoteProvider::CoinGecko {
                base_url: settings.coingecko_url.clone(),
                api_key: settings.coingecko_api_key.clone(),
            },
            QuoteProvider::CryptoCompare {
                base_url: settings.cryptocompare_url.clone(),
                api_key: settings.cryptocompare_api_key.clone(),
            },
            QuoteProvider::Coinbase {
                base_url: settings.coinbase_url.clone(),
            },
        ];
        Ok(Self { client, providers })
    }

    /// Current USD price of one ETH. Never fails.
    #[tracing::instrument(skip(self))]
    pub async fn eth_usd_rate(&self) -> Quote {
        for provider in &self.providers {
            match provider.fetch_eth_usd(&self.client).await {
                Ok(rate) if rate.is_finite() && rate > 0.0 => {
                    tracing::debug!(provider = provider.name(), rate, "Got ETH/USD quote");
                    return Quote {
                        rate,
                        source: RateSource::Live(provider.name()),
                    };
                }
                Ok(rate) => {
                    tracing::warn!(provider = provider.name(), rate, "Ignoring implausible ETH/USD quote");
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), "Price provider failed: {}", e);
                }
            }
        }

        tracing::error!(
            "All price providers failed, using fallback ETH/USD rate {}",
            FALLBACK_ETH_USD_RATE
        );
        Quote {
            rate: FALLBACK_ETH_USD_RATE,
            source: RateSource::Fallback,
        }
    }

    pub async fn usd_to_eth(&self, usd: f64) -> Conversion {
        self.convert(usd, Currency::Usd, Currency::Eth).await
    }

    pub async fn eth_to_usd(&self, eth: f64) -> Conversion {
        self.convert(eth, Currency::Eth, Currency::Usd).await
    }

    pub async fn convert(&self, amount: f64, from: Currency, to: Currency) -> Conversion {
        let quote = self.eth_usd_rate().await;
        let result = match (from, to) {
            (Currency::Usd, Currency::Eth) => amount / quote.rate,
            (Currency::Eth, Currency::Usd) => amount * quote.rate,
            _ => amount,
        };
        Conversion {
            amount,
            from,
            to,
            result,
            quote,
        }
    }
}
