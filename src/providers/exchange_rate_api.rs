use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Config,
    currency::CurrencyPair,
    errors::{Result, TripError},
};

use super::{http_client, ExchangeRateProvider};

pub struct ExchangeRateApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, f64>,
}

impl ExchangeRateApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config.exchange_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ExchangeRateProvider for ExchangeRateApiClient {
    async fn secondary_to_primary(&self, pair: &CurrencyPair) -> Result<f64> {
        let url = format!("{}/v4/latest/{}", self.base_url, pair.secondary);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripError::Network(format!(
                "exchange rate request failed with {}",
                status
            )));
        }

        let body = response.text().await?;
        parse_rate(&body, pair)
    }
}

/// Reads `rates[primary]` from a latest-rates document based on the
/// secondary currency.
pub fn parse_rate(body: &str, pair: &CurrencyPair) -> Result<f64> {
    let latest: LatestRates = serde_json::from_str(body)?;
    match latest.rates.get(pair.primary.as_str()) {
        Some(rate) if rate.is_finite() && *rate > 0.0 => Ok(*rate),
        Some(rate) => Err(TripError::Network(format!(
            "provider returned unusable rate {} for {}",
            rate, pair.primary
        ))),
        None => Err(TripError::Network(format!(
            "provider has no rate for {}",
            pair.primary
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_primary_rate() {
        let body = r#"{"base": "JPY", "date": "2026-03-10", "rates": {"JPY": 1, "TWD": 0.2134, "USD": 0.0067}}"#;
        let rate = parse_rate(body, &CurrencyPair::default()).unwrap();
        assert_eq!(rate, 0.2134);
    }

    #[test]
    fn missing_or_zero_rate_is_an_error() {
        let pair = CurrencyPair::default();
        assert!(parse_rate(r#"{"rates": {"USD": 0.0067}}"#, &pair).is_err());
        assert!(parse_rate(r#"{"rates": {"TWD": 0}}"#, &pair).is_err());
        assert!(parse_rate("<html>", &pair).is_err());
    }
}
