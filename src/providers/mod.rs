//! Remote data sources and the fan-out that feeds their results back to the
//! controller.

pub mod exchange_rate_api;
pub mod open_meteo;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    config::Config,
    core::{AppMessage, ForecastRequest},
    currency::CurrencyPair,
    domain::{HourlyForecastPoint, WeatherLocation},
    errors::Result,
};

pub use exchange_rate_api::ExchangeRateApiClient;
pub use open_meteo::OpenMeteoClient;

/// Hourly series for a location covering at least today and tomorrow.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn hourly_forecast(&self, location: &WeatherLocation) -> Result<Vec<HourlyForecastPoint>>;
}

/// How many units of the primary currency one unit of the secondary buys.
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn secondary_to_primary(&self, pair: &CurrencyPair) -> Result<f64>;
}

pub(crate) fn http_client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;
    Ok(client)
}

/// Spawns one task per request. Each task sends exactly one
/// `ForecastFetched` tagged with its request's generation; the channel closes
/// once every task has reported and the caller's sender is dropped.
///
/// Must be called from within a tokio runtime.
pub fn fetch_forecasts(
    provider: Arc<dyn ForecastProvider>,
    requests: Vec<ForecastRequest>,
    sender: UnboundedSender<AppMessage>,
) {
    for request in requests {
        let provider = Arc::clone(&provider);
        let sender = sender.clone();
        tokio::spawn(async move {
            let outcome = provider.hourly_forecast(&request.location).await;
            let message = AppMessage::ForecastFetched {
                generation: request.generation,
                location: request.location.name,
                reference: Local::now().naive_local(),
                outcome,
            };
            if sender.send(message).is_err() {
                tracing::debug!("forecast receiver closed before delivery");
            }
        });
    }
}

pub async fn fetch_rate(provider: &dyn ExchangeRateProvider, pair: &CurrencyPair) -> AppMessage {
    AppMessage::RateFetched(provider.secondary_to_primary(pair).await)
}
