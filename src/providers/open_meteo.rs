use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Config,
    domain::{HourlyForecastPoint, WeatherLocation},
    errors::{Result, TripError},
};

use super::{http_client, ForecastProvider};

const HOURLY_FIELDS: &str = "temperature_2m,weathercode";
const FORECAST_DAYS: &str = "2";

/// Open-Meteo hourly forecast client. Times come back in the location's own
/// timezone.
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlySeries,
}

#[derive(Debug, Deserialize)]
struct HourlySeries {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    weathercode: Vec<Option<i32>>,
}

impl OpenMeteoClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config.forecast_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/forecast", self.base_url)
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn hourly_forecast(&self, location: &WeatherLocation) -> Result<Vec<HourlyForecastPoint>> {
        let url = self.endpoint();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripError::Network(format!(
                "forecast for {} failed with {}",
                location.name, status
            )));
        }

        let body = response.text().await?;
        let points = parse_hourly(&body)?;
        tracing::debug!(location = %location.name, points = points.len(), "forecast received");
        Ok(points)
    }
}

/// Zips the provider's parallel hourly arrays. Entries with an unreadable
/// timestamp or a null reading are skipped.
pub fn parse_hourly(body: &str) -> Result<Vec<HourlyForecastPoint>> {
    let response: ForecastResponse = serde_json::from_str(body)?;
    let HourlySeries {
        time,
        temperature_2m,
        weathercode,
    } = response.hourly;

    let points = time
        .iter()
        .zip(temperature_2m)
        .zip(weathercode)
        .filter_map(|((time, temperature), code)| {
            let timestamp = parse_timestamp(time)?;
            Some(HourlyForecastPoint::new(timestamp, temperature?, code?))
        })
        .collect();
    Ok(points)
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
