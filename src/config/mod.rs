//! Persistent user preferences and their disk persistence.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    currency::{CurrencyCode, CurrencyPair, DEFAULT_SECONDARY_TO_PRIMARY},
    errors::{Result, TripError},
    utils::{paths, persistence},
};

pub const DEFAULT_EXPENSE_KEY: &str = "okinawa_expenses";
pub const DEFAULT_FORECAST_BASE_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_EXCHANGE_BASE_URL: &str = "https://api.exchangerate-api.com";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;

/// Stores user-configurable preferences for a planning session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub currencies: CurrencyPair,
    #[serde(default = "Config::default_fallback_rate")]
    pub fallback_rate: f64,
    #[serde(default = "Config::default_forecast_base_url")]
    pub forecast_base_url: String,
    #[serde(default = "Config::default_exchange_base_url")]
    pub exchange_base_url: String,
    #[serde(default = "Config::default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "Config::default_expense_key")]
    pub expense_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional JSON itinerary replacing the built-in trip.
    pub itinerary_path: Option<PathBuf>,
    /// Skip every network call; forecasts stay empty and the fallback rate applies.
    #[serde(default)]
    pub offline: bool,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currencies: CurrencyPair::default(),
            fallback_rate: Self::default_fallback_rate(),
            forecast_base_url: Self::default_forecast_base_url(),
            exchange_base_url: Self::default_exchange_base_url(),
            http_timeout_secs: Self::default_http_timeout_secs(),
            expense_key: Self::default_expense_key(),
            itinerary_path: None,
            offline: false,
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl Config {
    pub fn default_fallback_rate() -> f64 {
        DEFAULT_SECONDARY_TO_PRIMARY
    }

    pub fn default_forecast_base_url() -> String {
        DEFAULT_FORECAST_BASE_URL.into()
    }

    pub fn default_exchange_base_url() -> String {
        DEFAULT_EXCHANGE_BASE_URL.into()
    }

    pub fn default_http_timeout_secs() -> u64 {
        DEFAULT_HTTP_TIMEOUT_SECS
    }

    pub fn default_expense_key() -> String {
        DEFAULT_EXPENSE_KEY.into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Applies process-level overrides (`TRIP_CORE_OFFLINE`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(value) = env::var_os("TRIP_CORE_OFFLINE") {
            let value = value.to_string_lossy().to_ascii_lowercase();
            self.offline = !matches!(value.as_str(), "" | "0" | "false" | "no");
        }
        self
    }

    /// Keys accepted by [`Config::set_field`], in display order.
    pub const FIELDS: [&'static str; 9] = [
        "primary_currency",
        "secondary_currency",
        "fallback_rate",
        "forecast_base_url",
        "exchange_base_url",
        "http_timeout_secs",
        "expense_key",
        "itinerary_path",
        "offline",
    ];

    pub fn field(&self, key: &str) -> Option<String> {
        let value = match key {
            "primary_currency" => self.currencies.primary.to_string(),
            "secondary_currency" => self.currencies.secondary.to_string(),
            "fallback_rate" => self.fallback_rate.to_string(),
            "forecast_base_url" => self.forecast_base_url.clone(),
            "exchange_base_url" => self.exchange_base_url.clone(),
            "http_timeout_secs" => self.http_timeout_secs.to_string(),
            "expense_key" => self.expense_key.clone(),
            "itinerary_path" => self
                .itinerary_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(built-in)".into()),
            "offline" => self.offline.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "primary_currency" => self.currencies.primary = parse_code(value)?,
            "secondary_currency" => self.currencies.secondary = parse_code(value)?,
            "fallback_rate" => {
                let rate: f64 = value
                    .parse()
                    .map_err(|_| invalid(key, value, "expected a number"))?;
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(invalid(key, value, "must be greater than zero"));
                }
                self.fallback_rate = rate;
            }
            "forecast_base_url" => self.forecast_base_url = parse_url(key, value)?,
            "exchange_base_url" => self.exchange_base_url = parse_url(key, value)?,
            "http_timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| invalid(key, value, "expected whole seconds"))?;
                check_timeout(secs).map_err(|reason| invalid(key, value, reason))?;
                self.http_timeout_secs = secs;
            }
            "expense_key" => {
                if value.is_empty() {
                    return Err(invalid(key, value, "must not be empty"));
                }
                self.expense_key = value.to_string();
            }
            "itinerary_path" => {
                self.itinerary_path = match value {
                    "" | "none" | "builtin" => None,
                    path => Some(PathBuf::from(path)),
                };
            }
            "offline" => {
                self.offline = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid(key, value, "expected on/off")),
                };
            }
            _ => {
                return Err(TripError::Config(format!(
                    "unknown setting `{}` (available: {})",
                    key,
                    Self::FIELDS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn check_timeout(secs: u64) -> std::result::Result<(), &'static str> {
    match secs {
        0 => Err("must be at least 1"),
        secs if secs > MAX_HTTP_TIMEOUT_SECS => Err("must be at most 300"),
        _ => Ok(()),
    }
}

fn parse_code(value: &str) -> Result<CurrencyCode> {
    if value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(CurrencyCode::new(value))
    } else {
        Err(TripError::Config(format!(
            "`{}` is not a three-letter currency code",
            value
        )))
    }
}

fn parse_url(key: &str, value: &str) -> Result<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(invalid(key, value, "expected an http(s) URL"))
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> TripError {
    TripError::Config(format!("invalid value `{}` for {}: {}", value, key, reason))
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: &Path) -> Result<Self> {
        let config_path = paths::config_file_in(base);
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self::new(config_path))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Values edited by hand are held to the same limits as `set_field`.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        let config: Config = persistence::load_json(&self.config_path)
            .map_err(|err| TripError::Config(format!("cannot read config: {}", err)))?;
        check_timeout(config.http_timeout_secs).map_err(|reason| {
            TripError::Config(format!(
                "invalid http_timeout_secs {} in {}: {}",
                config.http_timeout_secs,
                self.config_path.display(),
                reason
            ))
        })?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        persistence::save_json(config, &self.config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn persists_and_loads_config() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path()).unwrap();

        let mut cfg = Config::default();
        cfg.set_field("fallback_rate", "0.22").unwrap();
        cfg.set_field("offline", "on").unwrap();
        manager.save(&cfg).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.fallback_rate, 0.22);
        assert!(loaded.offline);
    }

    #[test]
    fn partial_documents_fill_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"offline": true}"#).unwrap();
        assert!(cfg.offline);
        assert_eq!(cfg.expense_key, DEFAULT_EXPENSE_KEY);
        assert_eq!(cfg.currencies.secondary.as_str(), "JPY");
    }

    #[test]
    fn rejects_invalid_settings() {
        let mut cfg = Config::default();
        assert!(cfg.set_field("fallback_rate", "0").is_err());
        assert!(cfg.set_field("primary_currency", "dollars").is_err());
        assert!(cfg.set_field("forecast_base_url", "ftp://x").is_err());
        assert!(cfg.set_field("volume", "11").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn out_of_range_timeout_on_disk_is_rejected() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path()).unwrap();
        fs::write(
            manager.config_path(),
            r#"{"http_timeout_secs": 18446744073709551615}"#,
        )
        .unwrap();
        let err = manager.load().unwrap_err();
        assert!(err.to_string().contains("http_timeout_secs"));

        let mut cfg = Config::default();
        assert!(cfg.set_field("http_timeout_secs", "301").is_err());
        cfg.set_field("http_timeout_secs", "300").unwrap();
        assert_eq!(cfg.http_timeout_secs, MAX_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn field_reports_every_listed_key() {
        let cfg = Config::default();
        for key in Config::FIELDS {
            assert!(cfg.field(key).is_some(), "{key}");
        }
    }
}
