//! Hourly forecast inputs and the trimmed display window built from them.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One hour of provider data, in the location's local civil time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastPoint {
    pub timestamp: NaiveDateTime,
    pub temperature_celsius: f64,
    pub sky_code: i32,
}

impl HourlyForecastPoint {
    pub fn new(timestamp: NaiveDateTime, temperature_celsius: f64, sky_code: i32) -> Self {
        Self {
            timestamp,
            temperature_celsius,
            sky_code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkyIcon {
    Clear,
    PartlyCloudy,
    Fog,
    Rain,
    Thunderstorm,
    Cloudy,
}

impl SkyIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            SkyIcon::Clear => "☀️",
            SkyIcon::PartlyCloudy => "⛅",
            SkyIcon::Fog => "🌫️",
            SkyIcon::Rain => "🌧️",
            SkyIcon::Thunderstorm => "⛈️",
            SkyIcon::Cloudy => "☁️",
        }
    }
}

impl fmt::Display for SkyIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkyIcon::Clear => "Clear",
            SkyIcon::PartlyCloudy => "Partly cloudy",
            SkyIcon::Fog => "Fog",
            SkyIcon::Rain => "Rain",
            SkyIcon::Thunderstorm => "Thunderstorm",
            SkyIcon::Cloudy => "Cloudy",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDisplayPoint {
    /// Always `HH:00`.
    pub hour_label: String,
    pub temperature_celsius: i32,
    pub icon: SkyIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationForecastWindow {
    pub location_name: String,
    pub points: Vec<ForecastDisplayPoint>,
}

impl LocationForecastWindow {
    /// An empty window is rendered as "loading", never as an error.
    pub fn is_loading(&self) -> bool {
        self.points.is_empty()
    }
}
