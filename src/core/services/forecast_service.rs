//! Trims a provider's two-day hourly series to the hours still ahead today.

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::domain::{ForecastDisplayPoint, HourlyForecastPoint, LocationForecastWindow, SkyIcon};

pub struct ForecastWindowReducer;

impl ForecastWindowReducer {
    /// Returns the hours from `reference`'s hour through the next `00:00`.
    ///
    /// Points are expected in chronological order. Scanning stops right after
    /// tomorrow's `00:00` entry, which caps the output at 25 points. If the
    /// provider omitted that entry the window simply ends at today's last hour.
    pub fn reduce(
        points: &[HourlyForecastPoint],
        reference: NaiveDateTime,
    ) -> Vec<ForecastDisplayPoint> {
        let today = reference.date();
        let current_hour = reference.hour();
        let tomorrow = today + Duration::days(1);

        let mut window = Vec::new();
        for point in points {
            let day = point.timestamp.date();
            let hour = point.timestamp.hour();
            let is_upcoming_today = day == today && hour >= current_hour;
            let is_next_midnight = day == tomorrow && hour == 0;

            if is_upcoming_today || is_next_midnight {
                window.push(ForecastDisplayPoint {
                    hour_label: format!("{:02}:00", hour),
                    temperature_celsius: round_half_up(point.temperature_celsius),
                    icon: Self::sky_icon(point.sky_code),
                });
                if is_next_midnight {
                    break;
                }
            }
        }
        window
    }

    pub fn window_for(
        location_name: impl Into<String>,
        points: &[HourlyForecastPoint],
        reference: NaiveDateTime,
    ) -> LocationForecastWindow {
        LocationForecastWindow {
            location_name: location_name.into(),
            points: Self::reduce(points, reference),
        }
    }

    /// Maps a provider sky code to its icon. Unknown codes fall back to `Cloudy`.
    pub fn sky_icon(code: i32) -> SkyIcon {
        match code {
            0 => SkyIcon::Clear,
            1..=3 => SkyIcon::PartlyCloudy,
            45 | 48 => SkyIcon::Fog,
            51..=67 | 80..=82 => SkyIcon::Rain,
            c if c >= 95 => SkyIcon::Thunderstorm,
            _ => SkyIcon::Cloudy,
        }
    }
}

// Halves round toward +inf, matching how the web client displayed temperatures.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
