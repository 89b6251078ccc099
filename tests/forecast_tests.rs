mod common;

use common::{at, hourly_series};
use trip_core::core::services::ForecastWindowReducer;
use trip_core::domain::{HourlyForecastPoint, SkyIcon};

#[test]
fn evening_reference_keeps_rest_of_day_and_next_midnight() {
    let points = hourly_series(at(2026, 3, 12, 0, 0), 48, 20.0, 0);
    let window = ForecastWindowReducer::reduce(&points, at(2026, 3, 12, 17, 0));

    let labels: Vec<_> = window.iter().map(|p| p.hour_label.as_str()).collect();
    assert_eq!(
        labels,
        ["17:00", "18:00", "19:00", "20:00", "21:00", "22:00", "23:00", "00:00"]
    );
}

#[test]
fn midnight_reference_yields_full_day_plus_one() {
    let points = hourly_series(at(2026, 3, 12, 0, 0), 48, 20.0, 0);
    let window = ForecastWindowReducer::reduce(&points, at(2026, 3, 12, 0, 0));
    assert_eq!(window.len(), 25);
    assert_eq!(window.first().unwrap().hour_label, "00:00");
    assert_eq!(window.last().unwrap().hour_label, "00:00");
}

#[test]
fn window_never_exceeds_twenty_five_points() {
    let points = hourly_series(at(2026, 3, 12, 0, 0), 72, 20.0, 0);
    for hour in 0..24 {
        let window = ForecastWindowReducer::reduce(&points, at(2026, 3, 12, hour, 30));
        assert!(window.len() <= 25);
        assert_eq!(window.len(), 25 - hour as usize);
    }
}

#[test]
fn series_from_another_month_is_empty() {
    // Same day-of-month one month later must not match.
    let points = hourly_series(at(2026, 4, 12, 0, 0), 48, 20.0, 0);
    assert!(ForecastWindowReducer::reduce(&points, at(2026, 3, 12, 9, 0)).is_empty());
}

#[test]
fn mixed_codes_map_to_icons_in_order() {
    let start = at(2026, 3, 12, 21, 0);
    let points = vec![
        HourlyForecastPoint::new(start, 18.49, 0),
        HourlyForecastPoint::new(at(2026, 3, 12, 22, 0), 18.5, 48),
        HourlyForecastPoint::new(at(2026, 3, 12, 23, 0), -0.5, 81),
        HourlyForecastPoint::new(at(2026, 3, 13, 0, 0), 17.0, 96),
        HourlyForecastPoint::new(at(2026, 3, 13, 1, 0), 16.0, 2),
    ];
    let window = ForecastWindowReducer::window_for("Naha", &points, start);

    assert_eq!(window.location_name, "Naha");
    let temps: Vec<_> = window.points.iter().map(|p| p.temperature_celsius).collect();
    assert_eq!(temps, [18, 19, 0, 17]);
    let icons: Vec<_> = window.points.iter().map(|p| p.icon).collect();
    assert_eq!(
        icons,
        [SkyIcon::Clear, SkyIcon::Fog, SkyIcon::Rain, SkyIcon::Thunderstorm]
    );
}
