//! Fixed multi-day itinerary and the weather locations attached to each day.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{Displayable, Identifiable};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Sightseeing,
    Food,
    Transport,
    Stay,
    Shopping,
    Activity,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Sightseeing => "sightseeing",
            EventKind::Food => "food",
            EventKind::Transport => "transport",
            EventKind::Stay => "stay",
            EventKind::Shopping => "shopping",
            EventKind::Activity => "activity",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryItem {
    pub id: String,
    /// Local start time, `HH:MM`.
    pub time: String,
    pub title: String,
    pub kind: EventKind,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ItineraryItem {
    fn new(id: &str, time: &str, title: &str, kind: EventKind) -> Self {
        Self {
            id: id.into(),
            time: time.into(),
            title: title.into(),
            kind,
            description: String::new(),
            location: None,
        }
    }

    fn at(mut self, location: &str) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl Identifiable for ItineraryItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A point the forecast provider is queried for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl WeatherLocation {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub display_date: String,
    pub day_of_week: String,
    pub title: String,
    #[serde(default)]
    pub weather_locations: Vec<WeatherLocation>,
    #[serde(default)]
    pub events: Vec<ItineraryItem>,
}

impl Displayable for DaySchedule {
    fn display_label(&self) -> String {
        format!("{} {} {}", self.display_date, self.day_of_week, self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Itinerary {
    pub days: Vec<DaySchedule>,
}

impl Itinerary {
    pub fn new(days: Vec<DaySchedule>) -> Self {
        Self { days }
    }

    pub fn day(&self, index: usize) -> Option<&DaySchedule> {
        self.days.get(index)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Index of the day scheduled on `date`, if the trip covers it.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.days.iter().position(|day| day.date == date)
    }

    /// The four-day Okinawa trip the app ships with.
    pub fn builtin() -> Self {
        let naha = WeatherLocation::new("Naha", 26.2124, 127.6809);
        Self::new(vec![
            day(
                (2026, 3, 11),
                "Wed",
                "Arrival, Kokusai-dori stroll",
                vec![naha.clone()],
                vec![
                    ItineraryItem::new("1-1", "18:20", "Depart TPE", EventKind::Transport)
                        .at("Taoyuan International Airport"),
                    ItineraryItem::new("1-2", "20:50", "Arrive Naha Airport", EventKind::Transport)
                        .at("Naha Airport"),
                    ItineraryItem::new("1-3", "21:30", "Monorail to hotel", EventKind::Transport),
                    ItineraryItem::new("1-4", "22:30", "Late dinner", EventKind::Food)
                        .at("Kokusai-dori"),
                ],
            ),
            day(
                (2026, 3, 12),
                "Thu",
                "Road trip: Manzamo, American Village",
                vec![
                    WeatherLocation::new("Manzamo", 26.5049, 127.8502),
                    WeatherLocation::new("American Village", 26.3167, 127.7573),
                ],
                vec![
                    ItineraryItem::new("2-1", "08:20", "Pick up rental car", EventKind::Transport),
                    ItineraryItem::new("2-2", "10:30", "Manzamo", EventKind::Sightseeing)
                        .at("Manzamo"),
                    ItineraryItem::new("2-3", "13:00", "American Village", EventKind::Activity)
                        .at("American Village"),
                    ItineraryItem::new("2-4", "20:00", "Live house, drive back", EventKind::Activity),
                ],
            ),
            day(
                (2026, 3, 13),
                "Fri",
                "Naha city, Shuri Castle, Gyokusendo",
                vec![
                    WeatherLocation::new("Shuri Castle", 26.2170, 127.7195),
                    WeatherLocation::new("Gyokusendo", 26.1396, 127.7472),
                ],
                vec![
                    ItineraryItem::new("3-1", "09:00", "Naminoue shrine walk", EventKind::Sightseeing),
                    ItineraryItem::new("3-2", "11:00", "Shuri Castle Park", EventKind::Sightseeing)
                        .at("Shuri Castle"),
                    ItineraryItem::new("3-3", "13:40", "Gyokusendo cave", EventKind::Sightseeing)
                        .at("Okinawa World"),
                    ItineraryItem::new("3-4", "18:00", "Izakaya and onsen", EventKind::Food),
                ],
            ),
            day(
                (2026, 3, 14),
                "Sat",
                "Last shopping, return car, fly home",
                vec![naha, WeatherLocation::new("Taoyuan", 25.0797, 121.2342)],
                vec![
                    ItineraryItem::new("4-1", "11:00", "Check out, store luggage", EventKind::Stay),
                    ItineraryItem::new("4-2", "11:30", "Kokusai-dori shopping", EventKind::Shopping)
                        .at("Kokusai-dori"),
                    ItineraryItem::new("4-3", "15:30", "Return rental car", EventKind::Transport),
                    ItineraryItem::new("4-4", "21:30", "Depart OKA", EventKind::Transport)
                        .at("Naha Airport"),
                ],
            ),
        ])
    }
}

impl Default for Itinerary {
    fn default() -> Self {
        Self::builtin()
    }
}

fn day(
    (year, month, dom): (i32, u32, u32),
    day_of_week: &str,
    title: &str,
    weather_locations: Vec<WeatherLocation>,
    events: Vec<ItineraryItem>,
) -> DaySchedule {
    let date = NaiveDate::from_ymd_opt(year, month, dom).unwrap_or_default();
    DaySchedule {
        date,
        display_date: format!("{}/{}", month, dom),
        day_of_week: day_of_week.into(),
        title: title.into(),
        weather_locations,
        events,
    }
}
