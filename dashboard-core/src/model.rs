use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

/// Display convention requested from the source.
///
/// Values are stored in whichever system was requested; nothing in this
/// crate re-converts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn speed_label(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown unit system '{0}'. Supported: metric, imperial.")]
pub struct ParseUnitSystemError(String);

impl FromStr for UnitSystem {
    type Err = ParseUnitSystemError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(UnitSystem::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(UnitSystem::Imperial),
            _ => Err(ParseUnitSystemError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    /// ISO 3166 country code as reported upstream.
    pub country: String,
    pub coordinates: Coordinates,
}

/// Primary weather condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: u32,
    /// Short label, e.g. "Clouds".
    pub main: String,
    /// Longer text, e.g. "few clouds".
    pub description: String,
    /// OpenWeather icon code, e.g. "02d".
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperatures {
    pub current: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    /// Meteorological direction in [0, 360).
    pub degrees: u16,
    pub gust: Option<f64>,
}

impl Wind {
    /// Build a wind reading, folding any direction into [0, 360).
    pub fn new(speed: f64, degrees: i64, gust: Option<f64>) -> Self {
        Self {
            speed,
            degrees: degrees.rem_euclid(360) as u16,
            gust,
        }
    }
}

/// Conditions for one location at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: Location,
    pub condition: Condition,
    pub temperature: Temperatures,
    /// Percent, 0..=100.
    pub humidity: u8,
    /// hPa.
    pub pressure: u32,
    /// Meters; 0 when upstream omits it.
    pub visibility: u32,
    /// Percent, 0..=100.
    pub cloudiness: u8,
    pub wind: Wind,
    /// Seconds east of UTC.
    pub timezone_offset: i32,
    pub sunrise: i64,
    pub sunset: i64,
    pub observed_at: i64,
}

impl CurrentWeather {
    /// Convert an epoch timestamp into the location's wall-clock time.
    pub fn local_time(&self, ts: i64) -> Option<NaiveDateTime> {
        local_time(ts, self.timezone_offset)
    }
}

/// One 3-hour forecast slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: i64,
    /// Upstream's textual timestamp, "YYYY-MM-DD HH:MM:SS" in UTC.
    pub timestamp_text: String,
    pub condition: Condition,
    pub temperature: Temperatures,
    pub humidity: u8,
    pub pressure: u32,
    pub visibility: u32,
    pub cloudiness: u8,
    pub wind: Wind,
    /// Probability of precipitation in [0, 1].
    pub precipitation_probability: f64,
}

/// Chronologically ordered forecast for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSet {
    pub location: Location,
    pub timezone_offset: i32,
    pub entries: Vec<ForecastEntry>,
}

impl ForecastSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn local_time(&self, ts: i64) -> Option<NaiveDateTime> {
        local_time(ts, self.timezone_offset)
    }

    /// The first `count` entries, e.g. 16 for a 48-hour trend.
    pub fn trend(&self, count: usize) -> &[ForecastEntry] {
        &self.entries[..count.min(self.entries.len())]
    }

    /// One representative entry per local calendar day, ascending.
    ///
    /// A day is represented by its first entry unless an entry falls between
    /// 12:00 and 15:00 local time, in which case the latest such entry wins.
    pub fn daily_summary(&self) -> Vec<(NaiveDate, &ForecastEntry)> {
        let mut days: BTreeMap<NaiveDate, &ForecastEntry> = BTreeMap::new();

        for entry in &self.entries {
            let Some(local) = local_time(entry.timestamp, self.timezone_offset) else {
                continue;
            };
            let date = local.date();
            if !days.contains_key(&date) || (12..=15).contains(&local.hour()) {
                days.insert(date, entry);
            }
        }

        days.into_iter().collect()
    }
}

pub(crate) fn local_time(ts: i64, offset_secs: i32) -> Option<NaiveDateTime> {
    ts.checked_add(i64::from(offset_secs))
        .and_then(|t| DateTime::from_timestamp(t, 0))
        .map(|dt| dt.naive_utc())
}
