//! Synthetic weather shaped like the live client's output.
//!
//! Used when no API key is available or the key is not active yet. Output is
//! random by default; seed the generator for reproducible values.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::model::{
    Condition, Coordinates, CurrentWeather, ForecastEntry, ForecastSet, Location, Temperatures,
    UnitSystem, Wind,
};

pub const FORECAST_ENTRIES: usize = 40;
pub const FORECAST_STEP_SECS: i64 = 3 * 60 * 60;

pub const DEMO_HUMIDITY: u8 = 68;
pub const DEMO_PRESSURE: u32 = 1015;
pub const DEMO_CLOUDINESS: u8 = 20;
pub const DEMO_WIND_DEGREES: u16 = 240;
const DEMO_VISIBILITY: u32 = 10_000;
const DEMO_COUNTRY: &str = "XX";

const NIGHT_ICON: &str = "01n";
const DAY_ICONS: [&str; 4] = ["01d", "02d", "03d", "10d"];

/// Per-unit baselines. Wind figures are roughly equivalent in both systems.
#[derive(Debug, Clone, Copy)]
struct Baseline {
    temperature: f64,
    wind_speed: f64,
    wind_gust: f64,
}

impl Baseline {
    fn for_unit(unit: UnitSystem) -> Self {
        match unit {
            UnitSystem::Metric => Self { temperature: 18.5, wind_speed: 3.6, wind_gust: 5.2 },
            UnitSystem::Imperial => Self { temperature: 65.3, wind_speed: 8.1, wind_gust: 11.6 },
        }
    }
}

/// Base temperature for `unit` before any perturbation.
pub fn base_temperature(unit: UnitSystem) -> f64 {
    Baseline::for_unit(unit).temperature
}

#[derive(Debug, Clone)]
pub struct DemoGenerator {
    rng: StdRng,
}

impl Default for DemoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoGenerator {
    /// Unseeded generator backed by OS entropy.
    pub fn new() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Deterministic generator: equal seeds give equal output for equal clocks.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn generate_current(&mut self, city: &str, unit: UnitSystem) -> CurrentWeather {
        self.generate_current_at(city, unit, Utc::now())
    }

    pub fn generate_current_at(
        &mut self,
        city: &str,
        unit: UnitSystem,
        now: DateTime<Utc>,
    ) -> CurrentWeather {
        let baseline = Baseline::for_unit(unit);
        let temp = baseline.temperature + self.rng.random_range(-3.0..=3.0);

        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc().timestamp();

        CurrentWeather {
            location: demo_location(city),
            condition: condition_for_icon("02d"),
            temperature: Temperatures {
                current: temp,
                feels_like: temp - 0.6,
                min: temp - 2.0,
                max: temp + 2.0,
            },
            humidity: DEMO_HUMIDITY,
            pressure: DEMO_PRESSURE,
            visibility: DEMO_VISIBILITY,
            cloudiness: DEMO_CLOUDINESS,
            wind: Wind {
                speed: baseline.wind_speed,
                degrees: DEMO_WIND_DEGREES,
                gust: Some(baseline.wind_gust),
            },
            timezone_offset: 0,
            sunrise: midnight + 5 * 3600 + 30 * 60,
            sunset: midnight + 20 * 3600 + 30 * 60,
            observed_at: now.timestamp(),
        }
    }

    pub fn generate_forecast(&mut self, city: &str, unit: UnitSystem) -> ForecastSet {
        self.generate_forecast_at(city, unit, Utc::now())
    }

    pub fn generate_forecast_at(
        &mut self,
        city: &str,
        unit: UnitSystem,
        now: DateTime<Utc>,
    ) -> ForecastSet {
        let baseline = Baseline::for_unit(unit);
        let start = now.timestamp();

        let entries = (0..FORECAST_ENTRIES as i64)
            .filter_map(|step| DateTime::from_timestamp(start + step * FORECAST_STEP_SECS, 0))
            .map(|at| self.forecast_entry(at, baseline))
            .collect();

        ForecastSet {
            location: demo_location(city),
            timezone_offset: 0,
            entries,
        }
    }

    fn forecast_entry(&mut self, at: DateTime<Utc>, baseline: Baseline) -> ForecastEntry {
        let hour = at.hour();

        let icon = if hour >= 20 || hour < 6 {
            NIGHT_ICON
        } else {
            DAY_ICONS[self.rng.random_range(0..DAY_ICONS.len())]
        };

        let time_of_day = if hour < 6 {
            -2.0
        } else if (10..=16).contains(&hour) {
            3.0
        } else {
            0.0
        };
        let temp = baseline.temperature + time_of_day + self.rng.random_range(-1.5..=1.5);

        let humidity = (i32::from(DEMO_HUMIDITY) + self.rng.random_range(-5..=5)) as u8;
        let pressure = DEMO_PRESSURE.saturating_add_signed(self.rng.random_range(-3..=3));

        let cloudiness = if is_clear(icon) { 0 } else { self.rng.random_range(20..=100) };

        let precipitation_probability = if self.rng.random_bool(0.7) {
            0.0
        } else {
            self.rng.random_range(0.0..=1.0)
        };

        ForecastEntry {
            timestamp: at.timestamp(),
            timestamp_text: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            condition: condition_for_icon(icon),
            temperature: Temperatures {
                current: temp,
                feels_like: temp - 0.6,
                min: temp - 1.0,
                max: temp + 1.0,
            },
            humidity,
            pressure,
            visibility: DEMO_VISIBILITY,
            cloudiness,
            wind: Wind {
                speed: baseline.wind_speed,
                degrees: DEMO_WIND_DEGREES,
                gust: Some(baseline.wind_gust),
            },
            precipitation_probability,
        }
    }
}

fn is_clear(icon: &str) -> bool {
    icon.starts_with("01")
}

fn demo_location(city: &str) -> Location {
    Location {
        name: city.trim().to_string(),
        country: DEMO_COUNTRY.to_string(),
        coordinates: Coordinates { lat: 0.0, lon: 0.0 },
    }
}

fn condition_for_icon(icon: &str) -> Condition {
    let (id, main, description) = match &icon[..2] {
        "01" => (800, "Clear", "clear sky"),
        "02" => (801, "Clouds", "few clouds"),
        "03" => (802, "Clouds", "scattered clouds"),
        _ => (500, "Rain", "light rain"),
    };

    Condition {
        id,
        main: main.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    }
}
