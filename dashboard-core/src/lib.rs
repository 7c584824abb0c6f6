//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - An OpenWeather client with a typed error set
//! - A seedable demo data generator for when the API is unavailable
//! - Pure display mappings (icons, temperature colors, wind arrows)
//! - Configuration & credentials handling
//! - Session state tying the above together
//!
//! It is used by the `weather-dashboard` binary, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod demo;
pub mod display;
pub mod error;
pub mod model;
pub mod session;

pub use client::OpenWeatherClient;
pub use config::{ClientSettings, Config};
pub use demo::DemoGenerator;
pub use display::{color_for, compass_point, direction_glyph_for, icon_for};
pub use error::WeatherError;
pub use model::{
    Condition, Coordinates, CurrentWeather, ForecastEntry, ForecastSet, Location, Temperatures,
    UnitSystem, Wind,
};
pub use session::{Dashboard, DataSource, Snapshot};
