//! Dashboard session state.
//!
//! Holds what the user picked (city, units, demo mode) and the last good
//! result. Callers own it and pass it to [`Dashboard::refresh`]; there is no
//! global state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    client::OpenWeatherClient,
    demo::DemoGenerator,
    error::WeatherError,
    model::{CurrentWeather, ForecastSet, UnitSystem},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Demo,
}

/// Current conditions and forecast produced by one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current: CurrentWeather,
    pub forecast: ForecastSet,
    pub units: UnitSystem,
    pub source: DataSource,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub city: String,
    pub units: UnitSystem,
    /// Serve synthetic data instead of calling OpenWeather.
    pub demo: bool,
    snapshot: Option<Snapshot>,
}

impl Dashboard {
    pub fn new(city: impl Into<String>, units: UnitSystem) -> Self {
        Self {
            city: city.into(),
            units,
            demo: false,
            snapshot: None,
        }
    }

    pub fn with_demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    pub fn set_units(&mut self, units: UnitSystem) {
        self.units = units;
    }

    /// Last successful result, if any.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Fetch fresh data for the current city and units.
    ///
    /// Without a client, or in demo mode, data is generated locally. A
    /// rejected key serves demo data for this refresh only; the next refresh
    /// tries OpenWeather again, since new keys need time to activate. Any
    /// other failure leaves the previous snapshot in place and is returned.
    pub async fn refresh(
        &mut self,
        client: Option<&OpenWeatherClient>,
        demo: &mut DemoGenerator,
    ) -> Result<&Snapshot, WeatherError> {
        let snapshot = match client {
            Some(client) if !self.demo => match self.fetch_live(client).await {
                Ok(snapshot) => snapshot,
                Err(err @ WeatherError::Auth { .. }) => {
                    warn!(error = %err, "OpenWeather rejected the API key, serving demo data");
                    self.generate(demo)
                }
                Err(err) => return Err(err),
            },
            _ => self.generate(demo),
        };

        info!(city = %self.city, units = %self.units, source = ?snapshot.source, "Refreshed weather");
        Ok(&*self.snapshot.insert(snapshot))
    }

    async fn fetch_live(&self, client: &OpenWeatherClient) -> Result<Snapshot, WeatherError> {
        let (current, forecast) = tokio::try_join!(
            client.fetch_current(&self.city, self.units),
            client.fetch_forecast(&self.city, self.units),
        )?;

        Ok(Snapshot {
            current,
            forecast,
            units: self.units,
            source: DataSource::Live,
            fetched_at: Utc::now(),
        })
    }

    fn generate(&self, demo: &mut DemoGenerator) -> Snapshot {
        Snapshot {
            current: demo.generate_current(&self.city, self.units),
            forecast: demo.generate_forecast(&self.city, self.units),
            units: self.units,
            source: DataSource::Demo,
            fetched_at: Utc::now(),
        }
    }
}
