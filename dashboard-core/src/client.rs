//! OpenWeather HTTP client.
//!
//! Thin wrapper over the free `weather` and `forecast` endpoints. One request
//! per call; retries and fallbacks belong to the caller.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    config::{API_KEY_ENV, ClientSettings, Config},
    error::WeatherError,
    model::{
        Condition, Coordinates, CurrentWeather, ForecastEntry, ForecastSet, Location,
        Temperatures, UnitSystem, Wind,
    },
};

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    /// Build a client. A blank key is rejected before anything touches the network.
    pub fn new(api_key: impl Into<String>, settings: ClientSettings) -> Result<Self, WeatherError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(missing_key());
        }

        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| WeatherError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build a client from the resolved configuration (environment first, then file).
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        Self::from_config_with(config, |name| std::env::var(name).ok())
    }

    /// Same as [`OpenWeatherClient::from_config`] with an injectable environment.
    pub fn from_config_with<F>(config: &Config, lookup: F) -> Result<Self, WeatherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = config.resolve_api_key_with(lookup).ok_or_else(missing_key)?;
        Self::new(api_key, config.client_settings())
    }

    #[instrument(skip(self), fields(units = %unit))]
    pub async fn fetch_current(
        &self,
        city: &str,
        unit: UnitSystem,
    ) -> Result<CurrentWeather, WeatherError> {
        let body = self.get("weather", city, unit).await?;

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(parsed.into_current())
    }

    #[instrument(skip(self), fields(units = %unit))]
    pub async fn fetch_forecast(
        &self,
        city: &str,
        unit: UnitSystem,
    ) -> Result<ForecastSet, WeatherError> {
        let body = self.get("forecast", city, unit).await?;

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let forecast = parsed.into_forecast();
        debug!(entries = forecast.len(), "Parsed forecast");
        Ok(forecast)
    }

    /// Issue a GET and return the body of a 2xx response.
    async fn get(
        &self,
        endpoint: &str,
        city: &str,
        unit: UnitSystem,
    ) -> Result<String, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::InvalidRequest("City name must not be empty".into()));
        }

        let url = format!("{}/{endpoint}", self.base_url);
        debug!(url = %url, city, "Requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", unit.as_str()),
            ])
            .send()
            .await
            .map_err(WeatherError::from_transport)?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::from_transport)?;

        if status.is_success() {
            return Ok(body);
        }

        debug!(%status, "OpenWeather request failed");
        Err(classify_failure(status, city, &body))
    }
}

fn missing_key() -> WeatherError {
    WeatherError::Configuration(format!(
        "OpenWeather API key not found. Set the {API_KEY_ENV} environment variable \
         or run `weather-dashboard configure`."
    ))
}

fn classify_failure(status: StatusCode, city: &str, body: &str) -> WeatherError {
    match status {
        StatusCode::NOT_FOUND => WeatherError::NotFound { city: city.to_string() },
        StatusCode::UNAUTHORIZED => WeatherError::Auth { message: provider_message(body) },
        _ => WeatherError::Upstream {
            status: status.as_u16(),
            message: provider_message(body),
        },
    }
}

/// OpenWeather error bodies look like `{"cod":401,"message":"..."}`.
fn provider_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct OwErrorBody {
        message: String,
    }

    serde_json::from_str::<OwErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| truncate_body(body))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn non_negative(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    main: String,
    description: String,
    icon: String,
}

impl OwWeather {
    fn primary(list: Vec<OwWeather>) -> Condition {
        list.into_iter()
            .next()
            .map(|w| Condition {
                id: w.id,
                main: w.main,
                description: w.description,
                icon: w.icon,
            })
            .unwrap_or_else(|| Condition {
                id: 0,
                main: "Unknown".to_string(),
                description: "unknown".to_string(),
                icon: String::new(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
}

impl OwMain {
    fn temperatures(&self) -> Temperatures {
        Temperatures {
            current: self.temp,
            feels_like: self.feels_like,
            min: self.temp_min,
            max: self.temp_max,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
    gust: Option<f64>,
}

impl OwWind {
    fn into_wind(self) -> Wind {
        Wind::new(self.speed, self.deg.round() as i64, self.gust)
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
    visibility: Option<f64>,
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    dt: i64,
    #[serde(default)]
    sys: OwSys,
    #[serde(default)]
    timezone: i32,
}

impl OwCurrentResponse {
    fn into_current(self) -> CurrentWeather {
        CurrentWeather {
            location: Location {
                name: self.name,
                country: self.sys.country,
                coordinates: Coordinates { lat: self.coord.lat, lon: self.coord.lon },
            },
            temperature: self.main.temperatures(),
            humidity: percent(self.main.humidity),
            pressure: non_negative(self.main.pressure),
            condition: OwWeather::primary(self.weather),
            visibility: self.visibility.map_or(0, non_negative),
            cloudiness: percent(self.clouds.all),
            wind: self.wind.into_wind(),
            timezone_offset: self.timezone,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            observed_at: self.dt,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
    coord: OwCoord,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    clouds: OwClouds,
    wind: OwWind,
    visibility: Option<f64>,
    #[serde(default)]
    pop: f64,
    #[serde(default)]
    dt_txt: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastItem>,
}

impl OwForecastResponse {
    fn into_forecast(self) -> ForecastSet {
        let mut entries: Vec<ForecastEntry> = self
            .list
            .into_iter()
            .map(|item| ForecastEntry {
                timestamp: item.dt,
                timestamp_text: item.dt_txt,
                temperature: item.main.temperatures(),
                humidity: percent(item.main.humidity),
                pressure: non_negative(item.main.pressure),
                condition: OwWeather::primary(item.weather),
                visibility: item.visibility.map_or(0, non_negative),
                cloudiness: percent(item.clouds.all),
                wind: item.wind.into_wind(),
                precipitation_probability: item.pop.clamp(0.0, 1.0),
            })
            .collect();
        entries.sort_by_key(|e| e.timestamp);

        ForecastSet {
            location: Location {
                name: self.city.name,
                country: self.city.country,
                coordinates: Coordinates { lat: self.city.coord.lat, lon: self.city.coord.lon },
            },
            timezone_offset: self.city.timezone,
            entries,
        }
    }
}
