use thiserror::Error;

/// Failures surfaced by the weather client.
///
/// Every variant is attributable to a single request. The client never
/// recovers locally; callers decide whether to re-prompt, retry later or
/// switch to demo data.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Missing or blank credential. Raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request was rejected locally (e.g. an empty city name).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream could not resolve the city.
    #[error("City '{city}' not found. Please check the spelling and try again.")]
    NotFound { city: String },

    /// Upstream rejected the credential.
    ///
    /// Freshly issued OpenWeather keys are rejected until they are
    /// activated, so this can clear up on its own.
    #[error(
        "API key rejected by OpenWeather: {message}. \
         Newly created keys can take a couple of hours to activate."
    )]
    Auth { message: String },

    /// Upstream unreachable (connection refused, DNS failure, broken body).
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other non-2xx response.
    #[error("OpenWeather responded with HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    /// A 2xx response whose body did not match the expected schema.
    #[error("Failed to parse OpenWeather response: {0}")]
    Parse(String),
}

impl WeatherError {
    /// Transport-level failures that are safe to retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WeatherError::Network(_) | WeatherError::Timeout(_))
    }

    /// Credential rejected upstream; the usual trigger for falling back to demo data.
    pub fn is_auth(&self) -> bool {
        matches!(self, WeatherError::Auth { .. })
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::Timeout(err.to_string())
        } else {
            WeatherError::Network(err.to_string())
        }
    }
}
