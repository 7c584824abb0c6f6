//! Integration tests for the OpenWeather client using wiremock
//!
//! These tests run the client against a mock HTTP server to check parsing,
//! the error taxonomy and the demo fallback in the session layer.

use std::{net::TcpListener, time::Duration};

use weather_dashboard_core::{
    ClientSettings, Dashboard, DataSource, DemoGenerator, OpenWeatherClient, UnitSystem,
    WeatherError,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const TEST_KEY: &str = "test-key";

/// Sample `/weather` response for London, metric units
fn london_current() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "base": "stations",
        "main": {
            "temp": 14.27,
            "feels_like": 13.62,
            "temp_min": 12.83,
            "temp_max": 15.54,
            "pressure": 1012,
            "humidity": 77
        },
        "visibility": 10000,
        "wind": {"speed": 5.14, "deg": 250, "gust": 9.26},
        "clouds": {"all": 75},
        "dt": 1717243200,
        "sys": {"type": 2, "id": 2075535, "country": "GB", "sunrise": 1717213559, "sunset": 1717272668},
        "timezone": 3600,
        "id": 2643743,
        "name": "London",
        "cod": 200
    })
}

/// Sample `/forecast` response with three slices, deliberately missing some optional fields
fn london_forecast() -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": 3,
        "list": [
            {
                "dt": 1717243200,
                "main": {"temp": 14.1, "feels_like": 13.5, "temp_min": 13.0, "temp_max": 14.1,
                         "pressure": 1012, "humidity": 78},
                "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
                "clouds": {"all": 90},
                "wind": {"speed": 4.8, "deg": 245, "gust": 8.9},
                "visibility": 10000,
                "pop": 0.42,
                "dt_txt": "2024-06-01 12:00:00"
            },
            {
                "dt": 1717254000,
                "main": {"temp": 15.3, "feels_like": 14.6, "temp_min": 15.3, "temp_max": 15.3,
                         "pressure": 1012, "humidity": 70},
                "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
                "clouds": {"all": 60},
                "wind": {"speed": 5.0, "deg": 250},
                "pop": 0,
                "dt_txt": "2024-06-01 15:00:00"
            },
            {
                "dt": 1717264800,
                "main": {"temp": 13.0, "feels_like": 12.2, "temp_min": 13.0, "temp_max": 13.0,
                         "pressure": 1013, "humidity": 80},
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01n"}],
                "clouds": {"all": 0},
                "wind": {"speed": 3.1, "deg": 260, "gust": 5.0},
                "visibility": 10000,
                "pop": 0.05,
                "dt_txt": "2024-06-01 18:00:00"
            }
        ],
        "city": {
            "id": 2643743,
            "name": "London",
            "coord": {"lat": 51.5085, "lon": -0.1257},
            "country": "GB",
            "timezone": 3600,
            "sunrise": 1717213559,
            "sunset": 1717272668
        }
    })
}

fn settings_for(base_url: String) -> ClientSettings {
    ClientSettings {
        base_url,
        timeout: Duration::from_secs(5),
    }
}

/// Create a test client configured to use the mock server
fn create_test_client(mock_server: &MockServer) -> OpenWeatherClient {
    #[allow(clippy::expect_used)]
    OpenWeatherClient::new(TEST_KEY, settings_for(mock_server.uri()))
        .expect("Failed to create client")
}

async fn mount(mock_server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn test_fetch_current_london_fixture() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, "/weather", ResponseTemplate::new(200).set_body_json(london_current()))
        .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_current("London", UnitSystem::Metric).await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");

    let weather = result.unwrap();
    assert_eq!(weather.location.name, "London");
    assert_eq!(weather.location.country, "GB");
    // Upstream already applied the unit; the value is passed through untouched.
    assert_eq!(weather.temperature.current, 14.27);
    assert_eq!(weather.temperature.feels_like, 13.62);
    assert_eq!(weather.humidity, 77);
    assert_eq!(weather.pressure, 1012);
    assert_eq!(weather.visibility, 10000);
    assert_eq!(weather.cloudiness, 75);
    assert_eq!(weather.wind.degrees, 250);
    assert_eq!(weather.wind.gust, Some(9.26));
    assert_eq!(weather.condition.icon, "04d");
    assert_eq!(weather.timezone_offset, 3600);
    assert_eq!(weather.sunrise, 1717213559);
}

#[tokio::test]
async fn test_imperial_values_are_not_reconverted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_current()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let weather = client
        .fetch_current("London", UnitSystem::Imperial)
        .await
        .expect("Expected success");

    assert_eq!(weather.temperature.current, 14.27);
    assert_eq!(weather.wind.speed, 5.14);
}

#[tokio::test]
async fn test_fetch_forecast_success() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, "/forecast", ResponseTemplate::new(200).set_body_json(london_forecast()))
        .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_forecast("London", UnitSystem::Metric).await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");

    let forecast = result.unwrap();
    assert_eq!(forecast.location.name, "London");
    assert_eq!(forecast.timezone_offset, 3600);
    assert_eq!(forecast.len(), 3);

    let timestamps: Vec<i64> = forecast.entries.iter().map(|e| e.timestamp).collect();
    assert!(timestamps.windows(2).all(|w| w[0] < w[1]));

    let first = &forecast.entries[0];
    assert_eq!(first.timestamp_text, "2024-06-01 12:00:00");
    assert_eq!(first.precipitation_probability, 0.42);
    assert_eq!(first.condition.description, "light rain");

    let second = &forecast.entries[1];
    assert_eq!(second.visibility, 0);
    assert_eq!(second.wind.gust, None);
    assert_eq!(second.precipitation_probability, 0.0);
}

// ============================================================================
// Error handling scenarios
// ============================================================================

#[tokio::test]
async fn test_not_found_names_the_city() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(404)
            .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_current("Atlantis", UnitSystem::Metric).await;

    assert!(
        matches!(&result, Err(WeatherError::NotFound { city }) if city == "Atlantis"),
        "Expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unauthorized_surfaces_provider_message() {
    let mock_server = MockServer::start().await;
    let message = "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info.";
    mount(
        &mock_server,
        "/forecast",
        ResponseTemplate::new(401).set_body_json(serde_json::json!({"cod": 401, "message": message})),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_forecast("London", UnitSystem::Metric).await;

    match result {
        Err(WeatherError::Auth { message: got }) => assert_eq!(got, message),
        other => panic!("Expected Auth, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_other_status_is_upstream_error() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_current("London", UnitSystem::Metric).await;

    assert!(
        matches!(
            &result,
            Err(WeatherError::Upstream { status: 500, message }) if message == "Internal Server Error"
        ),
        "Expected Upstream, got: {result:?}"
    );
}

#[tokio::test]
async fn test_rate_limit_is_upstream_error() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "cod": 429,
            "message": "Your account is temporary blocked due to exceeding of requests limitation"
        })),
    )
    .await;

    let client = create_test_client(&mock_server);
    let err = client
        .fetch_current("London", UnitSystem::Metric)
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Upstream { status: 429, .. }), "got: {err:?}");
    assert!(err.to_string().contains("temporary blocked"));
}

#[tokio::test]
async fn test_invalid_json_response() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, "/weather", ResponseTemplate::new(200).set_body_string("not valid json"))
        .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_current("London", UnitSystem::Metric).await;

    assert!(
        matches!(result, Err(WeatherError::Parse(_))),
        "Expected Parse, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Reserve a free port, then release it so nothing is listening.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("local addr").port()
    };

    let client = OpenWeatherClient::new(TEST_KEY, settings_for(format!("http://127.0.0.1:{port}")))
        .expect("Failed to create client");
    let result = client.fetch_current("London", UnitSystem::Metric).await;

    assert!(
        matches!(result, Err(WeatherError::Network(_))),
        "Expected Network, got: {result:?}"
    );
}

#[tokio::test]
async fn test_slow_upstream_is_timeout_error() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(200)
            .set_body_json(london_current())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let settings = ClientSettings {
        base_url: mock_server.uri(),
        timeout: Duration::from_millis(200),
    };
    let client = OpenWeatherClient::new(TEST_KEY, settings).expect("Failed to create client");
    let result = client.fetch_current("London", UnitSystem::Metric).await;

    assert!(
        matches!(result, Err(WeatherError::Timeout(_))),
        "Expected Timeout, got: {result:?}"
    );
}

// ============================================================================
// Input validation scenarios
// ============================================================================

#[tokio::test]
async fn test_empty_city_is_rejected_before_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_current()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_current("   ", UnitSystem::Metric).await;

    assert!(
        matches!(result, Err(WeatherError::InvalidRequest(_))),
        "Expected InvalidRequest, got: {result:?}"
    );
}

// ============================================================================
// Query parameter verification
// ============================================================================

#[tokio::test]
async fn test_request_contains_correct_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "São Paulo"))
        .and(query_param("appid", TEST_KEY))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_forecast()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_forecast(" São Paulo ", UnitSystem::Metric).await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");
}

// ============================================================================
// Session scenarios
// ============================================================================

#[tokio::test]
async fn test_dashboard_refresh_live() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, "/weather", ResponseTemplate::new(200).set_body_json(london_current()))
        .await;
    mount(&mock_server, "/forecast", ResponseTemplate::new(200).set_body_json(london_forecast()))
        .await;

    let client = create_test_client(&mock_server);
    let mut demo = DemoGenerator::with_seed(1);
    let mut dashboard = Dashboard::new("London", UnitSystem::Metric);

    let snapshot = dashboard
        .refresh(Some(&client), &mut demo)
        .await
        .expect("Expected success");

    assert_eq!(snapshot.source, DataSource::Live);
    assert_eq!(snapshot.current.temperature.current, 14.27);
    assert_eq!(snapshot.forecast.len(), 3);
    assert!(!dashboard.demo);
}

#[tokio::test]
async fn test_dashboard_falls_back_to_demo_on_auth_error() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({"cod": 401, "message": "Invalid API key."});
    mount(&mock_server, "/weather", ResponseTemplate::new(401).set_body_json(body.clone())).await;
    mount(&mock_server, "/forecast", ResponseTemplate::new(401).set_body_json(body)).await;

    let client = create_test_client(&mock_server);
    let mut demo = DemoGenerator::with_seed(1);
    let mut dashboard = Dashboard::new("London", UnitSystem::Metric);

    let snapshot = dashboard
        .refresh(Some(&client), &mut demo)
        .await
        .expect("auth failures fall back to demo data");

    assert_eq!(snapshot.source, DataSource::Demo);
    assert_eq!(snapshot.current.location.name, "London");
    assert_eq!(snapshot.forecast.len(), 40);
    assert!(!dashboard.demo);
}

#[tokio::test]
async fn test_dashboard_returns_to_live_data_once_key_activates() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({"cod": 401, "message": "Invalid API key."});
    mount(&mock_server, "/weather", ResponseTemplate::new(401).set_body_json(body.clone())).await;
    mount(&mock_server, "/forecast", ResponseTemplate::new(401).set_body_json(body)).await;

    let client = create_test_client(&mock_server);
    let mut demo = DemoGenerator::with_seed(1);
    let mut dashboard = Dashboard::new("London", UnitSystem::Metric);

    let first = dashboard
        .refresh(Some(&client), &mut demo)
        .await
        .expect("auth failures fall back to demo data");
    assert_eq!(first.source, DataSource::Demo);

    mock_server.reset().await;
    mount(&mock_server, "/weather", ResponseTemplate::new(200).set_body_json(london_current()))
        .await;
    mount(&mock_server, "/forecast", ResponseTemplate::new(200).set_body_json(london_forecast()))
        .await;

    let second = dashboard
        .refresh(Some(&client), &mut demo)
        .await
        .expect("Expected success");
    assert_eq!(second.source, DataSource::Live);
    assert_eq!(second.current.temperature.current, 14.27);
}

#[tokio::test]
async fn test_dashboard_keeps_previous_snapshot_on_failure() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, "/weather", ResponseTemplate::new(200).set_body_json(london_current()))
        .await;
    mount(&mock_server, "/forecast", ResponseTemplate::new(200).set_body_json(london_forecast()))
        .await;

    let client = create_test_client(&mock_server);
    let mut demo = DemoGenerator::with_seed(1);
    let mut dashboard = Dashboard::new("London", UnitSystem::Metric);
    dashboard
        .refresh(Some(&client), &mut demo)
        .await
        .expect("Expected success");

    mock_server.reset().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(404).set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
    )
    .await;
    mount(&mock_server, "/forecast", ResponseTemplate::new(200).set_body_json(london_forecast()))
        .await;

    dashboard.set_city("Atlantis");
    let err = dashboard.refresh(Some(&client), &mut demo).await.unwrap_err();
    assert!(matches!(err, WeatherError::NotFound { .. }), "got: {err:?}");

    let kept = dashboard.snapshot().expect("previous snapshot kept");
    assert_eq!(kept.current.location.name, "London");
    assert_eq!(kept.source, DataSource::Live);
    assert!(!dashboard.demo);
}
