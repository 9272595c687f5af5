// OpenWeatherMap module.
// Provides the client, response types and the snapshot fetch used by the weather bar module.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::OpenWeatherClient;
pub use types::*;

use crate::error::Result;
use crate::location::ObserverLocation;

/// Emoji for an OpenWeatherMap condition code.
pub fn condition_emoji(code: u32) -> &'static str {
    match code {
        200..=299 => "⛈️",
        300..=399 | 500..=599 => "🌧️",
        600..=699 => "❄️",
        700..=799 => "🌫️",
        800 => "☀️",
        801 => "⛅",
        802..=804 => "☁️",
        _ => "🌡️",
    }
}

/// Fetch everything the weather module shows, one request after another.
/// Current conditions are required; forecast and air quality degrade to `None`.
pub async fn fetch_snapshot(
    client: &OpenWeatherClient,
    location: &ObserverLocation,
) -> Result<WeatherSnapshot> {
    let current = client.current_weather(location).await?;

    let forecast = match client.forecast(location).await {
        Ok(forecast) => Some(forecast),
        Err(e) => {
            tracing::warn!("Forecast unavailable: {}", e);
            None
        }
    };

    let aqi = match client.air_quality(location).await {
        Ok(aqi) => Some(aqi),
        Err(e) => {
            tracing::warn!("Air quality unavailable: {}", e);
            None
        }
    };

    Ok(WeatherSnapshot {
        location: location.clone(),
        current,
        forecast,
        aqi,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::json;

    pub(crate) fn current_body() -> serde_json::Value {
        json!({
            "weather": [{"id": 801, "main": "Clouds", "description": "few clouds"}],
            "main": {"temp": 7.4, "feels_like": 5.2, "temp_min": 6.0, "temp_max": 9.1,
                     "humidity": 81, "pressure": 1012},
            "wind": {"speed": 3.0, "deg": 250},
            "sys": {"sunrise": 1704096000, "sunset": 1704124800},
            "dt": 1704110400,
            "timezone": 3600,
            "name": "Oslo"
        })
    }

    pub(crate) fn forecast_body() -> serde_json::Value {
        json!({
            "cnt": 3,
            "list": [
                {"dt": 1704117600,
                 "main": {"temp": 6.0, "feels_like": 4.0, "temp_min": 5.5, "temp_max": 6.8, "humidity": 85},
                 "weather": [{"id": 500, "description": "light rain"}], "pop": 0.4},
                {"dt": 1704128400,
                 "main": {"temp": 3.0, "feels_like": 1.0, "temp_min": 2.4, "temp_max": 3.5, "humidity": 90},
                 "weather": [{"id": 804, "description": "overcast clouds"}], "pop": 0.0},
                {"dt": 1704204000,
                 "main": {"temp": -2.0, "feels_like": -6.0, "temp_min": -3.0, "temp_max": -1.0, "humidity": 70},
                 "weather": [{"id": 600, "description": "light snow"}], "pop": 0.7}
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{current_body, forecast_body};
    use super::*;
    use crate::error::SkybarError;
    use serde_json::json;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_condition_emoji() {
        assert_eq!(condition_emoji(211), "⛈️");
        assert_eq!(condition_emoji(502), "🌧️");
        assert_eq!(condition_emoji(800), "☀️");
        assert_eq!(condition_emoji(803), "☁️");
        assert_eq!(condition_emoji(42), "🌡️");
    }

    #[tokio::test]
    async fn test_fetch_snapshot() {
        let server = MockServer::start().await;
        Mock::given(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;
        Mock::given(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;
        Mock::given(path("/data/2.5/air_pollution"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [{"main": {"aqi": 3}}]
            })))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("k", &server.uri()).unwrap();
        let snapshot = fetch_snapshot(&client, &ObserverLocation::new(59.91, 10.75))
            .await
            .unwrap();
        assert_eq!(snapshot.current.name, "Oslo");
        assert!(snapshot.is_for(&ObserverLocation::new(59.912, 10.751)));
        assert!(!snapshot.is_for(&ObserverLocation::new(48.85, 2.35)));
        assert_eq!(snapshot.forecast.unwrap().list.len(), 3);
        assert_eq!(snapshot.aqi, Some(3));
    }

    #[tokio::test]
    async fn test_optional_parts_degrade() {
        let server = MockServer::start().await;
        Mock::given(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;
        Mock::given(path("/data/2.5/air_pollution"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("k", &server.uri()).unwrap();
        let snapshot = fetch_snapshot(&client, &ObserverLocation::new(59.91, 10.75))
            .await
            .unwrap();
        assert!(snapshot.forecast.is_none());
        assert!(snapshot.aqi.is_none());
    }

    #[tokio::test]
    async fn test_current_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url("k", &server.uri()).unwrap();
        let result = fetch_snapshot(&client, &ObserverLocation::new(59.91, 10.75)).await;
        assert!(matches!(result, Err(SkybarError::RateLimited)));
    }
}
