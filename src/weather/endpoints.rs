// OpenWeatherMap endpoint functions.
// Typed methods for geocoding, current conditions, forecast and air quality.

use crate::error::{Result, SkybarError};
use crate::location::ObserverLocation;

use super::client::OpenWeatherClient;
use super::types::{AirPollution, CurrentWeather, Forecast, GeocodeEntry};

/// Forecast steps requested: 3 days of 3-hour intervals.
const FORECAST_STEPS: u32 = 24;

impl OpenWeatherClient {
    /// Resolve a city name to coordinates.
    pub async fn geocode(&self, city: &str) -> Result<ObserverLocation> {
        let params = [("q", city.to_string()), ("limit", "1".to_string())];
        let response = self.get_with_params("/geo/1.0/direct", &params).await?;
        let entries: Vec<GeocodeEntry> = response.json().await?;

        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| SkybarError::NotFound(format!("city {}", city)))?;

        let label = match (&entry.state, &entry.country) {
            (Some(state), _) if state != &entry.name => format!("{}, {}", entry.name, state),
            (_, Some(country)) => format!("{}, {}", entry.name, country),
            _ => entry.name.clone(),
        };
        Ok(ObserverLocation::new(entry.lat, entry.lon).with_label(label))
    }

    /// Get current conditions at a location.
    pub async fn current_weather(&self, location: &ObserverLocation) -> Result<CurrentWeather> {
        let response = self
            .get_with_params("/data/2.5/weather", &self.location_params(location))
            .await?;
        let current: CurrentWeather = response.json().await?;
        Ok(current)
    }

    /// Get the 3-hour forecast at a location.
    pub async fn forecast(&self, location: &ObserverLocation) -> Result<Forecast> {
        let mut params = self.location_params(location);
        params.push(("cnt", FORECAST_STEPS.to_string()));
        let response = self.get_with_params("/data/2.5/forecast", &params).await?;
        let forecast: Forecast = response.json().await?;
        Ok(forecast)
    }

    /// Get the air quality index (1-5) at a location.
    pub async fn air_quality(&self, location: &ObserverLocation) -> Result<u8> {
        let params = [
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
        ];
        let response = self
            .get_with_params("/data/2.5/air_pollution", &params)
            .await?;
        let pollution: AirPollution = response.json().await?;
        pollution
            .list
            .first()
            .map(|item| item.main.aqi)
            .ok_or_else(|| SkybarError::Fetch("empty air pollution response".to_string()))
    }

    fn location_params(&self, location: &ObserverLocation) -> Vec<(&'static str, String)> {
        vec![
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("units", self.units().as_query().to_string()),
        ]
    }
}
