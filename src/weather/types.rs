// OpenWeatherMap response types.
// Only the fields the bar renders are deserialized; everything is re-serializable for the cache.

use serde::{Deserialize, Serialize};

use crate::location::ObserverLocation;

/// Condition entry (`weather[0]` in every response).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: u32,
    pub description: String,
}

/// Temperature block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Main {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    pub sunrise: i64,
    pub sunset: i64,
}

/// `/data/2.5/weather`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub weather: Vec<Condition>,
    pub main: Main,
    pub wind: Wind,
    pub sys: Sys,
    pub dt: i64,
    /// Shift in seconds from UTC.
    pub timezone: i32,
    #[serde(default)]
    pub name: String,
}

/// One 3-hour step of `/data/2.5/forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: Main,
    pub weather: Vec<Condition>,
    /// Probability of precipitation, 0..1.
    #[serde(default)]
    pub pop: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub list: Vec<ForecastItem>,
}

/// `/geo/1.0/direct` entry.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeocodeEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

/// `/data/2.5/air_pollution`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AirPollution {
    pub list: Vec<AirPollutionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AirPollutionItem {
    pub main: AirQualityIndex,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AirQualityIndex {
    /// 1 (good) to 5 (very poor).
    pub aqi: u8,
}

/// Everything the weather module renders, cached as one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: ObserverLocation,
    pub current: CurrentWeather,
    pub forecast: Option<Forecast>,
    pub aqi: Option<u8>,
}

impl WeatherSnapshot {
    /// Whether this snapshot was taken for (roughly) the given place.
    pub fn is_for(&self, location: &ObserverLocation) -> bool {
        (self.location.latitude - location.latitude).abs() < 0.01
            && (self.location.longitude - location.longitude).abs() < 0.01
    }
}

impl CurrentWeather {
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

impl ForecastItem {
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}
