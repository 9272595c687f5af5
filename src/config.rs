// Configuration loading.
// Reads the flat KEY=value file once at startup into an explicit Config.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::cache::DEFAULT_FRESHNESS;
use crate::error::{Result, SkybarError};
use crate::location::ObserverLocation;

pub const API_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";

/// Unit system requested from the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the provider's `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Wind speed label, after [`Units::wind_speed`] conversion.
    pub fn wind_label(&self) -> &'static str {
        match self {
            Units::Metric => "km/h",
            Units::Imperial => "mph",
        }
    }

    /// Convert the provider's wind speed (m/s or mph) for display.
    pub fn wind_speed(&self, raw: f64) -> f64 {
        match self {
            Units::Metric => raw * 3.6,
            Units::Imperial => raw,
        }
    }
}

/// Settings shared by all modules.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub city: Option<String>,
    pub api_key: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub units: Units,
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            city: None,
            api_key: None,
            latitude: None,
            longitude: None,
            units: Units::default(),
            cache_ttl: DEFAULT_FRESHNESS,
        }
    }
}

impl Config {
    /// Load a config file. A missing file yields `NotFound`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SkybarError::NotFound(path.display().to_string()),
            _ => SkybarError::Io(e),
        })?;
        Self::parse(&contents)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(SkybarError::NotFound(_)) => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse `KEY=value` lines. Blank lines and `#` comments are skipped,
    /// surrounding quotes are stripped and unknown keys are ignored.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config = Self::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                tracing::debug!("Skipping config line without '=': {}", line);
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'').trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "SET_CITY" => config.city = Some(value.to_string()),
                API_KEY_VAR => config.api_key = Some(value.to_string()),
                "LATITUDE" => config.latitude = Some(parse_number(key, value)?),
                "LONGITUDE" => config.longitude = Some(parse_number(key, value)?),
                "UNITS" => config.units = parse_units(value)?,
                "CACHE_TTL" => {
                    let secs = value.parse::<u64>().map_err(|_| invalid(key, value))?;
                    config.cache_ttl = Duration::from_secs(secs);
                }
                _ => tracing::debug!("Ignoring unknown config key {}", key),
            }
        }

        Ok(config)
    }

    /// Fill the API key from the environment when the file has none.
    pub fn with_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(API_KEY_VAR).ok().filter(|key| !key.is_empty());
        }
        self
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or(SkybarError::MissingConfig(API_KEY_VAR))
    }

    /// Coordinates pinned in the config, if both are present.
    pub fn coordinates(&self) -> Option<ObserverLocation> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                let location = ObserverLocation::new(lat, lon);
                Some(match &self.city {
                    Some(city) => location.with_label(city),
                    None => location,
                })
            }
            _ => None,
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value.parse::<f64>().map_err(|_| invalid(key, value))
}

fn parse_units(value: &str) -> Result<Units> {
    match value.to_ascii_lowercase().as_str() {
        "metric" => Ok(Units::Metric),
        "imperial" => Ok(Units::Imperial),
        _ => Err(invalid("UNITS", value)),
    }
}

fn invalid(key: &str, value: &str) -> SkybarError {
    SkybarError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_flat_file() {
        let config = Config::parse(
            r#"
# HyprV style settings
SET_CITY="Pune"
OPENWEATHERMAP_API_KEY = 'abc123'
LATITUDE=18.52
LONGITUDE=73.85
UNITS=Imperial
CACHE_TTL=900
SOMETHING_ELSE=1
"#,
        )
        .unwrap();

        assert_eq!(config.city.as_deref(), Some("Pune"));
        assert_eq!(config.api_key().unwrap(), "abc123");
        assert_eq!(config.latitude, Some(18.52));
        assert_eq!(config.longitude, Some(73.85));
        assert_eq!(config.units, Units::Imperial);
        assert_eq!(config.cache_ttl, Duration::from_secs(900));
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert!(matches!(
            config.api_key(),
            Err(SkybarError::MissingConfig(API_KEY_VAR))
        ));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let config = Config::parse("OPENWEATHERMAP_API_KEY=ab=cd").unwrap();
        assert_eq!(config.api_key.as_deref(), Some("ab=cd"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::parse("LATITUDE=north"),
            Err(SkybarError::InvalidConfig { .. })
        ));
        assert!(matches!(
            Config::parse("UNITS=kelvin"),
            Err(SkybarError::InvalidConfig { .. })
        ));
        assert!(matches!(
            Config::parse("CACHE_TTL=-5"),
            Err(SkybarError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_coordinates_need_both_values() {
        let config = Config::parse("LATITUDE=10").unwrap();
        assert!(config.coordinates().is_none());

        let config = Config::parse("LATITUDE=10\nLONGITUDE=20\nSET_CITY=Somewhere").unwrap();
        let location = config.coordinates().unwrap();
        assert_eq!(location.latitude, 10.0);
        assert_eq!(location.longitude, 20.0);
        assert_eq!(location.label.as_deref(), Some("Somewhere"));
    }

    #[test]
    fn test_load_missing_and_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("skybar.conf");

        assert!(matches!(Config::load(&path), Err(SkybarError::NotFound(_))));
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());

        fs::write(&path, "SET_CITY=Oslo\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().city.as_deref(), Some("Oslo"));
    }

    #[test]
    fn test_wind_conversion() {
        assert!((Units::Metric.wind_speed(10.0) - 36.0).abs() < 1e-9);
        assert_eq!(Units::Imperial.wind_speed(10.0), 10.0);
        assert_eq!(Units::Imperial.as_query(), "imperial");
    }
}
