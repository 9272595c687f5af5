// Observer location and its resolution chain.
// CLI flags win over pinned config coordinates, which win over geocoding the configured city.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::SnapshotCache;
use crate::config::Config;
use crate::error::{Result, SkybarError};
use crate::weather::OpenWeatherClient;

/// Geocoding results barely change; keep them for 30 days.
pub const GEOCODE_FRESHNESS: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Geographic position of the observer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObserverLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl ObserverLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Reject non-finite or out-of-range coordinates.
    pub fn validate(&self) -> Result<()> {
        let latitude_ok = (-90.0..=90.0).contains(&self.latitude);
        let longitude_ok = (-180.0..=180.0).contains(&self.longitude);
        if latitude_ok && longitude_ok {
            Ok(())
        } else {
            Err(SkybarError::InvalidLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Label for display, falling back to the coordinates.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{:.2}, {:.2}", self.latitude, self.longitude),
        }
    }
}

/// Resolve where the observer is.
///
/// `client` is only consulted when neither `overrides` nor the config pin
/// coordinates; its result is cached under `geo/<city>`.
pub async fn resolve(
    config: &Config,
    overrides: Option<(f64, f64)>,
    client: Option<&OpenWeatherClient>,
    cache: &SnapshotCache,
) -> Result<ObserverLocation> {
    if let Some((latitude, longitude)) = overrides {
        let location = ObserverLocation::new(latitude, longitude);
        location.validate()?;
        return Ok(location);
    }

    if let Some(location) = config.coordinates() {
        location.validate()?;
        return Ok(location);
    }

    let city = config
        .city
        .as_deref()
        .ok_or(SkybarError::MissingConfig("SET_CITY"))?;
    let client = client.ok_or(SkybarError::MissingConfig(crate::config::API_KEY_VAR))?;

    let key = format!("geo/{}", city.to_lowercase());
    let (location, from_cache) = cache
        .get_or_fetch(&key, GEOCODE_FRESHNESS, || client.geocode(city))
        .await?;
    tracing::debug!(city, from_cache, "Resolved location");
    location.validate()?;
    Ok(location)
}
