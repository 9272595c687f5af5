// Command orchestration.
// Loads config, resolves the observer and assembles the record for each bar module.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

use crate::cache::{CacheEntry, SnapshotCache, Source, paths};
use crate::config::{API_KEY_VAR, Config};
use crate::error::{Result, SkybarError};
use crate::location::{self, ObserverLocation};
use crate::moon;
use crate::ui::WaybarOutput;
use crate::ui::moon::{ekadashi_section, moon_output, moon_section};
use crate::ui::weather::{WeatherView, weather_output};
use crate::weather::{self, OpenWeatherClient, WeatherSnapshot};
use crate::{Cli, Command};

/// Cache key of the weather snapshot.
const WEATHER_KEY: &str = "weather";

/// Run the requested module and build its record.
pub async fn run(cli: Cli) -> Result<WaybarOutput> {
    let config_path = match cli.config {
        Some(path) => path,
        None => paths::config_path()
            .ok_or_else(|| SkybarError::Other("Could not determine config directory".to_string()))?,
    };
    let cache = SnapshotCache::open_default()?;
    let now = Utc::now();

    match cli.command {
        Command::Moon { lat, lon } => {
            let config = Config::load_or_default(&config_path)?.with_env();
            App::new(config, cache)?.moon(lat.zip(lon), now).await
        }
        Command::Weather { refresh } => {
            let config = Config::load(&config_path)?.with_env();
            App::new(config, cache)?.weather(refresh, now).await
        }
    }
}

/// Everything a single invocation works with.
pub struct App {
    config: Config,
    cache: SnapshotCache,
    client: Option<OpenWeatherClient>,
}

impl App {
    /// Builds the provider client only when an API key is configured.
    pub fn new(config: Config, cache: SnapshotCache) -> Result<Self> {
        let client = match config.api_key.as_deref() {
            Some(key) => Some(OpenWeatherClient::new(key)?.with_units(config.units)),
            None => None,
        };
        Ok(Self {
            config,
            cache,
            client,
        })
    }

    #[cfg(test)]
    pub fn with_client(mut self, client: OpenWeatherClient) -> Self {
        self.client = Some(client.with_units(self.config.units));
        self
    }

    /// Moon phase record. Works offline: without a resolvable location the
    /// computation falls back to the geocentric default.
    pub async fn moon(
        &self,
        overrides: Option<(f64, f64)>,
        now: DateTime<Utc>,
    ) -> Result<WaybarOutput> {
        let location = self.observer(overrides).await?;
        let state = moon::current_phase(&location, now)?;
        let events = moon::upcoming_events(&location, now)?;
        let ekadashi = moon::next_ekadashi(&location, now)?;

        tracing::debug!(
            phase = %state.phase_name,
            fraction = state.illuminated_fraction,
            "Computed moon state"
        );
        Ok(moon_output(&state, &events, &ekadashi, now, &Local))
    }

    /// Weather record with the moon summary embedded in the tooltip.
    pub async fn weather(&self, refresh: bool, now: DateTime<Utc>) -> Result<WaybarOutput> {
        let client = self
            .client
            .as_ref()
            .ok_or(SkybarError::MissingConfig(API_KEY_VAR))?;
        let location = location::resolve(&self.config, None, Some(client), &self.cache).await?;

        let window = if refresh {
            Duration::ZERO
        } else {
            self.config.cache_ttl
        };
        let (entry, source) = self.snapshot(client, &location, window, now).await?;
        tracing::debug!(from_cache = source.from_cache(), "Weather snapshot ready");

        let state = moon::current_phase(&location, now)?;
        let events = moon::upcoming_events(&location, now)?;
        let ekadashi = moon::next_ekadashi(&location, now)?;
        let extra = vec![
            moon_section(&state, &events, &Local),
            ekadashi_section(&ekadashi, now, &Local),
        ];

        let view = WeatherView {
            snapshot: &entry.payload,
            units: self.config.units,
            source,
            stored_at: entry.stored_at,
        };
        Ok(weather_output(&view, &extra, now))
    }

    async fn observer(&self, overrides: Option<(f64, f64)>) -> Result<ObserverLocation> {
        match location::resolve(&self.config, overrides, self.client.as_ref(), &self.cache).await {
            Ok(location) => Ok(location),
            Err(e @ SkybarError::InvalidLocation { .. }) => Err(e),
            Err(e) => {
                tracing::debug!("No observer location ({}), using 0, 0", e);
                Ok(ObserverLocation::default())
            }
        }
    }

    async fn snapshot(
        &self,
        client: &OpenWeatherClient,
        location: &ObserverLocation,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<(CacheEntry<WeatherSnapshot>, Source)> {
        let (entry, source) = self
            .cache
            .get_or_fetch_or_stale(WEATHER_KEY, window, now, || {
                weather::fetch_snapshot(client, location)
            })
            .await?;

        if source == Source::Fetched || entry.payload.is_for(location) {
            return Ok((entry, source));
        }

        // Snapshot belongs to a previously configured place
        tracing::debug!("Cached weather is for {}, refetching", entry.payload.location.display_name());
        let (payload, _) = self
            .cache
            .get_or_fetch_at(WEATHER_KEY, Duration::ZERO, now, || {
                weather::fetch_snapshot(client, location)
            })
            .await?;
        Ok((CacheEntry::new(payload, now), Source::Fetched))
    }
}
