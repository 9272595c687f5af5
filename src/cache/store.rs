// Snapshot cache for provider responses.
// Handles JSON serialization, freshness checks and atomic replacement on disk.

use std::fs;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Result, SkybarError};

use super::paths;

/// Default freshness window for weather snapshots: 1 hour.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60 * 60);

/// A persisted payload with the instant it was stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(payload: T, stored_at: DateTime<Utc>) -> Self {
        Self { payload, stored_at }
    }

    /// Age of the entry at `now`. Entries stamped in the future count as age zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the entry is strictly younger than the freshness window.
    pub fn is_fresh(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) < window
    }
}

/// Result of looking up a key without fetching.
#[derive(Debug, Clone)]
pub enum Lookup<T> {
    Fresh(CacheEntry<T>),
    Stale(CacheEntry<T>),
    Absent,
}

/// Where a payload returned by the cache came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Fetched,
    Stale,
}

impl Source {
    pub fn from_cache(&self) -> bool {
        !matches!(self, Source::Fetched)
    }
}

/// One JSON snapshot per key inside a single directory.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Open the cache in the per-user cache directory.
    pub fn open_default() -> Result<Self> {
        paths::cache_dir()
            .map(Self::new)
            .ok_or_else(|| SkybarError::Other("Could not determine cache directory".to_string()))
    }

    /// Path of the snapshot file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        paths::entry_path(&self.dir, key)
    }

    /// Read the raw entry for a key. `Ok(None)` when no snapshot exists.
    pub fn read_entry<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CacheEntry<T>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(|e| SkybarError::CacheRead {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let entry = serde_json::from_str(&contents).map_err(|e| SkybarError::CacheRead {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(entry))
    }

    /// Classify the entry for `key` at `now`. Unreadable entries count as absent.
    pub fn lookup<T: DeserializeOwned>(
        &self,
        key: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Lookup<T> {
        match self.read_entry(key) {
            Ok(Some(entry)) if entry.is_fresh(window, now) => Lookup::Fresh(entry),
            Ok(Some(entry)) => Lookup::Stale(entry),
            Ok(None) => Lookup::Absent,
            Err(e) => {
                tracing::debug!("Treating cache entry as missing: {}", e);
                Lookup::Absent
            }
        }
    }

    /// Persist `payload` for `key`, replacing any previous snapshot.
    pub fn store<T: Serialize>(&self, key: &str, payload: &T, now: DateTime<Utc>) -> Result<()> {
        let path = self.path_for(key);
        write_entry(&path, &CacheEntry::new(payload, now)).map_err(|e| SkybarError::CacheWrite {
            path,
            reason: e.to_string(),
        })
    }

    /// Return the fresh snapshot for `key`, or fetch and persist a new one.
    /// The boolean is `true` when the payload came from disk.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        window: Duration,
        fetch: F,
    ) -> Result<(T, bool)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.get_or_fetch_at(key, window, Utc::now(), fetch).await
    }

    /// Same as [`get_or_fetch`](Self::get_or_fetch) with an explicit clock reading.
    pub async fn get_or_fetch_at<T, F, Fut>(
        &self,
        key: &str,
        window: Duration,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<(T, bool)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Lookup::Fresh(entry) = self.lookup::<T>(key, window, now) {
            tracing::debug!("Cache hit for {}", key);
            return Ok((entry.payload, true));
        }

        tracing::debug!("Cache miss for {}, fetching", key);
        let payload = fetch().await?;
        self.store_best_effort(key, &payload, now);
        Ok((payload, false))
    }

    /// Like [`get_or_fetch_at`](Self::get_or_fetch_at), but falls back to a stale
    /// snapshot when the fetch fails. The fetch error is returned only when
    /// there is nothing on disk to serve.
    pub async fn get_or_fetch_or_stale<T, F, Fut>(
        &self,
        key: &str,
        window: Duration,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<(CacheEntry<T>, Source)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let stale = match self.lookup::<T>(key, window, now) {
            Lookup::Fresh(entry) => {
                tracing::debug!("Cache hit for {}", key);
                return Ok((entry, Source::Cache));
            }
            Lookup::Stale(entry) => Some(entry),
            Lookup::Absent => None,
        };

        match fetch().await {
            Ok(payload) => {
                self.store_best_effort(key, &payload, now);
                Ok((CacheEntry::new(payload, now), Source::Fetched))
            }
            Err(e) => match stale {
                Some(entry) => {
                    tracing::warn!(
                        "Fetch for {} failed ({}), serving snapshot from {}",
                        key,
                        e,
                        entry.stored_at
                    );
                    Ok((entry, Source::Stale))
                }
                None => Err(e),
            },
        }
    }

    fn store_best_effort<T: Serialize>(&self, key: &str, payload: &T, now: DateTime<Utc>) {
        if let Err(e) = self.store(key, payload, now) {
            tracing::warn!("{}", e);
        }
    }
}

/// Write an entry atomically via a temp file and rename.
fn write_entry<T: Serialize>(path: &Path, entry: &CacheEntry<T>) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(entry)?;

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
