//! Disk-based cache of each user's last known position.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::domain::Coordinate;

use super::error::LocationError;

/// Default TTL: 7 days.
const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedLocation {
    saved_at: DateTime<Utc>,
    coordinate: Coordinate,
}

/// Saved positions keyed by user id.
type SavedLocations = HashMap<String, SavedLocation>;

/// Configuration for the location cache.
#[derive(Debug, Clone)]
pub struct LocationCacheConfig {
    /// Path to the cache file.
    pub path: PathBuf,
    /// How long a saved position stays usable.
    pub ttl: Duration,
}

impl LocationCacheConfig {
    /// Create a new config with the given path and default TTL (7 days).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for LocationCacheConfig {
    fn default() -> Self {
        Self::new("last_location.json")
    }
}

/// The last coordinate each user shared, persisted across restarts.
///
/// Positions are only ever read back for the user who saved them.
pub struct LastKnownLocation {
    config: LocationCacheConfig,
    clock: Arc<dyn Clock>,
    /// Serialises read-modify-write cycles on the file.
    write_lock: Mutex<()>,
}

impl LastKnownLocation {
    pub fn new(config: LocationCacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Use a custom clock for timestamps and expiry (for testing).
    pub fn with_clock(config: LocationCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the coordinate `user` saved last.
    ///
    /// Returns `None` if the user saved nothing, the file is corrupt, or the
    /// position is older than the TTL.
    pub fn load(&self, user: &str) -> Option<Coordinate> {
        let saved = read_all(&self.config.path).remove(user)?;
        if !self.is_fresh(&saved) {
            return None;
        }

        // Re-validate: the file may have been edited by hand.
        Coordinate::new(saved.coordinate.latitude(), saved.coordinate.longitude()).ok()
    }

    /// Save a coordinate for `user`, replacing their previous one.
    ///
    /// Expired entries of other users are dropped on the way. Creates parent
    /// directories if they don't exist. The file is written to a uniquely
    /// named temporary sibling and renamed into place.
    pub fn save(&self, user: &str, coordinate: Coordinate) -> Result<(), LocationError> {
        let _guard = self.write_lock.lock().map_err(|_| LocationError::Cache {
            message: "location cache lock poisoned".to_string(),
        })?;

        let mut saved = read_all(&self.config.path);
        saved.retain(|_, entry| self.is_fresh(entry));
        saved.insert(
            user.to_string(),
            SavedLocation {
                saved_at: self.clock.now(),
                coordinate,
            },
        );

        let dir = match self.config.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| LocationError::Cache {
                message: format!("failed to create cache directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(&saved).map_err(|e| LocationError::Cache {
            message: format!("failed to serialize locations: {}", e),
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| LocationError::Cache {
            message: format!("failed to create temporary file: {}", e),
        })?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| LocationError::Cache {
                message: format!("failed to write cache file: {}", e),
            })?;
        tmp.persist(&self.config.path)
            .map_err(|e| LocationError::Cache {
                message: format!("failed to replace cache file: {}", e.error),
            })?;

        Ok(())
    }

    /// A timestamp in the future counts as fresh.
    fn is_fresh(&self, saved: &SavedLocation) -> bool {
        match self.clock.now().signed_duration_since(saved.saved_at).to_std() {
            Ok(age) => age < self.config.ttl,
            Err(_) => true,
        }
    }
}

impl fmt::Debug for LastKnownLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LastKnownLocation")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Every saved position; empty when the file is missing or corrupt.
fn read_all(path: &Path) -> SavedLocations {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return SavedLocations::new();
    };
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        debug!(path = %path.display(), error = %e, "discarding unreadable location cache");
        SavedLocations::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn maputo() -> Coordinate {
        Coordinate::new(-25.9692, 32.5732).unwrap()
    }

    fn cape_town() -> Coordinate {
        Coordinate::new(-33.9249, 18.4241).unwrap()
    }

    fn at(path: &Path, instant: DateTime<Utc>) -> LastKnownLocation {
        LastKnownLocation::with_clock(LocationCacheConfig::new(path), Arc::new(FixedClock(instant)))
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let cache = LastKnownLocation::new(LocationCacheConfig::new(dir.path().join("loc.json")));

        cache.save("alice", maputo()).unwrap();
        assert_eq!(cache.load("alice"), Some(maputo()));
    }

    #[test]
    fn users_are_kept_apart() {
        let dir = tempdir().unwrap();
        let cache = LastKnownLocation::new(LocationCacheConfig::new(dir.path().join("loc.json")));

        cache.save("alice", maputo()).unwrap();
        assert_eq!(cache.load("bob"), None);

        cache.save("bob", cape_town()).unwrap();
        assert_eq!(cache.load("alice"), Some(maputo()));
        assert_eq!(cache.load("bob"), Some(cape_town()));
    }

    #[test]
    fn save_replaces_previous() {
        let dir = tempdir().unwrap();
        let cache = LastKnownLocation::new(LocationCacheConfig::new(dir.path().join("loc.json")));

        cache.save("alice", maputo()).unwrap();
        cache.save("alice", cape_town()).unwrap();
        assert_eq!(cache.load("alice"), Some(cape_town()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn expiry_follows_the_clock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loc.json");

        at(&path, day(1)).save("alice", maputo()).unwrap();
        assert_eq!(at(&path, day(7)).load("alice"), Some(maputo()));
        assert_eq!(at(&path, day(8)).load("alice"), None);
    }

    #[test]
    fn expired_entries_are_pruned_on_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loc.json");

        at(&path, day(1)).save("alice", maputo()).unwrap();
        at(&path, day(10)).save("bob", cape_town()).unwrap();

        let saved = read_all(&path);
        assert!(!saved.contains_key("alice"));
        assert!(saved.contains_key("bob"));
    }

    #[test]
    fn concurrent_saves_keep_every_user() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(LastKnownLocation::new(LocationCacheConfig::new(
            dir.path().join("loc.json"),
        )));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.save(&format!("user-{i}"), maputo()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        for i in 0..8 {
            assert_eq!(cache.load(&format!("user-{i}")), Some(maputo()));
        }
    }

    #[test]
    fn missing_file_returns_none() {
        let cache = LastKnownLocation::new(LocationCacheConfig::new(
            "/nonexistent/path/last_location.json",
        ));
        assert!(cache.load("alice").is_none());
    }

    #[test]
    fn corrupt_or_invalid_file_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loc.json");
        let cache = LastKnownLocation::new(LocationCacheConfig::new(&path));

        std::fs::write(&path, "not json").unwrap();
        assert!(cache.load("alice").is_none());

        let out_of_range = format!(
            r#"{{"alice":{{"saved_at":"{}","coordinate":{{"latitude":95.0,"longitude":0.0}}}}}}"#,
            Utc::now().to_rfc3339()
        );
        std::fs::write(&path, out_of_range).unwrap();
        assert!(cache.load("alice").is_none());
    }

    #[test]
    fn corrupt_file_is_replaced_on_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loc.json");
        let cache = LastKnownLocation::new(LocationCacheConfig::new(&path));

        std::fs::write(&path, "not json").unwrap();
        cache.save("alice", maputo()).unwrap();
        assert_eq!(cache.load("alice"), Some(maputo()));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("loc.json");
        let cache = LastKnownLocation::new(LocationCacheConfig::new(&path));

        cache.save("alice", maputo()).unwrap();
        assert!(path.exists());
    }
}
