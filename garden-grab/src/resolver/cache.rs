//! Disk-based cache of resolved stream URLs.
//!
//! One small JSON file per station id, under a directory named after
//! the upstream data version. Entries never expire; switching to a new
//! upstream version lands in a fresh namespace, so snapshots never mix.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::error::ResolveError;

/// One cached resolution, as stored on disk.
#[derive(Debug, Serialize, Deserialize)]
struct CachedStream {
    /// Unix timestamp when the entry was written.
    cached_at_secs: u64,
    /// The resolved playable media URL.
    stream_url: String,
}

/// Sharded on-disk cache of station id → stream URL.
#[derive(Debug, Clone)]
pub struct StreamCache {
    dir: PathBuf,
}

impl StreamCache {
    /// Open the cache namespace for an upstream data version.
    ///
    /// An empty version token is refused: resolving into a default
    /// namespace would mix station data across incompatible upstream
    /// snapshots.
    pub fn open(root: impl Into<PathBuf>, version: &str) -> Result<Self, ResolveError> {
        if version.is_empty() {
            return Err(ResolveError::Configuration {
                message: "empty upstream version token".to_string(),
            });
        }
        if !is_single_path_component(version) {
            return Err(ResolveError::Configuration {
                message: format!("version token {version:?} is not a plain directory name"),
            });
        }

        Ok(Self {
            dir: root.into().join(version),
        })
    }

    /// Look up a cached stream URL.
    ///
    /// A missing, unreadable or malformed shard is a miss.
    pub fn get(&self, station_id: &str) -> Option<String> {
        let path = self.shard_path(station_id).ok()?;
        let contents = std::fs::read_to_string(path).ok()?;
        let cached: CachedStream = serde_json::from_str(&contents).ok()?;
        Some(cached.stream_url)
    }

    /// Persist a resolved stream URL.
    ///
    /// The shard is written to a temporary file and renamed into place,
    /// so a crash mid-write never leaves a partial entry behind.
    pub fn put(&self, station_id: &str, stream_url: &str) -> Result<(), ResolveError> {
        let path = self.shard_path(station_id)?;

        std::fs::create_dir_all(&self.dir).map_err(|e| ResolveError::Cache {
            message: format!("failed to create cache directory: {e}"),
        })?;

        let cached_at_secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| ResolveError::Cache {
                message: "system time before unix epoch".to_string(),
            })?
            .as_secs();

        let entry = CachedStream {
            cached_at_secs,
            stream_url: stream_url.to_string(),
        };

        let json = serde_json::to_string(&entry).map_err(|e| ResolveError::Cache {
            message: format!("failed to serialize cache entry: {e}"),
        })?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| ResolveError::Cache {
            message: format!("failed to write cache entry: {e}"),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| ResolveError::Cache {
            message: format!("failed to commit cache entry: {e}"),
        })?;

        Ok(())
    }

    /// Namespace directory for this cache.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Shard file for a station id, refusing ids that are not plain
    /// file names.
    fn shard_path(&self, station_id: &str) -> Result<PathBuf, ResolveError> {
        if station_id.is_empty() || !is_single_path_component(station_id) {
            return Err(ResolveError::Cache {
                message: format!("station id {station_id:?} is not a valid cache key"),
            });
        }
        Ok(self.dir.join(format!("{station_id}.json")))
    }
}

/// True if `s` cannot escape its directory when used as a file name.
fn is_single_path_component(s: &str) -> bool {
    !s.contains(['/', '\\']) && s != "." && s != ".."
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn put_then_get() {
        let dir = tempdir().unwrap();
        let cache = StreamCache::open(dir.path(), "v1").unwrap();

        cache.put("abc", "http://stream.example/abc").unwrap();
        assert_eq!(
            cache.get("abc").as_deref(),
            Some("http://stream.example/abc")
        );
    }

    #[test]
    fn survives_reopen() {
        let dir = tempdir().unwrap();

        {
            let cache = StreamCache::open(dir.path(), "v1").unwrap();
            cache.put("abc", "http://stream.example/abc").unwrap();
        }

        let cache = StreamCache::open(dir.path(), "v1").unwrap();
        assert_eq!(
            cache.get("abc").as_deref(),
            Some("http://stream.example/abc")
        );
    }

    #[test]
    fn missing_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = StreamCache::open(dir.path(), "v1").unwrap();
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn malformed_shard_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = StreamCache::open(dir.path(), "v1").unwrap();

        std::fs::create_dir_all(cache.dir()).unwrap();
        std::fs::write(cache.dir().join("bad.json"), "not json").unwrap();

        assert!(cache.get("bad").is_none());
    }

    #[test]
    fn versions_do_not_collide() {
        let dir = tempdir().unwrap();

        let old = StreamCache::open(dir.path(), "v1").unwrap();
        old.put("abc", "http://old.example/abc").unwrap();

        let new = StreamCache::open(dir.path(), "v2").unwrap();
        assert!(new.get("abc").is_none());

        new.put("abc", "http://new.example/abc").unwrap();
        assert_eq!(old.get("abc").as_deref(), Some("http://old.example/abc"));
        assert_eq!(new.get("abc").as_deref(), Some("http://new.example/abc"));
    }

    #[test]
    fn empty_version_refused() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            StreamCache::open(dir.path(), ""),
            Err(ResolveError::Configuration { .. })
        ));
    }

    #[test]
    fn traversal_version_refused() {
        let dir = tempdir().unwrap();
        assert!(StreamCache::open(dir.path(), "../evil").is_err());
    }

    #[test]
    fn bad_station_id_refused() {
        let dir = tempdir().unwrap();
        let cache = StreamCache::open(dir.path(), "v1").unwrap();

        assert!(cache.put("../escape", "http://x").is_err());
        assert!(cache.put("", "http://x").is_err());
        assert!(cache.get("../escape").is_none());
    }
}
