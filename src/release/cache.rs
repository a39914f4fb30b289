//! Time-bounded cache of raw release feed payloads
//!
//! [`CachePolicy`] decides *whether* a payload may be reused or stored;
//! [`CacheStore`] implementations decide *where* bytes live.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, TimeDelta, Utc};
#[cfg(test)]
use mockall::automock;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::DEFAULT_CACHE_TTL_SECS;
use crate::release::error::CacheError;

/// Digest of a feed source, safe to use as a file name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Lowercase hex SHA-256 of the source identifier (64 characters)
    pub fn for_source(source: &str) -> Self {
        Self(hex::encode(Sha256::digest(source.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cached payload and the time it was stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: Vec<u8>,
    pub stored_at: DateTime<Utc>,
}

/// Freshness and persistence rules for cached feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    enabled: bool,
    ttl: TimeDelta,
}

impl CachePolicy {
    pub fn new(enabled: bool, ttl: TimeDelta) -> Self {
        Self { enabled, ttl }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn key_for(&self, source: &str) -> CacheKey {
        CacheKey::for_source(source)
    }

    /// An entry is valid while strictly younger than the TTL
    pub fn is_valid(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - stored_at < self.ttl
    }

    /// Whether entries may be read or written at all
    pub fn should_persist(&self) -> bool {
        self.enabled
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(true, default_ttl())
    }
}

fn default_ttl() -> TimeDelta {
    TimeDelta::seconds(DEFAULT_CACHE_TTL_SECS as i64)
}

/// Key/value storage for cached feed payloads
#[cfg_attr(test, automock)]
pub trait CacheStore {
    /// When the entry for `key` was stored, or `None` if there is no entry
    fn stored_at(&self, key: &CacheKey) -> Result<Option<DateTime<Utc>>, CacheError>;

    /// Payload stored under `key`, or `None` if there is no entry
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store an entry, replacing any previous one
    fn put(&self, entry: &CacheEntry) -> Result<(), CacheError>;
}

/// Cache store keeping one file per key inside a directory
///
/// The file modification time doubles as the entry's storage time.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("releases_{}.json", key))
    }

    fn io_error(path: &Path, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl CacheStore for FileCacheStore {
    fn stored_at(&self, key: &CacheKey) -> Result<Option<DateTime<Utc>>, CacheError> {
        let path = self.path_for(key);
        debug!("Checking cache file {:?}", path);

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(&path, e)),
        };

        let modified = metadata
            .modified()
            .map_err(|e| Self::io_error(&path, e))?;

        Ok(Some(DateTime::<Utc>::from(modified)))
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn put(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;

        let path = self.path_for(&entry.key);
        let mut file = File::create(&path).map_err(|e| Self::io_error(&path, e))?;
        file.write_all(&entry.payload)
            .map_err(|e| Self::io_error(&path, e))?;
        file.set_modified(SystemTime::from(entry.stored_at))
            .map_err(|e| Self::io_error(&path, e))?;

        debug!("Wrote {} bytes to cache file {:?}", entry.payload.len(), path);
        Ok(())
    }
}
