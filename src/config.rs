use serde::Deserialize;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;

use crate::release::cache::CachePolicy;
use crate::release::error::ConfigError;

// =============================================================================
// Defaults
// =============================================================================

/// Release feed queried when none is configured
pub const DEFAULT_RELEASES_URL: &str = "https://api.github.com/repos/gnprice/toml-cli/releases";

/// Asset pattern used when none is configured
pub const DEFAULT_ASSET_PATTERN: &str = r"toml-v\d+\.\d+\.\d+-x86_64-linux\.tar\.gz$";

/// Maximum age of a cached feed in seconds (1 hour)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

/// Name of the per-user cache directory
pub const CACHE_DIR_NAME: &str = "release-query";

/// Immutable settings for a single query run
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub releases_url: String,
    pub asset_pattern: String,
    pub disable_cache: bool,
    /// Strip everything but digits and dots from tags before parsing
    pub lenient_versions: bool,
    pub exclude_patterns: Vec<String>,
    /// Maximum age of a cached feed, in seconds
    pub cache_ttl_secs: u64,
    /// Where the binary's `FileCacheStore` keeps feeds; the selector never reads it
    pub cache_dir: PathBuf,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            asset_pattern: DEFAULT_ASSET_PATTERN.to_string(),
            disable_cache: false,
            lenient_versions: false,
            exclude_patterns: Vec::new(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_dir: cache_dir(),
        }
    }
}

impl QueryConfig {
    /// Build a config from a file layer overridden by a command-line layer
    pub fn from_layers(file: ConfigLayer, cli: ConfigLayer) -> Self {
        file.merge(cli).apply(Self::default())
    }

    pub fn cache_policy(&self) -> Result<CachePolicy, ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl);
        }
        let ttl = i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or(ConfigError::InvalidTtl)?;

        Ok(CachePolicy::new(!self.disable_cache, ttl))
    }
}

/// Partial configuration from one source (config file or command line)
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigLayer {
    pub releases_url: Option<String>,
    pub asset_pattern: Option<String>,
    pub disable_cache: Option<bool>,
    pub lenient_versions: Option<bool>,
    pub exclude_patterns: Vec<String>,
    pub cache_ttl_secs: Option<u64>,
    pub cache_dir: Option<PathBuf>,
}

impl ConfigLayer {
    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Values set in `other` win; exclusion patterns accumulate.
    pub fn merge(mut self, other: ConfigLayer) -> Self {
        self.exclude_patterns.extend(other.exclude_patterns);
        Self {
            releases_url: other.releases_url.or(self.releases_url),
            asset_pattern: other.asset_pattern.or(self.asset_pattern),
            disable_cache: other.disable_cache.or(self.disable_cache),
            lenient_versions: other.lenient_versions.or(self.lenient_versions),
            exclude_patterns: self.exclude_patterns,
            cache_ttl_secs: other.cache_ttl_secs.or(self.cache_ttl_secs),
            cache_dir: other.cache_dir.or(self.cache_dir),
        }
    }

    fn apply(self, base: QueryConfig) -> QueryConfig {
        let mut exclude_patterns = base.exclude_patterns;
        exclude_patterns.extend(self.exclude_patterns);
        QueryConfig {
            releases_url: self.releases_url.unwrap_or(base.releases_url),
            asset_pattern: self.asset_pattern.unwrap_or(base.asset_pattern),
            disable_cache: self.disable_cache.unwrap_or(base.disable_cache),
            lenient_versions: self.lenient_versions.unwrap_or(base.lenient_versions),
            exclude_patterns,
            cache_ttl_secs: self.cache_ttl_secs.unwrap_or(base.cache_ttl_secs),
            cache_dir: self.cache_dir.unwrap_or(base.cache_dir),
        }
    }
}

/// Returns the directory holding cached release feeds.
/// Uses $XDG_CACHE_HOME/release-query if XDG_CACHE_HOME is set,
/// otherwise falls back to ~/.cache/release-query,
/// or <temp dir>/release-query if neither is available.
pub fn cache_dir() -> PathBuf {
    cache_dir_with_env(std::env::var("XDG_CACHE_HOME").ok(), dirs::home_dir())
}

fn cache_dir_with_env(xdg_cache_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let cache_dir = xdg_cache_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    cache_dir.join(CACHE_DIR_NAME)
}
