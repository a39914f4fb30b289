//! Newest-matching-release selection
//!
//! Pipeline: feed payload (cache or fetch) → releases → tag exclusion →
//! newest-first ordering → first asset whose file name matches.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::QueryConfig;
use crate::release::cache::{CacheEntry, CacheKey, CachePolicy, CacheStore};
use crate::release::error::{CacheError, ConfigError, QueryError};
use crate::release::fetcher::FeedFetcher;
use crate::release::filter::TagFilter;
use crate::release::matcher::AssetMatcher;
use crate::release::types::{Release, SelectionResult, parse_releases};
use crate::release::version::rank_by_version;

pub struct ReleaseSelector<F, S> {
    config: QueryConfig,
    policy: CachePolicy,
    filter: TagFilter,
    matcher: AssetMatcher,
    fetcher: F,
    store: S,
}

impl<F: FeedFetcher, S: CacheStore> ReleaseSelector<F, S> {
    /// Validate the configuration and build a selector.
    ///
    /// All patterns are compiled here, so an invalid pattern is reported
    /// before the cache or the network is touched.
    pub fn new(config: QueryConfig, fetcher: F, store: S) -> Result<Self, ConfigError> {
        let matcher = AssetMatcher::new(&config.asset_pattern)?;
        let filter = TagFilter::new(&config.exclude_patterns)?;
        let policy = config.cache_policy()?;

        Ok(Self {
            config,
            policy,
            filter,
            matcher,
            fetcher,
            store,
        })
    }

    pub async fn select(&self) -> Result<SelectionResult, QueryError> {
        self.select_at(Utc::now()).await
    }

    /// Run the full pipeline treating `now` as the current time
    pub async fn select_at(&self, now: DateTime<Utc>) -> Result<SelectionResult, QueryError> {
        let payload = self.load_feed(now).await?;
        let releases = parse_releases(&payload)?;
        debug!("Decoded {} releases", releases.len());

        Ok(self.select_from(&releases))
    }

    /// Pick the newest non-excluded release with a matching asset
    pub fn select_from(&self, releases: &[Release]) -> SelectionResult {
        let candidates = releases.iter().filter(|release| {
            if self.filter.is_excluded(&release.tag) {
                debug!("Excluding release {}", release.tag);
                return false;
            }
            // an empty tag cannot be reported as a version
            !release.tag.is_empty()
        });

        let ranked = rank_by_version(candidates, self.config.lenient_versions);

        let selected = ranked.into_iter().find_map(|release| {
            release
                .assets
                .iter()
                .filter(|asset| !asset.browser_download_url.is_empty())
                .find(|asset| self.matcher.matches_asset(asset))
                .map(|asset| SelectionResult::found(&release.tag, &asset.browser_download_url))
        });

        match selected {
            Some(result) => {
                info!(
                    "Selected {} ({})",
                    result.version, result.browser_download_url
                );
                result
            }
            None => {
                info!("No release asset matches {:?}", self.matcher.as_str());
                SelectionResult::default()
            }
        }
    }

    async fn load_feed(&self, now: DateTime<Utc>) -> Result<Vec<u8>, QueryError> {
        let source = self.config.releases_url.as_str();
        let key = self.policy.key_for(source);

        if self.policy.should_persist() {
            if let Some(payload) = self.read_cache(&key, now)? {
                return Ok(payload);
            }
        } else {
            debug!("Cache disabled");
        }

        let payload = self.fetcher.fetch(source).await?;

        if self.policy.should_persist() {
            self.store.put(&CacheEntry {
                key,
                payload: payload.clone(),
                stored_at: now,
            })?;
        }

        Ok(payload)
    }

    fn read_cache(&self, key: &CacheKey, now: DateTime<Utc>) -> Result<Option<Vec<u8>>, CacheError> {
        let Some(stored_at) = self.store.stored_at(key)? else {
            debug!("Cache miss for {}", key);
            return Ok(None);
        };

        if !self.policy.is_valid(stored_at, now) {
            debug!(
                "Cache entry {} is stale (stored at {}, ttl {}s)",
                key,
                stored_at,
                self.policy.ttl().num_seconds()
            );
            return Ok(None);
        }

        let payload = self.store.get(key)?;
        if payload.is_some() {
            debug!("Cache hit for {}", key);
        }
        Ok(payload)
    }
}
