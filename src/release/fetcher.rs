//! Fetcher trait for obtaining the raw release feed

#[cfg(test)]
use mockall::automock;

use crate::release::error::FetchError;

/// Trait for downloading a release feed
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetches the raw feed payload
    ///
    /// # Arguments
    /// * `source_url` - The feed location (e.g., "https://api.github.com/repos/owner/repo/releases")
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - The response body, undecoded
    /// * `Err(FetchError)` - If the request fails or returns a non-success status
    async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, FetchError>;
}
