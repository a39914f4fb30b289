//! GitHub Releases API feed fetcher

use tracing::{debug, info, warn};

use crate::release::error::FetchError;
use crate::release::fetcher::FeedFetcher;

const USER_AGENT: &str = concat!("release-query/", env!("CARGO_PKG_VERSION"));

/// Fetches release feeds over HTTP
pub struct GitHubFetcher {
    client: reqwest::Client,
}

impl GitHubFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl FeedFetcher for GitHubFetcher {
    async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, FetchError> {
        info!("Fetching releases from {}", source_url);

        let response = self
            .client
            .get(source_url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(source_url.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("Release feed returned status {}: {}", status, source_url);
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: source_url.to_string(),
            });
        }

        let body = response.bytes().await?;
        debug!("Fetched {} bytes from {}", body.len(), source_url);

        Ok(body.to_vec())
    }
}
