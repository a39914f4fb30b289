//! Feed and result types

use serde::{Deserialize, Serialize};

/// A single entry of the release feed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Nominal version identifier, not necessarily a valid version
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub browser_download_url: String,
}

impl Asset {
    /// Returns the last path segment of the download URL
    pub fn file_name(&self) -> &str {
        file_name(&self.browser_download_url)
    }
}

/// Returns the last `/`-separated segment of `url`, ignoring trailing slashes.
///
/// An empty or all-slash input yields `"."` and `"/"` respectively, so that
/// patterns see the same base name a path-oriented tool would.
pub fn file_name(url: &str) -> &str {
    if url.is_empty() {
        return ".";
    }
    let trimmed = url.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Parse a raw feed payload into releases
pub fn parse_releases(payload: &[u8]) -> Result<Vec<Release>, serde_json::Error> {
    serde_json::from_slice(payload)
}

/// Outcome of a query run
///
/// Both fields are empty when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionResult {
    pub version: String,
    pub browser_download_url: String,
}

impl SelectionResult {
    pub fn found(version: &str, browser_download_url: &str) -> Self {
        Self {
            version: version.to_string(),
            browser_download_url: browser_download_url.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.version.is_empty() && self.browser_download_url.is_empty()
    }
}
