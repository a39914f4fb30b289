//! Asset file name matching

use regex::Regex;

use crate::release::error::{ConfigError, PatternKind};
use crate::release::types::Asset;

/// Selects assets whose file name contains a match for a pattern
#[derive(Debug, Clone)]
pub struct AssetMatcher {
    pattern: Regex,
}

impl AssetMatcher {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            kind: PatternKind::Asset,
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }

    /// Match against the last path segment of the asset's download URL
    pub fn matches_asset(&self, asset: &Asset) -> bool {
        self.matches(asset.file_name())
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}
