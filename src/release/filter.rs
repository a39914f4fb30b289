//! Tag exclusion patterns

use regex::Regex;

use crate::release::error::{ConfigError, PatternKind};

/// Ordered set of exclusion patterns, compiled up front
///
/// A tag is excluded when any pattern matches anywhere in it.
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    patterns: Vec<Regex>,
}

impl TagFilter {
    /// Compile all patterns, failing on the first invalid one
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    kind: PatternKind::Exclude,
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, tag: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(tag))
    }
}
