//! Version parsing and ordering for release tags
//!
//! The accepted grammar is wider than strict semantic versioning:
//! - an optional `v` prefix is ignored
//! - partial versions are padded ("1" -> 1.0.0, "1.2" -> 1.2.0)
//! - more than three numeric segments are allowed ("1.2.3.4")
//! - the `-` before an alphabetic pre-release may be omitted ("2.0.0rc1")
//! - identifiers may contain `~` and numeric ones may have leading zeros
//! - build metadata ("+build") is ignored
//!
//! In lenient mode every character outside `[0-9.]` is removed first, so
//! `release-1.2.3` parses as `1.2.3`.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{trace, warn};

use crate::release::types::Release;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^v?(?<core>[0-9]+(?:\.[0-9]+)*)",
        r"(?:-(?<numeric_pre>[0-9]+[0-9A-Za-z~-]*(?:\.[0-9A-Za-z~-]+)*)",
        r"|-?(?<pre>[A-Za-z~-]+[0-9A-Za-z~-]*(?:\.[0-9A-Za-z~-]+)*))?",
        r"(?:\+[0-9A-Za-z~-]+(?:\.[0-9A-Za-z~-]+)*)?$",
    ))
    .expect("version pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("malformed version {0:?}")]
    Malformed(String),

    #[error("numeric segment {0:?} is too large")]
    SegmentOverflow(String),
}

/// Comparable version derived from a tag
#[derive(Debug, Clone)]
pub struct ParsedVersion {
    /// Numeric segments, always at least major.minor.patch
    segments: Vec<u64>,
    /// Dot-separated pre-release identifiers, empty for a release
    pre: String,
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        compare_prerelease(&self.pre, &other.pre)
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParsedVersion {}

/// A release sorts above its pre-releases; identifiers compare left to right.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let mut a_parts = a.split('.');
    let mut b_parts = b.split('.');
    loop {
        match (a_parts.next(), b_parts.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match compare_identifier(x, y) {
                Ordering::Equal => continue,
                ord => return ord,
            },
        }
    }
}

/// Numeric identifiers compare by value and sort below alphanumeric ones.
fn compare_identifier(a: &str, b: &str) -> Ordering {
    let is_numeric = |s: &str| s.bytes().all(|c| c.is_ascii_digit());
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => {
            // compare digit strings without parsing so huge values cannot overflow
            let a = a.trim_start_matches('0');
            let b = b.trim_start_matches('0');
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// Relative position of two tags in descending (newest first) order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrder {
    /// First tag is newer and sorts first
    Before,
    /// First tag is older and sorts after
    After,
    /// Both tags denote the same version
    Equal,
    /// At least one tag is not a version
    Incomparable,
}

/// Remove every character outside `[0-9.]` when `lenient` is set.
pub fn normalize(tag: &str, lenient: bool) -> Cow<'_, str> {
    if !lenient {
        return Cow::Borrowed(tag);
    }
    if tag.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Cow::Borrowed(tag);
    }
    Cow::Owned(
        tag.chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect::<String>(),
    )
}

/// Parse a version string (already normalized) into a [`ParsedVersion`].
///
/// Examples:
/// - "1" -> 1.0.0
/// - "v1.2" -> 1.2.0
/// - "2.0.0rc1" -> 2.0.0-rc1
/// - "1.2.3-rc.1+linux" -> 1.2.3-rc.1
pub fn parse_version(version: &str) -> Result<ParsedVersion, VersionParseError> {
    let captures = VERSION_PATTERN
        .captures(version)
        .ok_or_else(|| VersionParseError::Malformed(version.to_string()))?;

    let mut segments = captures["core"]
        .split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| VersionParseError::SegmentOverflow(part.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if segments.len() < 3 {
        segments.resize(3, 0);
    }

    let pre = captures
        .name("numeric_pre")
        .or_else(|| captures.name("pre"))
        .map_or_else(String::new, |m| m.as_str().to_string());

    Ok(ParsedVersion { segments, pre })
}

/// Parse a release tag, applying lenient normalization first when requested.
pub fn parse_tag(tag: &str, lenient: bool) -> Result<ParsedVersion, VersionParseError> {
    parse_version(&normalize(tag, lenient))
}

/// Compare two tags for descending order.
///
/// Never fails: a tag that does not parse makes the pair
/// [`VersionOrder::Incomparable`].
pub fn compare(a: &str, b: &str, lenient: bool) -> VersionOrder {
    match (parse_tag(a, lenient), parse_tag(b, lenient)) {
        (Ok(a), Ok(b)) => match a.cmp(&b) {
            Ordering::Greater => VersionOrder::Before,
            Ordering::Less => VersionOrder::After,
            Ordering::Equal => VersionOrder::Equal,
        },
        _ => VersionOrder::Incomparable,
    }
}

/// Order releases newest first.
///
/// Releases whose tag does not parse are kept but placed after every
/// parseable release, in feed order. One warning is logged per such tag.
/// Equal versions keep their feed order.
pub fn rank_by_version<'a, I>(releases: I, lenient: bool) -> Vec<&'a Release>
where
    I: IntoIterator<Item = &'a Release>,
{
    let mut keyed: Vec<(Option<ParsedVersion>, &'a Release)> = releases
        .into_iter()
        .map(|release| match parse_tag(&release.tag, lenient) {
            Ok(parsed) => {
                trace!("Parsed tag {} as {}", release.tag, parsed);
                (Some(parsed), release)
            }
            Err(e) => {
                warn!(version = %release.tag, error = %e, "invalid version");
                (None, release)
            }
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, release)| release).collect()
}
