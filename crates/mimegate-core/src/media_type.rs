//! Media type values and scan mode parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Media type assigned to zero-length content.
pub const EMPTY_MEDIA_TYPE: &str = "inode/x-empty";

/// Media type assigned to content that no sniffer could classify.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Default canonical type for gzip-compressed course backup archives.
pub const DEFAULT_ARCHIVE_CANONICAL_TYPE: &str = "application/vnd.moodle.backup";

/// RFC 6838 restricted-name tokens for `type/subtype`.
static MEDIA_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]{0,126}/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]{0,126}$")
        .expect("media type pattern is valid")
});

/// A content classification string such as `image/png`.
///
/// Media types are compared as plain strings. Case is preserved exactly as
/// the sniffer or configuration produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaType(String);

impl MediaType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if the value has the `type/subtype` token shape.
    ///
    /// Only used to warn about suspicious configuration; a malformed type is
    /// still matched literally.
    pub fn is_well_formed(&self) -> bool {
        MEDIA_TYPE_RE.is_match(&self.0)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MediaType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for MediaType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for MediaType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MediaType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Policy mode selecting how the configured media types are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Only the listed media types are accepted.
    Allow,
    /// The listed media types are rejected, everything else is accepted.
    Deny,
}

impl ScanMode {
    /// Parse a raw `scanmode` setting.
    ///
    /// Only the exact strings `allow` and `deny` are recognized. Anything
    /// else, including different case or surrounding whitespace, yields
    /// `None`, which the policy treats as misconfigured.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "allow" => Some(ScanMode::Allow),
            "deny" => Some(ScanMode::Deny),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScanMode::Allow => "allow",
            ScanMode::Deny => "deny",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a semicolon-delimited media type list.
///
/// The whole string and every entry are trimmed, empty entries are dropped,
/// and order and duplicates are kept.
pub fn parse_media_type_list(raw: &str) -> Vec<MediaType> {
    raw.trim()
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(MediaType::from)
        .collect()
}
