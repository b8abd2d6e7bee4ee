//! Normalization of detected media types before policy evaluation.
//!
//! Generic sniffers classify some uploads differently from the host's own
//! type list. Compressed course backups come out as gzip, and the empty log
//! placeholder that backup exports include comes out as an empty inode.
//! These remappings are policy-adjacent heuristics, not sniffing behavior,
//! so they live here as an overridable rule list.

use crate::config::NormalizeConfig;
use crate::media_type::{EMPTY_MEDIA_TYPE, MediaType};
use crate::sniff::filename_extension;

/// Gzip labels reported by different sniffers for the same content.
pub const GZIP_MEDIA_TYPES: &[&str] = &["application/x-gzip", "application/gzip"];

/// A single remapping rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizationRule {
    /// Remap `from` to `to` when the filename extension is exactly
    /// `extension` (case-sensitive).
    ByExtension {
        from: MediaType,
        extension: String,
        to: MediaType,
    },
    /// Remap any of `from` to `to`.
    Alias { from: Vec<MediaType>, to: MediaType },
}

impl NormalizationRule {
    /// Empty files named `*.log` are plain text.
    pub fn empty_log_as_text() -> Self {
        NormalizationRule::ByExtension {
            from: MediaType::from(EMPTY_MEDIA_TYPE),
            extension: "log".to_string(),
            to: MediaType::from("text/plain"),
        }
    }

    /// Gzip content is the host's backup archive type.
    pub fn gzip_as_archive(archive_canonical_type: impl Into<MediaType>) -> Self {
        NormalizationRule::Alias {
            from: GZIP_MEDIA_TYPES.iter().map(|t| MediaType::from(*t)).collect(),
            to: archive_canonical_type.into(),
        }
    }

    fn apply(&self, detected: &MediaType, filename: &str) -> Option<MediaType> {
        match self {
            NormalizationRule::ByExtension {
                from,
                extension,
                to,
            } => (detected == from && filename_extension(filename) == Some(extension.as_str()))
                .then(|| to.clone()),
            NormalizationRule::Alias { from, to } => {
                from.contains(detected).then(|| to.clone())
            }
        }
    }
}

/// Ordered list of [`NormalizationRule`]s.
///
/// Rules are applied in order, each to the output of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizer {
    rules: Vec<NormalizationRule>,
}

impl Normalizer {
    /// A normalizer with no rules; detection results pass through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// The two standard rules: empty `.log` files become `text/plain`, gzip
    /// content becomes `archive_canonical_type`.
    pub fn standard(archive_canonical_type: impl Into<MediaType>) -> Self {
        Self::new()
            .with_rule(NormalizationRule::empty_log_as_text())
            .with_rule(NormalizationRule::gzip_as_archive(archive_canonical_type))
    }

    /// Build the rule list described by configuration.
    ///
    /// The standard rules come first (each can be switched off), followed by
    /// the configured aliases in order.
    pub fn from_config(config: &NormalizeConfig, archive_canonical_type: &str) -> Self {
        let mut normalizer = Self::new();
        if config.empty_log_as_text {
            normalizer = normalizer.with_rule(NormalizationRule::empty_log_as_text());
        }
        if config.gzip_as_archive {
            normalizer =
                normalizer.with_rule(NormalizationRule::gzip_as_archive(archive_canonical_type));
        }
        for alias in &config.aliases {
            normalizer = normalizer.with_rule(NormalizationRule::Alias {
                from: alias.from.iter().map(|t| MediaType::from(t.as_str())).collect(),
                to: MediaType::from(alias.to.as_str()),
            });
        }
        normalizer
    }

    pub fn with_rule(mut self, rule: NormalizationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[NormalizationRule] {
        &self.rules
    }

    /// Apply every rule in order to `detected`.
    pub fn normalize(&self, detected: &MediaType, filename: &str) -> MediaType {
        self.rules
            .iter()
            .fold(detected.clone(), |current, rule| {
                rule.apply(&current, filename).unwrap_or(current)
            })
    }
}
