//! Allow-list / deny-list policy evaluation.

use serde::{Deserialize, Serialize};

use crate::media_type::{MediaType, ScanMode, parse_media_type_list};

/// Immutable policy: a mode and the media types it applies to.
///
/// `configured_types` keeps configuration order and duplicates, since the
/// rejection message lists extensions per configured entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    mode: Option<ScanMode>,
    configured_types: Vec<MediaType>,
}

impl PolicyConfig {
    pub fn new(mode: Option<ScanMode>, configured_types: Vec<MediaType>) -> Self {
        Self {
            mode,
            configured_types,
        }
    }

    /// Build a policy from the raw `scanmode` and `mimetypes` settings.
    ///
    /// An unrecognized or missing scan mode is kept as `None`.
    pub fn from_settings(scanmode: Option<&str>, mimetypes: &str) -> Self {
        Self {
            mode: scanmode.and_then(ScanMode::parse),
            configured_types: parse_media_type_list(mimetypes),
        }
    }

    pub fn allow(types: &str) -> Self {
        Self::from_settings(Some("allow"), types)
    }

    pub fn deny(types: &str) -> Self {
        Self::from_settings(Some("deny"), types)
    }

    pub fn mode(&self) -> Option<ScanMode> {
        self.mode
    }

    pub fn configured_types(&self) -> &[MediaType] {
        &self.configured_types
    }

    /// A policy with no media types never rejects anything.
    pub fn is_configured(&self) -> bool {
        !self.configured_types.is_empty()
    }

    pub fn is_listed(&self, media_type: &MediaType) -> bool {
        self.configured_types.contains(media_type)
    }
}

/// Why a file was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Allow mode and the type is not listed.
    NotAllowed,
    /// Deny mode and the type is listed.
    Denied,
    /// The scan mode is missing or unrecognized, so every file is blocked.
    Misconfigured,
}

impl RejectReason {
    /// The mode that produced this rejection, if any.
    pub fn mode(self) -> Option<ScanMode> {
        match self {
            RejectReason::NotAllowed => Some(ScanMode::Allow),
            RejectReason::Denied => Some(ScanMode::Deny),
            RejectReason::Misconfigured => None,
        }
    }

    /// Policy violations (as opposed to a broken configuration).
    pub fn is_policy_violation(self) -> bool {
        !matches!(self, RejectReason::Misconfigured)
    }
}

/// Result of evaluating one detected type against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Decide whether `detected` passes `config`.
///
/// - no configured types: accept, whatever the mode
/// - configured types but no valid mode: reject as misconfigured
/// - otherwise accept iff `is_listed == (mode == Allow)`
pub fn evaluate(detected: &MediaType, config: &PolicyConfig) -> Verdict {
    if !config.is_configured() {
        return Verdict::Accept;
    }
    let Some(mode) = config.mode() else {
        return Verdict::Reject(RejectReason::Misconfigured);
    };

    let is_listed = config.is_listed(detected);
    if is_listed == (mode == ScanMode::Allow) {
        return Verdict::Accept;
    }
    match mode {
        ScanMode::Allow => Verdict::Reject(RejectReason::NotAllowed),
        ScanMode::Deny => Verdict::Reject(RejectReason::Denied),
    }
}
