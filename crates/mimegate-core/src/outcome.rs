//! Scan outcomes and user-facing rejection messages.

use rust_i18n::t;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::extensions::join_extensions;
use crate::media_type::{MediaType, ScanMode};
use crate::policy::RejectReason;

/// What the sniffing stage found for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Media type as reported by the sniffer.
    pub raw: MediaType,
    /// Media type after normalization; this is what the policy sees.
    pub normalized: MediaType,
    /// Name of the sniffer that classified the content.
    pub sniffer: String,
    /// Set when the classification came from a degraded sniffer.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

/// A blocked file, with the data needed to explain it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: RejectReason,
    /// Normalized media type of the file. Absent for misconfigured scans,
    /// which block before sniffing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected: Option<MediaType>,
    /// Extensions of the configured types, in configured order.
    pub extensions: Vec<String>,
}

impl Rejection {
    pub fn mode(&self) -> Option<ScanMode> {
        self.reason.mode()
    }

    /// Extensions joined for display.
    pub fn extension_list(&self) -> String {
        join_extensions(&self.extensions)
    }

    /// Render the message shown to the uploader, in the current locale.
    pub fn message(&self) -> String {
        let types = self.extension_list();
        match self.reason {
            RejectReason::NotAllowed => t!("core.scan.rejected_allow", types = types).to_string(),
            RejectReason::Denied => t!("core.scan.rejected_deny", types = types).to_string(),
            RejectReason::Misconfigured => t!("core.scan.misconfigured").to_string(),
        }
    }

    /// Render the message in a specific locale, e.g. the uploader's own.
    ///
    /// Unknown locales fall back to English.
    pub fn message_in(&self, locale: &str) -> String {
        let types = self.extension_list();
        match self.reason {
            RejectReason::NotAllowed => {
                t!("core.scan.rejected_allow", locale = locale, types = types).to_string()
            }
            RejectReason::Denied => {
                t!("core.scan.rejected_deny", locale = locale, types = types).to_string()
            }
            RejectReason::Misconfigured => t!("core.scan.misconfigured", locale = locale).to_string(),
        }
    }
}

/// Why a scan could not reach a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconclusive {
    /// The file could not be opened or read.
    Unreadable { path: PathBuf, error: String },
}

impl Inconclusive {
    pub fn message(&self) -> String {
        match self {
            Inconclusive::Unreadable { path, .. } => {
                t!("core.scan.unreadable", path = path.display().to_string()).to_string()
            }
        }
    }
}

/// Result of scanning one file.
///
/// `Rejected` and `Inconclusive` both block the upload; only `Rejected`
/// carries an actionable message for the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "details", rename_all = "snake_case")]
pub enum ScanOutcome {
    Ok,
    Rejected(Rejection),
    Inconclusive(Inconclusive),
}

impl ScanOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ScanOutcome::Ok)
    }

    /// Fail-closed view: anything but `Ok` blocks the upload.
    pub fn is_blocked(&self) -> bool {
        !self.is_ok()
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ScanOutcome::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Message for the uploader, if the file was blocked.
    pub fn message(&self) -> Option<String> {
        match self {
            ScanOutcome::Ok => None,
            ScanOutcome::Rejected(rejection) => Some(rejection.message()),
            ScanOutcome::Inconclusive(inconclusive) => Some(inconclusive.message()),
        }
    }

    /// Short status label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Ok => "ok",
            ScanOutcome::Rejected(_) => "rejected",
            ScanOutcome::Inconclusive(_) => "inconclusive",
        }
    }
}
