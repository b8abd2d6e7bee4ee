//! Error types for scanning and file access

use std::path::PathBuf;
use thiserror::Error;

pub type ScanResult<T> = Result<T, ScanError>;

/// Gatekeeper errors
///
/// Policy decisions are never errors; they are returned as
/// [`ScanOutcome`](crate::ScanOutcome) values. These variants cover the
/// operational failures around a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("File is not readable: {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a regular file: {path}")]
    NotRegularFile { path: PathBuf },

    #[error("Failed to remove rejected file: {path}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid exclude pattern: {pattern} ({message})")]
    InvalidExcludePattern { pattern: String, message: String },

    #[error("Too many files to scan: {count} files found, limit is {limit}")]
    TooManyFiles { count: usize, limit: usize },
}

impl ScanError {
    /// Returns `true` for errors that mean the file content could not be
    /// inspected. The gatekeeper blocks such files.
    pub fn is_unreadable(&self) -> bool {
        matches!(
            self,
            ScanError::Unreadable { .. } | ScanError::NotRegularFile { .. }
        )
    }
}
