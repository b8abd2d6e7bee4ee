//! Content sniffing: determining a file's media type from its bytes.
//!
//! This module provides:
//!
//! - [`Sniffer`] -- trait for detection strategies
//! - [`ContentSniffer`] -- magic-byte detection with text heuristics (primary)
//! - [`ExtensionSniffer`] -- filename-based guess (degraded fallback)
//! - [`SnifferChain`] -- chain-of-responsibility dispatcher
//!
//! ## Extending detection
//!
//! Implement [`Sniffer`] and register it via
//! [`SnifferChain::content().prepend(your_sniffer)`](SnifferChain::prepend)
//! to recognise formats the built-in sniffer does not know.

mod chain;
mod content;
mod extension;

pub use chain::{SniffResult, Sniffer, SnifferChain};
pub use content::ContentSniffer;
pub use extension::ExtensionSniffer;

/// Extension of a filename hint, without the dot.
///
/// Only the final path segment is considered and the text after its last
/// dot is returned, so `backup.tar.gz` yields `gz` and `.log` yields `log`.
pub fn filename_extension(filename: &str) -> Option<&str> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    base.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}
