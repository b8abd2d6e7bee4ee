//! # mimegate-core
//!
//! Content-sniffing file type gatekeeper for uploads.
//!
//! A [`Gatekeeper`] decides whether an uploaded file may be kept:
//! - sniffs the media type from the file's leading bytes ([`SnifferChain`])
//! - normalizes host-specific labels ([`Normalizer`])
//! - applies an allow-list or deny-list policy ([`evaluate`])
//! - explains rejections with the extensions of the configured types
//!   ([`Rejection::message`])
//!
//! ```
//! use mimegate_core::{Gatekeeper, GatekeeperConfig, Scanner};
//!
//! let config = GatekeeperConfig::builder()
//!     .scanmode("deny")
//!     .mimetypes("application/pdf")
//!     .build()
//!     .unwrap();
//! let gatekeeper = Gatekeeper::new(config);
//!
//! assert!(gatekeeper.scan_bytes(b"%PDF-1.4\n", "cv.pdf").is_blocked());
//! assert!(gatekeeper.scan_bytes(b"hello\n", "notes.txt").is_ok());
//! ```

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod error;
pub mod extensions;
pub mod fs;
pub mod i18n;
pub mod media_type;
pub mod normalize;
pub mod outcome;
#[cfg(feature = "filesystem")]
pub mod pipeline;
pub mod policy;
pub mod registry;
pub mod scanner;
pub mod sniff;

pub use config::{
    ConfigError, ConfigWarning, DetectionStrategy, GatekeeperConfig, generate_schema,
};
pub use error::{ScanError, ScanResult};
pub use extensions::{extensions_for, join_extensions};
pub use fs::{FileSystem, RealFileSystem};
pub use media_type::{MediaType, ScanMode, parse_media_type_list};
pub use normalize::{NormalizationRule, Normalizer};
pub use outcome::{Detection, Inconclusive, Rejection, ScanOutcome};
#[cfg(feature = "filesystem")]
pub use pipeline::{FileReport, ScanOptions, ScanReport, scan_paths};
pub use policy::{PolicyConfig, RejectReason, Verdict, evaluate};
pub use registry::{FileTypeEntry, FileTypeRegistry, TypeExtensionRegistry};
pub use scanner::{Gatekeeper, GatekeeperBuilder, Scanner};
pub use sniff::{ContentSniffer, ExtensionSniffer, SniffResult, Sniffer, SnifferChain};
