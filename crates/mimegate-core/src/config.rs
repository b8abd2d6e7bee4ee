//! Gatekeeper configuration

use crate::media_type::{DEFAULT_ARCHIVE_CANONICAL_TYPE, ScanMode};
use crate::normalize::Normalizer;
use crate::policy::PolicyConfig;
use crate::registry::{FileTypeEntry, FileTypeRegistry};
use rust_i18n::t;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod builder;
mod validation;


pub use builder::GatekeeperConfigBuilder;

/// Default number of leading bytes read for sniffing.
pub const DEFAULT_MAX_SNIFF_BYTES: usize = 8192;

/// Default cap on files per batch scan.
pub const DEFAULT_MAX_FILES: usize = 10_000;

/// File name looked up by [`GatekeeperConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "mimegate.toml";

/// How media types are detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[schemars(description = "Media type detection strategy")]
pub enum DetectionStrategy {
    /// Inspect file content (magic bytes and text heuristics).
    #[default]
    Content,
    /// Guess from the filename extension. Degraded; use only when content
    /// inspection is unavailable.
    Extension,
}

/// Extra normalization alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AliasConfig {
    /// Detected media types to remap
    pub from: Vec<String>,
    /// Media type to report instead
    pub to: String,
}

/// Normalization of detected types before the policy sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Treat empty files named `*.log` as `text/plain`
    #[schemars(description = "Treat empty files named *.log as text/plain")]
    pub empty_log_as_text: bool,

    /// Treat gzip content as `archive_canonical_type`
    #[schemars(description = "Treat gzip content (application/gzip, application/x-gzip) as archive_canonical_type")]
    pub gzip_as_archive: bool,

    /// Additional remappings, applied after the built-in rules in order
    #[schemars(description = "Additional remappings applied after the built-in rules")]
    pub aliases: Vec<AliasConfig>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            empty_log_as_text: true,
            gzip_as_archive: true,
            aliases: Vec::new(),
        }
    }
}

/// Host customizations of the built-in file type table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FileTypesConfig {
    /// Extensions to add, or to remap if already known
    #[schemars(description = "Extensions to add, or to remap if already known")]
    pub add: Vec<FileTypeEntry>,

    /// Extensions to remove from the table
    #[schemars(description = "Extensions to remove from the table")]
    pub remove: Vec<String>,
}

/// Gatekeeper configuration, usually loaded from `mimegate.toml`.
///
/// `scanmode` and `mimetypes` keep their raw string form so that an
/// unrecognized mode can be reported and reproduced faithfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Policy mode: "allow" or "deny"
    #[schemars(description = "Policy mode: \"allow\" accepts only the listed types, \"deny\" rejects them. Any other value blocks every file.")]
    pub scanmode: Option<String>,

    /// Semicolon-separated media types, e.g. "text/xml;image/png;application/pdf"
    #[schemars(description = "Semicolon-separated media types, e.g. \"text/xml;image/png;application/pdf\". Empty disables the filter.")]
    pub mimetypes: String,

    /// Media type that gzip content is normalized to
    #[schemars(description = "Media type that gzip content is normalized to")]
    pub archive_canonical_type: String,

    /// Detection strategy
    pub detection: DetectionStrategy,

    /// Number of leading bytes read for sniffing
    #[schemars(description = "Number of leading bytes read for sniffing")]
    pub max_sniff_bytes: usize,

    /// Remove rejected files from disk
    #[schemars(description = "Remove files rejected by the policy from disk")]
    pub delete_rejected: bool,

    /// Glob patterns excluded from directory scans
    #[schemars(description = "Glob patterns excluded from directory scans")]
    pub exclude: Vec<String>,

    /// Maximum number of files in one batch scan (None for no limit)
    #[schemars(description = "Maximum number of files in one batch scan")]
    pub max_files: Option<usize>,

    /// Locale for user-facing messages (e.g., "en", "es", "zh-CN")
    #[schemars(description = "Locale for user-facing messages (e.g., \"en\", \"es\", \"zh-CN\")")]
    pub locale: Option<String>,

    pub normalize: NormalizeConfig,

    pub filetypes: FileTypesConfig,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            scanmode: None,
            mimetypes: String::new(),
            archive_canonical_type: DEFAULT_ARCHIVE_CANONICAL_TYPE.to_string(),
            detection: DetectionStrategy::default(),
            max_sniff_bytes: DEFAULT_MAX_SNIFF_BYTES,
            delete_rejected: false,
            exclude: Vec::new(),
            max_files: Some(DEFAULT_MAX_FILES),
            locale: None,
            normalize: NormalizeConfig::default(),
            filetypes: FileTypesConfig::default(),
        }
    }
}

/// Errors that can occur when building a `GatekeeperConfig`.
///
/// These are hard errors (not warnings) that indicate the configuration
/// cannot be used as-is. For soft issues, see [`ConfigWarning`].
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A glob pattern in the configuration is syntactically invalid.
    InvalidGlobPattern {
        /// The invalid glob pattern string.
        pattern: String,
        /// Description of the parse error.
        error: String,
    },
    /// Validation produced warnings that were promoted to errors.
    ValidationFailed(Vec<ConfigWarning>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidGlobPattern { pattern, error } => {
                write!(f, "invalid glob pattern '{}': {}", pattern, error)
            }
            ConfigError::ValidationFailed(warnings) => {
                write!(
                    f,
                    "configuration validation failed with {} warning(s)",
                    warnings.len()
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A soft configuration issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigWarning {
    /// The field that has the issue (e.g., "mimetypes")
    pub field: String,
    /// Description of the issue
    pub message: String,
    /// Optional suggestion for how to fix the issue
    pub suggestion: Option<String>,
}

impl GatekeeperConfig {
    /// Create a [`GatekeeperConfigBuilder`].
    pub fn builder() -> GatekeeperConfigBuilder {
        GatekeeperConfigBuilder::new()
    }

    /// Load config from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config or use default, returning any load warning
    ///
    /// If a config path is provided but the file cannot be loaded or parsed,
    /// returns the default config with a warning message describing the
    /// error. The default config has no media types and therefore accepts
    /// every file, so callers should surface the warning.
    pub fn load_or_default(path: Option<&PathBuf>) -> (Self, Option<String>) {
        match path {
            Some(p) => match Self::load(p) {
                Ok(config) => (config, None),
                Err(e) => {
                    let warning = t!(
                        "core.config.load_warning",
                        path = p.display().to_string(),
                        error = e.to_string()
                    );
                    (Self::default(), Some(warning.to_string()))
                }
            },
            None => (Self::default(), None),
        }
    }

    /// Find a config file: `./mimegate.toml` first, then
    /// `<config dir>/mimegate/config.toml`.
    #[cfg(feature = "filesystem")]
    pub fn discover(start: &Path) -> Option<PathBuf> {
        let local = start.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("mimegate").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// The parsed scan mode, or `None` when unset or unrecognized.
    pub fn scan_mode(&self) -> Option<ScanMode> {
        self.scanmode.as_deref().and_then(ScanMode::parse)
    }

    /// The policy described by `scanmode` and `mimetypes`.
    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig::from_settings(self.scanmode.as_deref(), &self.mimetypes)
    }

    /// Whether any media types are configured.
    pub fn is_configured(&self) -> bool {
        self.policy().is_configured()
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::from_config(&self.normalize, &self.archive_canonical_type)
    }

    /// The built-in file type table with `[filetypes]` customizations
    /// applied: removals first, then additions.
    pub fn registry(&self) -> FileTypeRegistry {
        let mut registry = FileTypeRegistry::builtin();
        for ext in &self.filetypes.remove {
            registry.remove(ext);
        }
        for entry in &self.filetypes.add {
            registry.insert(entry.clone());
        }
        registry
    }
}

/// Generate a JSON Schema for the GatekeeperConfig type.
///
/// Used to provide editor autocompletion and validation for
/// `mimegate.toml` files.
pub fn generate_schema() -> schemars::Schema {
    schemars::schema_for!(GatekeeperConfig)
}
