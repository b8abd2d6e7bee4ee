use super::*;

/// Builder for constructing a [`GatekeeperConfig`] with validation.
///
/// Setters return `&mut Self`; the terminal `build()` validates and returns
/// `Result<GatekeeperConfig, ConfigError>`.
///
/// **Note:** `build()` and `build_unchecked()` drain the builder's state.
/// A second call will produce a default config.
///
/// # Examples
///
/// ```rust
/// use mimegate_core::config::GatekeeperConfig;
///
/// let config = GatekeeperConfig::builder()
///     .scanmode("allow")
///     .mimetypes("text/xml;image/png")
///     .build()
///     .expect("valid config");
/// assert!(config.is_configured());
/// ```
#[derive(Debug, Default)]
pub struct GatekeeperConfigBuilder {
    scanmode: Option<Option<String>>,
    mimetypes: Option<String>,
    archive_canonical_type: Option<String>,
    detection: Option<DetectionStrategy>,
    max_sniff_bytes: Option<usize>,
    delete_rejected: Option<bool>,
    exclude: Option<Vec<String>>,
    max_files: Option<Option<usize>>,
    locale: Option<Option<String>>,
    normalize: Option<NormalizeConfig>,
    filetypes: Option<FileTypesConfig>,
}

impl GatekeeperConfigBuilder {
    /// Prefer [`GatekeeperConfig::builder()`] over calling this directly.
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Set the raw scan mode ("allow" or "deny").
    pub fn scanmode(&mut self, scanmode: impl Into<String>) -> &mut Self {
        self.scanmode = Some(Some(scanmode.into()));
        self
    }

    /// Clear the scan mode.
    pub fn no_scanmode(&mut self) -> &mut Self {
        self.scanmode = Some(None);
        self
    }

    /// Set the semicolon-separated media type list.
    pub fn mimetypes(&mut self, mimetypes: impl Into<String>) -> &mut Self {
        self.mimetypes = Some(mimetypes.into());
        self
    }

    pub fn archive_canonical_type(&mut self, media_type: impl Into<String>) -> &mut Self {
        self.archive_canonical_type = Some(media_type.into());
        self
    }

    pub fn detection(&mut self, detection: DetectionStrategy) -> &mut Self {
        self.detection = Some(detection);
        self
    }

    pub fn max_sniff_bytes(&mut self, limit: usize) -> &mut Self {
        self.max_sniff_bytes = Some(limit);
        self
    }

    pub fn delete_rejected(&mut self, delete: bool) -> &mut Self {
        self.delete_rejected = Some(delete);
        self
    }

    /// Set the exclude glob patterns.
    pub fn exclude(&mut self, exclude: Vec<String>) -> &mut Self {
        self.exclude = Some(exclude);
        self
    }

    /// Set the batch file cap (None disables the limit).
    pub fn max_files(&mut self, max: Option<usize>) -> &mut Self {
        self.max_files = Some(max);
        self
    }

    pub fn locale(&mut self, locale: Option<String>) -> &mut Self {
        self.locale = Some(locale);
        self
    }

    pub fn normalize(&mut self, normalize: NormalizeConfig) -> &mut Self {
        self.normalize = Some(normalize);
        self
    }

    pub fn filetypes(&mut self, filetypes: FileTypesConfig) -> &mut Self {
        self.filetypes = Some(filetypes);
        self
    }

    /// Build the `GatekeeperConfig`, validating exclude patterns and
    /// promoting any validation warnings to [`ConfigError::ValidationFailed`].
    pub fn build(&mut self) -> Result<GatekeeperConfig, ConfigError> {
        let config = self.build_inner();
        config.check()?;
        Ok(config)
    }

    /// Build the `GatekeeperConfig` without running any validation.
    ///
    /// Needed to construct the misconfigured states (unknown or missing
    /// scan mode) that the gatekeeper must still handle.
    pub fn build_unchecked(&mut self) -> GatekeeperConfig {
        self.build_inner()
    }

    fn build_inner(&mut self) -> GatekeeperConfig {
        let defaults = GatekeeperConfig::default();

        GatekeeperConfig {
            scanmode: self.scanmode.take().unwrap_or(defaults.scanmode),
            mimetypes: self.mimetypes.take().unwrap_or(defaults.mimetypes),
            archive_canonical_type: self
                .archive_canonical_type
                .take()
                .unwrap_or(defaults.archive_canonical_type),
            detection: self.detection.take().unwrap_or(defaults.detection),
            max_sniff_bytes: self
                .max_sniff_bytes
                .take()
                .unwrap_or(defaults.max_sniff_bytes),
            delete_rejected: self
                .delete_rejected
                .take()
                .unwrap_or(defaults.delete_rejected),
            exclude: self.exclude.take().unwrap_or(defaults.exclude),
            max_files: self.max_files.take().unwrap_or(defaults.max_files),
            locale: self.locale.take().unwrap_or(defaults.locale),
            normalize: self.normalize.take().unwrap_or(defaults.normalize),
            filetypes: self.filetypes.take().unwrap_or(defaults.filetypes),
        }
    }
}
