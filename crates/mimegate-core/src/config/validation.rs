use super::*;
use crate::media_type::MediaType;

impl GatekeeperConfig {
    /// Check exclude patterns, then promote any validation warnings to
    /// [`ConfigError::ValidationFailed`].
    pub fn check(&self) -> Result<(), ConfigError> {
        for pattern in &self.exclude {
            let normalized = pattern.replace('\\', "/");
            if let Err(e) = glob::Pattern::new(&normalized) {
                return Err(ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    error: format!("{} (in exclude)", e),
                });
            }
        }

        let warnings = self.validate();
        if !warnings.is_empty() {
            return Err(ConfigError::ValidationFailed(warnings));
        }
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    ///
    /// This performs semantic validation beyond what TOML parsing can check:
    /// - the scan mode is recognized whenever media types are configured
    /// - every configured media type is well formed
    /// - sniffing settings can produce a meaningful result
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let policy = self.policy();

        if policy.is_configured() {
            match self.scanmode.as_deref() {
                None => warnings.push(ConfigWarning {
                    field: "scanmode".to_string(),
                    message: t!("core.config.missing_scanmode").to_string(),
                    suggestion: Some(t!("core.config.unknown_scanmode_suggestion").to_string()),
                }),
                Some(raw) if policy.mode().is_none() => warnings.push(ConfigWarning {
                    field: "scanmode".to_string(),
                    message: t!("core.config.unknown_scanmode", value = raw).to_string(),
                    suggestion: Some(t!("core.config.unknown_scanmode_suggestion").to_string()),
                }),
                Some(_) => {}
            }
        }

        let invalid: Vec<&str> = policy
            .configured_types()
            .iter()
            .filter(|t| !t.is_well_formed())
            .map(MediaType::as_str)
            .collect();
        if !invalid.is_empty() {
            warnings.push(ConfigWarning {
                field: "mimetypes".to_string(),
                message: t!("core.config.invalid_types", types = invalid.join(", ")).to_string(),
                suggestion: Some(t!("core.config.invalid_types_suggestion").to_string()),
            });
        }

        if self.normalize.gzip_as_archive && self.archive_canonical_type.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "archive_canonical_type".to_string(),
                message: t!("core.config.empty_archive_type").to_string(),
                suggestion: None,
            });
        }

        if self.max_sniff_bytes == 0 {
            warnings.push(ConfigWarning {
                field: "max_sniff_bytes".to_string(),
                message: t!("core.config.zero_sniff_bytes").to_string(),
                suggestion: None,
            });
        }

        warnings
    }
}
