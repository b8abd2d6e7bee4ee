//! Locale detection and initialization for the mimegate CLI.
//!
//! Locale resolution order:
//! 1. `--locale` CLI flag (highest priority)
//! 2. `locale` from the config file
//! 3. `MIMEGATE_LOCALE` environment variable
//! 4. `LC_ALL` / `LANG` environment variables
//! 5. System locale detection via `sys-locale`
//! 6. Fallback to "en"

use mimegate_core::i18n::{DEFAULT_LOCALE, normalize_locale, resolve_locale};
use rust_i18n::{set_locale, t};

/// Select and activate the message locale. Returns the chosen locale.
pub fn init(cli_locale: Option<&str>, config_locale: Option<&str>) -> &'static str {
    let explicit = cli_locale.or(config_locale);
    let locale = match explicit {
        Some(requested) => normalize_locale(requested).unwrap_or_else(|| {
            eprintln!("{}", t!("cli.locale.unsupported", requested = requested));
            DEFAULT_LOCALE
        }),
        None => detect_locale(),
    };
    set_locale(locale);
    locale
}

/// Detect the best locale from the environment.
pub fn detect_locale() -> &'static str {
    let env = |name: &str| std::env::var(name).ok();
    let system = sys_locale::get_locale();
    resolve_locale([
        env("MIMEGATE_LOCALE").as_deref(),
        env("LC_ALL").as_deref(),
        env("LANG").as_deref(),
        system.as_deref(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_locale_is_supported() {
        let locale = detect_locale();
        assert!(mimegate_core::i18n::is_supported(locale));
    }
}
