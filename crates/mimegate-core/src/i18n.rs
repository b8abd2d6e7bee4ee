//! Locale selection for user-facing messages.

/// Locales with message catalogs under `locales/`.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "es", "zh-CN"];

/// Locale used when nothing better is available.
pub const DEFAULT_LOCALE: &str = "en";

/// Map a locale tag onto a supported locale.
///
/// Encoding suffixes and region subtags are ignored, so `es_MX.UTF-8` maps
/// to `es`. Simplified Chinese variants (`zh_CN`, `zh-Hans`, `zh-SG`) map to
/// `zh-CN`. Returns `None` for languages without a catalog.
pub fn normalize_locale(locale: &str) -> Option<&'static str> {
    let tag = locale.trim();
    let tag = tag.split(['.', '@']).next().unwrap_or(tag);
    let lower = tag.to_ascii_lowercase();

    if lower.starts_with("zh") {
        let simplified = ["cn", "hans", "sg"]
            .iter()
            .any(|marker| lower.contains(marker));
        return (simplified || lower == "zh").then_some("zh-CN");
    }

    let lang = lower.split(['_', '-']).next().unwrap_or(lower.as_str());
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|code| code.eq_ignore_ascii_case(lang))
}

/// Check if a locale code is supported as-is.
pub fn is_supported(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// Pick the first candidate that maps to a supported locale.
///
/// Candidates are tried in priority order (for example: command line,
/// config file, environment, OS). Falls back to [`DEFAULT_LOCALE`].
pub fn resolve_locale<'a, I>(candidates: I) -> &'static str
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find_map(normalize_locale)
        .unwrap_or(DEFAULT_LOCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_regional_tags() {
        assert_eq!(normalize_locale("en"), Some("en"));
        assert_eq!(normalize_locale("en_GB.UTF-8"), Some("en"));
        assert_eq!(normalize_locale(" es-MX "), Some("es"));
        assert_eq!(normalize_locale("ES"), Some("es"));
        assert_eq!(normalize_locale("es_ES@euro"), Some("es"));
    }

    #[test]
    fn test_normalize_chinese_variants() {
        assert_eq!(normalize_locale("zh_CN.UTF-8"), Some("zh-CN"));
        assert_eq!(normalize_locale("zh-Hans"), Some("zh-CN"));
        assert_eq!(normalize_locale("zh-SG"), Some("zh-CN"));
        assert_eq!(normalize_locale("zh"), Some("zh-CN"));
        assert_eq!(normalize_locale("zh_TW"), None);
    }

    #[test]
    fn test_normalize_unsupported() {
        assert_eq!(normalize_locale("fr_FR"), None);
        assert_eq!(normalize_locale(""), None);
        assert_eq!(normalize_locale("C"), None);
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported("zh-CN"));
        assert!(!is_supported("zh_CN"));
        assert!(!is_supported("de"));
    }

    #[test]
    fn test_resolve_locale_priority() {
        assert_eq!(resolve_locale([None, Some("es"), Some("en")]), "es");
        assert_eq!(resolve_locale([Some("fr"), None, Some("zh_CN")]), "zh-CN");
        assert_eq!(resolve_locale([Some("de"), None]), DEFAULT_LOCALE);
        assert_eq!(resolve_locale(std::iter::empty::<Option<&str>>()), "en");
    }
}
