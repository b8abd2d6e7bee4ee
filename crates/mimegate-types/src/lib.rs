//! Built-in file type table for mimegate.
//!
//! This crate provides the default extension to media type mapping used by
//! mimegate to tell users which file extensions a policy permits or forbids.
//! The table mirrors the file type list that learning platforms ship for
//! their upload widgets, including the platform-specific backup archive
//! type (`application/vnd.moodle.backup`).
//!
//! # Usage
//!
//! ```
//! use mimegate_types::FILETYPES_DATA;
//!
//! // FILETYPES_DATA is a static array of (extension, media_type) tuples
//! for (ext, media_type) in FILETYPES_DATA {
//!     println!("{}: {}", ext, media_type);
//! }
//! ```

// Include the auto-generated file type data from build.rs
include!(concat!(env!("OUT_DIR"), "/filetypes_data.rs"));

/// Returns the total number of built-in file types.
pub fn filetype_count() -> usize {
    FILETYPES_DATA.len()
}

/// Looks up the media type registered for an extension.
///
/// The extension is matched without a leading dot and case-sensitively,
/// the same way the table stores it.
pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    FILETYPES_DATA
        .iter()
        .find(|(extension, _)| *extension == ext)
        .map(|(_, media_type)| *media_type)
}

/// Returns every extension mapped to exactly `media_type`, in table order.
pub fn extensions_for_media_type(media_type: &str) -> Vec<&'static str> {
    FILETYPES_DATA
        .iter()
        .filter(|(_, ty)| *ty == media_type)
        .map(|(extension, _)| *extension)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filetypes_data_not_empty() {
        assert!(!FILETYPES_DATA.is_empty(), "FILETYPES_DATA should not be empty");
    }

    #[test]
    fn test_filetype_count() {
        assert_eq!(filetype_count(), FILETYPES_DATA.len());
    }

    #[test]
    fn test_media_type_for_extension_exists() {
        assert_eq!(media_type_for_extension("png"), Some("image/png"));
        assert_eq!(
            media_type_for_extension("mbz"),
            Some("application/vnd.moodle.backup")
        );
    }

    #[test]
    fn test_media_type_for_extension_not_exists() {
        assert!(media_type_for_extension("nonexistent").is_none());
        // Leading dots are not part of the stored key
        assert!(media_type_for_extension(".png").is_none());
    }

    #[test]
    fn test_extensions_for_media_type_keeps_table_order() {
        assert_eq!(
            extensions_for_media_type("image/jpeg"),
            vec!["jpe", "jpeg", "jpg"]
        );
        assert!(extensions_for_media_type("image/x-nothing").is_empty());
    }

    #[test]
    fn test_no_duplicate_extensions() {
        let mut exts: Vec<&str> = FILETYPES_DATA.iter().map(|(ext, _)| *ext).collect();
        let original_len = exts.len();
        exts.sort();
        exts.dedup();
        assert_eq!(exts.len(), original_len, "Should have no duplicate extensions");
    }
}
