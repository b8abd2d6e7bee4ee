//! File type registry mapping media types to file extensions.

use crate::media_type::MediaType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Read-only lookup from media types to file extensions.
///
/// Supplied by the host environment. The gatekeeper queries it to tell users
/// which extensions a policy permits or forbids, and the degraded
/// extension-based sniffer queries it in the other direction.
///
/// # Example
///
/// ```
/// use mimegate_core::{FileTypeRegistry, MediaType, TypeExtensionRegistry};
///
/// let registry = FileTypeRegistry::builtin();
/// assert_eq!(registry.extensions_for(&MediaType::from("image/png")), vec!["png"]);
/// ```
pub trait TypeExtensionRegistry: Send + Sync {
    /// Every extension registered for exactly `media_type`, in registry order.
    fn extensions_for(&self, media_type: &MediaType) -> Vec<String>;

    /// The media type registered for `extension` (no leading dot), if any.
    fn media_type_for(&self, extension: &str) -> Option<MediaType>;
}

/// One extension to media type mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileTypeEntry {
    /// File extension without the leading dot (e.g., "png")
    pub extension: String,
    /// Media type for the extension (e.g., "image/png")
    #[serde(rename = "type")]
    pub media_type: String,
}

impl FileTypeEntry {
    pub fn new(extension: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            media_type: media_type.into(),
        }
    }
}

/// Ordered extension table, seeded from the built-in list.
///
/// Hosts customize it the way administrators customize their platform's
/// file type list: an extension can be remapped or removed, and new
/// extensions are appended after the built-in ones.
#[derive(Debug, Clone, Default)]
pub struct FileTypeRegistry {
    entries: Vec<FileTypeEntry>,
}

impl FileTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in table from `mimegate-types`.
    pub fn builtin() -> Self {
        Self {
            entries: mimegate_types::FILETYPES_DATA
                .iter()
                .map(|(ext, ty)| FileTypeEntry::new(*ext, *ty))
                .collect(),
        }
    }

    /// Create a registry from explicit entries, kept in the given order.
    ///
    /// Later entries for an extension replace earlier ones in place.
    pub fn from_entries(entries: impl IntoIterator<Item = FileTypeEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            registry.insert(entry);
        }
        registry
    }

    /// Add an extension, or remap it if it already exists.
    ///
    /// A remapped extension keeps its position so extension lists stay
    /// stable for users.
    pub fn insert(&mut self, entry: FileTypeEntry) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.extension == entry.extension)
        {
            Some(existing) => existing.media_type = entry.media_type,
            None => self.entries.push(entry),
        }
    }

    /// Remove an extension. Returns `true` if it was present.
    pub fn remove(&mut self, extension: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.extension != extension);
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[FileTypeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TypeExtensionRegistry for FileTypeRegistry {
    fn extensions_for(&self, media_type: &MediaType) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.media_type == media_type.as_str())
            .map(|entry| entry.extension.clone())
            .collect()
    }

    fn media_type_for(&self, extension: &str) -> Option<MediaType> {
        self.entries
            .iter()
            .find(|entry| entry.extension == extension)
            .map(|entry| MediaType::from(entry.media_type.as_str()))
    }
}
