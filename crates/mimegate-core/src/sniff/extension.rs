//! Degraded sniffer that trusts the filename extension.

use std::sync::Arc;

use super::chain::Sniffer;
use super::filename_extension;
use crate::media_type::{EMPTY_MEDIA_TYPE, MediaType};
use crate::registry::TypeExtensionRegistry;

/// Guesses the media type from the filename hint using a type registry.
///
/// Used when content inspection is unavailable. The only content signal it
/// keeps is the size, so zero-length files still report `inode/x-empty`.
/// Extensions are matched lowercase. Unknown extensions defer to the next
/// sniffer in the chain.
pub struct ExtensionSniffer {
    registry: Arc<dyn TypeExtensionRegistry>,
}

impl ExtensionSniffer {
    pub fn new(registry: Arc<dyn TypeExtensionRegistry>) -> Self {
        Self { registry }
    }
}

impl std::fmt::Debug for ExtensionSniffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionSniffer")
            .field("registry", &"Arc<dyn TypeExtensionRegistry>")
            .finish()
    }
}

impl Sniffer for ExtensionSniffer {
    fn sniff(&self, content: &[u8], filename: &str) -> Option<MediaType> {
        if content.is_empty() {
            return Some(MediaType::from(EMPTY_MEDIA_TYPE));
        }
        let ext = filename_extension(filename)?.to_ascii_lowercase();
        self.registry.media_type_for(&ext)
    }

    fn name(&self) -> &str {
        "ExtensionSniffer"
    }

    fn is_degraded(&self) -> bool {
        true
    }
}
