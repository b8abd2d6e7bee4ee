//! Resolution of configured media types to user-facing extension lists.

use crate::media_type::MediaType;
use crate::registry::TypeExtensionRegistry;

/// Collect the extensions associated with each configured type.
///
/// Types are visited in configured order and each contributes its
/// extensions in registry order. The result is a plain concatenation:
/// a type listed twice contributes its extensions twice, and a type with no
/// registry entries contributes nothing.
pub fn extensions_for(types: &[MediaType], registry: &dyn TypeExtensionRegistry) -> Vec<String> {
    types
        .iter()
        .flat_map(|media_type| registry.extensions_for(media_type))
        .collect()
}

/// Join extensions for display in a rejection message.
pub fn join_extensions(extensions: &[String]) -> String {
    extensions.join(", ")
}
