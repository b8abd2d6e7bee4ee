//! Extensible sniffing via the chain-of-responsibility pattern.

use crate::media_type::MediaType;

/// A single media type detection strategy.
///
/// Implementors inspect the leading bytes of a file (and optionally its
/// filename hint) and return `Some(MediaType)` when they can classify it,
/// or `None` to defer to the next sniffer in the chain.
///
/// # Object Safety
///
/// This trait is object-safe so that sniffers can be stored as
/// `Box<dyn Sniffer>` in a [`SnifferChain`].
pub trait Sniffer: Send + Sync {
    /// Attempt to classify `content`. Return `None` to defer.
    fn sniff(&self, content: &[u8], filename: &str) -> Option<MediaType>;

    /// Human-readable name for this sniffer (used in reports and logging).
    ///
    /// Defaults to the short (unqualified) type name.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Whether results from this sniffer are less trustworthy than content
    /// inspection. Degraded results are flagged in reports.
    fn is_degraded(&self) -> bool {
        false
    }
}

/// Media type produced by a chain, with the sniffer that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SniffResult {
    pub media_type: MediaType,
    pub sniffer: String,
    pub degraded: bool,
}

/// Ordered chain of [`Sniffer`] implementations.
///
/// Sniffers are consulted in order. The first `Some(MediaType)` wins.
///
/// # Examples
///
/// ```
/// use mimegate_core::{MediaType, Sniffer, SnifferChain};
///
/// struct H5p;
/// impl Sniffer for H5p {
///     fn sniff(&self, content: &[u8], filename: &str) -> Option<MediaType> {
///         (content.starts_with(b"PK") && filename.ends_with(".h5p"))
///             .then(|| MediaType::from("application/zip+h5p"))
///     }
/// }
///
/// let chain = SnifferChain::content().prepend(H5p);
/// let result = chain.detect(b"PK\x03\x04", "quiz.h5p").unwrap();
/// assert_eq!(result.media_type, "application/zip+h5p");
/// ```
pub struct SnifferChain {
    sniffers: Vec<Box<dyn Sniffer>>,
}

impl SnifferChain {
    /// Create an empty chain with no sniffers.
    ///
    /// An empty chain always returns `None` from [`detect`](Self::detect).
    pub fn new() -> Self {
        Self {
            sniffers: Vec::new(),
        }
    }

    /// Create a chain holding the [`ContentSniffer`](super::ContentSniffer).
    pub fn content() -> Self {
        Self::new().push(super::ContentSniffer::new())
    }

    /// Add a sniffer to the **front** of the chain (highest priority).
    pub fn prepend(mut self, sniffer: impl Sniffer + 'static) -> Self {
        self.sniffers.insert(0, Box::new(sniffer));
        self
    }

    /// Add a sniffer to the **end** of the chain (lowest priority).
    pub fn push(mut self, sniffer: impl Sniffer + 'static) -> Self {
        self.sniffers.push(Box::new(sniffer));
        self
    }

    /// Run the chain and return the first classification.
    pub fn detect(&self, content: &[u8], filename: &str) -> Option<SniffResult> {
        self.sniffers.iter().find_map(|sniffer| {
            sniffer
                .sniff(content, filename)
                .map(|media_type| SniffResult {
                    media_type,
                    sniffer: sniffer.name().to_string(),
                    degraded: sniffer.is_degraded(),
                })
        })
    }

    /// Returns `true` if every sniffer in the chain is degraded.
    ///
    /// An empty chain counts as degraded since it can never classify
    /// content.
    pub fn is_degraded(&self) -> bool {
        self.sniffers.iter().all(|sniffer| sniffer.is_degraded())
    }

    /// Names of the sniffers in chain order.
    pub fn names(&self) -> Vec<&str> {
        self.sniffers.iter().map(|sniffer| sniffer.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sniffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sniffers.is_empty()
    }
}

impl Default for SnifferChain {
    fn default() -> Self {
        Self::content()
    }
}

impl std::fmt::Debug for SnifferChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnifferChain")
            .field("sniffers", &self.names())
            .finish()
    }
}
