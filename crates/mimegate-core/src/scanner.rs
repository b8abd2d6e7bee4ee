//! The gatekeeper: read the file head, sniff, normalize, evaluate.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{DetectionStrategy, GatekeeperConfig};
use crate::error::ScanResult;
use crate::extensions::extensions_for;
use crate::fs::{FileSystem, RealFileSystem};
use crate::media_type::{MediaType, OCTET_STREAM};
use crate::normalize::Normalizer;
use crate::outcome::{Detection, Inconclusive, Rejection, ScanOutcome};
use crate::policy::{PolicyConfig, RejectReason, Verdict, evaluate};
use crate::registry::TypeExtensionRegistry;
use crate::sniff::{ExtensionSniffer, SnifferChain};

/// Name reported when no sniffer in the chain could classify the content.
const UNCLASSIFIED_SNIFFER: &str = "unclassified";

/// A file type gate that can be asked about uploaded files.
///
/// Scanners never fail: every problem is folded into the returned
/// [`ScanOutcome`], and anything other than [`ScanOutcome::Ok`] blocks the
/// upload.
pub trait Scanner: Send + Sync {
    /// Human-readable name for this scanner (used in reports and logging).
    fn name(&self) -> &str;

    /// Whether a media type list is configured. An unconfigured scanner
    /// accepts everything.
    fn is_configured(&self) -> bool;

    /// Scan the file at `path`. `filename` is the name the uploader gave the
    /// file, which may differ from the on-disk temp name.
    fn scan(&self, path: &Path, filename: &str) -> ScanOutcome;

    /// Scan content that is already in memory.
    fn scan_bytes(&self, content: &[u8], filename: &str) -> ScanOutcome;
}

/// Content-sniffing allow/deny gate.
///
/// Built once from a [`GatekeeperConfig`] and shared read-only; it holds no
/// mutable state, so one instance can serve parallel scans.
///
/// # Examples
///
/// ```
/// use mimegate_core::{Gatekeeper, GatekeeperConfig, Scanner};
///
/// let config = GatekeeperConfig::builder()
///     .scanmode("allow")
///     .mimetypes("text/xml;image/png")
///     .build()
///     .unwrap();
/// let gatekeeper = Gatekeeper::new(config);
///
/// let outcome = gatekeeper.scan_bytes(b"%PDF-1.7\n", "report.pdf");
/// assert!(outcome.is_blocked());
/// let listed = outcome.rejection().unwrap().extension_list();
/// assert!(listed.ends_with("xsl, png"));
/// ```
pub struct Gatekeeper {
    config: GatekeeperConfig,
    policy: PolicyConfig,
    normalizer: Normalizer,
    registry: Arc<dyn TypeExtensionRegistry>,
    fs: Arc<dyn FileSystem>,
    sniffers: SnifferChain,
}

impl Gatekeeper {
    /// Build a gatekeeper with the real filesystem and the sniffers,
    /// normalizer and file type table described by `config`.
    pub fn new(config: GatekeeperConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: GatekeeperConfig) -> GatekeeperBuilder {
        GatekeeperBuilder::new(config)
    }

    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn sniffers(&self) -> &SnifferChain {
        &self.sniffers
    }

    pub fn registry(&self) -> &dyn TypeExtensionRegistry {
        self.registry.as_ref()
    }

    /// Extensions of the configured types, as listed in rejection messages.
    pub fn configured_extensions(&self) -> Vec<String> {
        extensions_for(self.policy.configured_types(), self.registry.as_ref())
    }

    /// Detect and normalize the media type of the file at `path` without
    /// applying the policy.
    pub fn detect(&self, path: &Path, filename: &str) -> ScanResult<Detection> {
        let content = self.fs.read_head(path, self.config.max_sniff_bytes)?;
        Ok(self.detect_bytes(&content, &filename_hint(path, filename)))
    }

    /// Detect and normalize the media type of in-memory content.
    pub fn detect_bytes(&self, content: &[u8], filename: &str) -> Detection {
        let (raw, sniffer, degraded) = match self.sniffers.detect(content, filename) {
            Some(result) => (result.media_type, result.sniffer, result.degraded),
            None => (
                MediaType::from(OCTET_STREAM),
                UNCLASSIFIED_SNIFFER.to_string(),
                self.sniffers.is_degraded(),
            ),
        };
        let normalized = self.normalizer.normalize(&raw, filename);
        if normalized != raw {
            debug!(raw = %raw, normalized = %normalized, filename, "normalized media type");
        }
        Detection {
            raw,
            normalized,
            sniffer,
            degraded,
        }
    }

    /// Scan `path` and run `on_reject` if the policy rejects the file.
    ///
    /// `on_reject` runs at most once, before this returns, and only for
    /// [`RejectReason::NotAllowed`] and [`RejectReason::Denied`]. It does not
    /// run for accepted, unreadable or misconfigured scans.
    pub fn scan_with<F>(&self, path: &Path, filename: &str, on_reject: F) -> ScanOutcome
    where
        F: FnOnce(),
    {
        self.scan_inner(path, filename, on_reject).1
    }

    /// Like [`Scanner::scan`], also returning the detection when sniffing
    /// took place.
    pub fn scan_detailed(&self, path: &Path, filename: &str) -> (Option<Detection>, ScanOutcome) {
        self.scan_inner(path, filename, || self.reject_action(path))
    }

    fn scan_inner<F>(
        &self,
        path: &Path,
        filename: &str,
        on_reject: F,
    ) -> (Option<Detection>, ScanOutcome)
    where
        F: FnOnce(),
    {
        if !self.policy.is_configured() {
            debug!(path = %path.display(), "no media types configured, accepting");
            return (None, ScanOutcome::Ok);
        }

        let content = match self.fs.read_head(path, self.config.max_sniff_bytes) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), filename, error = %e, "file is not readable, blocking");
                return (
                    None,
                    ScanOutcome::Inconclusive(Inconclusive::Unreadable {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    }),
                );
            }
        };

        self.evaluate_content(&content, &filename_hint(path, filename), on_reject)
    }

    fn evaluate_content<F>(
        &self,
        content: &[u8],
        filename: &str,
        on_reject: F,
    ) -> (Option<Detection>, ScanOutcome)
    where
        F: FnOnce(),
    {
        if self.policy.mode().is_none() {
            warn!(
                scanmode = self.config.scanmode.as_deref().unwrap_or(""),
                "scan mode is not recognized, blocking"
            );
            return (None, self.rejected(RejectReason::Misconfigured, None));
        }

        let detection = self.detect_bytes(content, filename);
        let outcome = match evaluate(&detection.normalized, &self.policy) {
            Verdict::Accept => ScanOutcome::Ok,
            Verdict::Reject(reason) => {
                debug!(
                    filename,
                    detected = %detection.normalized,
                    reason = ?reason,
                    "file rejected by policy"
                );
                if reason.is_policy_violation() {
                    on_reject();
                }
                self.rejected(reason, Some(detection.normalized.clone()))
            }
        };
        (Some(detection), outcome)
    }

    fn rejected(&self, reason: RejectReason, detected: Option<MediaType>) -> ScanOutcome {
        ScanOutcome::Rejected(Rejection {
            reason,
            detected,
            extensions: self.configured_extensions(),
        })
    }

    /// Default reject action: remove the file when `delete_rejected` is set.
    /// A failed removal is logged and leaves the outcome unchanged.
    fn reject_action(&self, path: &Path) {
        if !self.config.delete_rejected {
            return;
        }
        match self.fs.remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed rejected file"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove rejected file"),
        }
    }
}

impl Scanner for Gatekeeper {
    fn name(&self) -> &str {
        "mimegate"
    }

    fn is_configured(&self) -> bool {
        self.policy.is_configured()
    }

    fn scan(&self, path: &Path, filename: &str) -> ScanOutcome {
        self.scan_detailed(path, filename).1
    }

    fn scan_bytes(&self, content: &[u8], filename: &str) -> ScanOutcome {
        if !self.policy.is_configured() {
            return ScanOutcome::Ok;
        }
        self.evaluate_content(content, filename, || {}).1
    }
}

impl std::fmt::Debug for Gatekeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gatekeeper")
            .field("policy", &self.policy)
            .field("normalizer", &self.normalizer)
            .field("sniffers", &self.sniffers)
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Gatekeeper`] with injectable collaborators.
///
/// Anything not injected is derived from the config: the file type table
/// from `[filetypes]`, the sniffer chain from `detection`, and the real
/// filesystem.
pub struct GatekeeperBuilder {
    config: GatekeeperConfig,
    registry: Option<Arc<dyn TypeExtensionRegistry>>,
    fs: Option<Arc<dyn FileSystem>>,
    sniffers: Option<SnifferChain>,
    normalizer: Option<Normalizer>,
}

impl GatekeeperBuilder {
    fn new(config: GatekeeperConfig) -> Self {
        Self {
            config,
            registry: None,
            fs: None,
            sniffers: None,
            normalizer: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<dyn TypeExtensionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn with_sniffers(mut self, sniffers: SnifferChain) -> Self {
        self.sniffers = Some(sniffers);
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn build(self) -> Gatekeeper {
        let config = self.config;
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(config.registry()));
        let sniffers = self.sniffers.unwrap_or_else(|| match config.detection {
            DetectionStrategy::Content => SnifferChain::content(),
            DetectionStrategy::Extension => {
                SnifferChain::new().push(ExtensionSniffer::new(Arc::clone(&registry)))
            }
        });
        if sniffers.is_degraded() {
            warn!(
                sniffers = ?sniffers.names(),
                "content inspection is disabled, media types are guessed from filenames"
            );
        }

        Gatekeeper {
            policy: config.policy(),
            normalizer: self.normalizer.unwrap_or_else(|| config.normalizer()),
            registry,
            fs: self.fs.unwrap_or_else(|| Arc::new(RealFileSystem)),
            sniffers,
            config,
        }
    }
}

/// The uploader's filename, or the on-disk file name when none was given.
fn filename_hint<'a>(path: &'a Path, filename: &'a str) -> Cow<'a, str> {
    if !filename.is_empty() {
        return Cow::Borrowed(filename);
    }
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or(Cow::Borrowed(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::media_type::EMPTY_MEDIA_TYPE;
    use crate::registry::{FileTypeEntry, FileTypeRegistry};
    use crate::sniff::Sniffer;
    use std::cell::Cell;
    use std::path::PathBuf;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const PDF: &[u8] = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n";
    const GZIP: &[u8] = b"\x1f\x8b\x08\0\0\0\0\0\0\x03";
    const XML: &[u8] = b"<?xml version=\"1.0\"?>\n<quiz/>\n";

    fn config(scanmode: Option<&str>, mimetypes: &str) -> GatekeeperConfig {
        let mut builder = GatekeeperConfig::builder();
        builder.mimetypes(mimetypes);
        if let Some(mode) = scanmode {
            builder.scanmode(mode);
        }
        builder.build_unchecked()
    }

    fn gatekeeper(config: GatekeeperConfig, fs: &Arc<MockFileSystem>) -> Gatekeeper {
        Gatekeeper::builder(config)
            .with_fs(Arc::clone(fs) as Arc<dyn FileSystem>)
            .build()
    }

    /// Reports a fixed media type for any content.
    struct Fixed(&'static str);

    impl Sniffer for Fixed {
        fn sniff(&self, _content: &[u8], _filename: &str) -> Option<MediaType> {
            Some(MediaType::from(self.0))
        }
    }

    #[test]
    fn test_allow_accepts_listed_type() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/up/a1", PNG);
        let gk = gatekeeper(config(Some("allow"), "text/xml;image/png"), &fs);

        assert_eq!(gk.scan(Path::new("/up/a1"), "logo.png"), ScanOutcome::Ok);
    }

    #[test]
    fn test_allow_rejects_unlisted_type_with_extensions() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/up/a2", PDF);
        let gk = gatekeeper(config(Some("allow"), "text/xml;image/png"), &fs);

        let outcome = gk.scan(Path::new("/up/a2"), "report.pdf");
        let rejection = outcome.rejection().expect("rejected");
        assert_eq!(rejection.reason, RejectReason::NotAllowed);
        assert_eq!(rejection.detected, Some(MediaType::from("application/pdf")));
        assert_eq!(
            rejection.extensions,
            vec!["jcb", "jcl", "jcw", "jmt", "jmx", "jqz", "rhb", "sqt", "xsl", "png"]
        );
    }

    #[test]
    fn test_deny_rejects_listed_type() {
        let gk = Gatekeeper::builder(config(Some("deny"), "application/x-msdownload"))
            .with_sniffers(SnifferChain::new().push(Fixed("application/x-msdownload")))
            .build();

        let outcome = gk.scan_bytes(b"MZ\x90\0", "setup.exe");
        let rejection = outcome.rejection().expect("rejected");
        assert_eq!(rejection.reason, RejectReason::Denied);
        assert_eq!(rejection.extensions, vec!["dll", "exe"]);
    }

    #[test]
    fn test_deny_accepts_unlisted_type() {
        let gk = Gatekeeper::new(config(Some("deny"), "application/x-msdownload"));
        assert_eq!(gk.scan_bytes(b"plain notes\n", "notes.txt"), ScanOutcome::Ok);
    }

    #[test]
    fn test_unconfigured_accepts_without_reading() {
        let fs = Arc::new(MockFileSystem::new());
        let gk = gatekeeper(config(Some("allow"), "  "), &fs);

        assert!(!gk.is_configured());
        // The path does not exist in the mock; reading it would block.
        assert_eq!(gk.scan(Path::new("/missing"), "x.bin"), ScanOutcome::Ok);
    }

    #[test]
    fn test_unconfigured_ignores_unknown_mode() {
        let gk = Gatekeeper::new(config(Some("bogus"), ""));
        assert_eq!(gk.scan_bytes(PDF, "a.pdf"), ScanOutcome::Ok);
    }

    #[test]
    fn test_unreadable_is_inconclusive_and_skips_callback() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_unreadable("/up/locked");
        let gk = gatekeeper(config(Some("allow"), "image/png"), &fs);

        let called = Cell::new(false);
        let outcome = gk.scan_with(Path::new("/up/locked"), "a.png", || called.set(true));

        assert!(matches!(
            outcome,
            ScanOutcome::Inconclusive(Inconclusive::Unreadable { .. })
        ));
        assert!(outcome.is_blocked());
        assert!(!called.get());
    }

    #[test]
    fn test_directory_is_inconclusive() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_dir("/up");
        let gk = gatekeeper(config(Some("deny"), "image/png"), &fs);

        assert!(matches!(
            gk.scan(Path::new("/up"), ""),
            ScanOutcome::Inconclusive(_)
        ));
    }

    #[test]
    fn test_unknown_mode_is_misconfigured_without_callback() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/up/f", PNG);
        let mut cfg = config(Some("whitelist"), "image/png");
        cfg.delete_rejected = true;
        let gk = gatekeeper(cfg, &fs);

        let called = Cell::new(false);
        let outcome = gk.scan_with(Path::new("/up/f"), "f.png", || called.set(true));
        let rejection = outcome.rejection().expect("rejected");
        assert_eq!(rejection.reason, RejectReason::Misconfigured);
        assert_eq!(rejection.detected, None);
        assert!(!called.get());

        // Nor does the default reject action remove the file.
        assert!(gk.scan(Path::new("/up/f"), "f.png").is_blocked());
        assert!(fs.removed().is_empty());
    }

    #[test]
    fn test_missing_mode_is_misconfigured() {
        let gk = Gatekeeper::new(config(None, "image/png"));
        let outcome = gk.scan_bytes(PNG, "a.png");
        assert_eq!(
            outcome.rejection().map(|r| r.reason),
            Some(RejectReason::Misconfigured)
        );
    }

    #[test]
    fn test_callback_runs_once_on_policy_rejection() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/up/x", PDF);
        let gk = gatekeeper(config(Some("allow"), "image/png"), &fs);

        let calls = Cell::new(0);
        let outcome = gk.scan_with(Path::new("/up/x"), "x.pdf", || calls.set(calls.get() + 1));
        assert!(outcome.is_blocked());
        assert_eq!(calls.get(), 1);

        let calls = Cell::new(0);
        fs.add_file("/up/y", PNG);
        let outcome = gk.scan_with(Path::new("/up/y"), "y.png", || calls.set(calls.get() + 1));
        assert!(outcome.is_ok());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_delete_rejected_removes_file() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/up/x", PDF);
        let mut cfg = config(Some("allow"), "image/png");
        cfg.delete_rejected = true;
        let gk = gatekeeper(cfg, &fs);

        assert!(gk.scan(Path::new("/up/x"), "x.pdf").is_blocked());
        assert_eq!(fs.removed(), vec![PathBuf::from("/up/x")]);
    }

    #[test]
    fn test_files_kept_without_delete_rejected() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/up/x", PDF);
        let gk = gatekeeper(config(Some("allow"), "image/png"), &fs);

        assert!(gk.scan(Path::new("/up/x"), "x.pdf").is_blocked());
        assert!(fs.removed().is_empty());
        assert!(fs.is_file(Path::new("/up/x")));
    }

    #[test]
    fn test_gzip_normalized_to_backup_type() {
        let gk = Gatekeeper::new(config(Some("allow"), "application/vnd.moodle.backup"));
        let detection = gk.detect_bytes(GZIP, "course.mbz");
        assert_eq!(detection.raw, MediaType::from("application/gzip"));
        assert_eq!(
            detection.normalized,
            MediaType::from("application/vnd.moodle.backup")
        );
        assert_eq!(gk.scan_bytes(GZIP, "course.mbz"), ScanOutcome::Ok);
    }

    #[test]
    fn test_empty_log_normalized_to_text() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/tmp/upload.log", Vec::new());
        fs.add_file("/tmp/upload.dat", Vec::new());
        let gk = gatekeeper(config(Some("allow"), "text/plain"), &fs);

        // Filename hint drives the extension check.
        assert_eq!(gk.scan(Path::new("/tmp/upload.dat"), "moodle_backup.log"), ScanOutcome::Ok);
        // Empty hint falls back to the on-disk name.
        assert_eq!(gk.scan(Path::new("/tmp/upload.log"), ""), ScanOutcome::Ok);

        let detection = gk.detect(Path::new("/tmp/upload.dat"), "empty.txt").unwrap();
        assert_eq!(detection.normalized, MediaType::from(EMPTY_MEDIA_TYPE));
    }

    #[test]
    fn test_empty_log_extension_is_case_sensitive() {
        let gk = Gatekeeper::new(config(Some("allow"), "text/plain"));
        assert!(gk.scan_bytes(b"", "moodle_backup.LOG").is_blocked());
    }

    #[test]
    fn test_xml_detected() {
        let gk = Gatekeeper::new(config(Some("allow"), "text/xml"));
        assert_eq!(gk.scan_bytes(XML, "questions.xml"), ScanOutcome::Ok);
    }

    #[test]
    fn test_duplicates_repeat_extensions() {
        let gk = Gatekeeper::new(config(Some("allow"), "image/png;image/png"));
        assert_eq!(gk.configured_extensions(), vec!["png", "png"]);
    }

    #[test]
    fn test_extension_detection_is_degraded() {
        let mut cfg = config(Some("allow"), "image/png");
        cfg.detection = DetectionStrategy::Extension;
        let gk = Gatekeeper::new(cfg);

        assert!(gk.sniffers().is_degraded());
        let detection = gk.detect_bytes(PDF, "looks.png");
        assert_eq!(detection.raw, MediaType::from("image/png"));
        assert_eq!(detection.sniffer, "ExtensionSniffer");
        assert!(detection.degraded);
    }

    #[test]
    fn test_unknown_extension_falls_back_to_octet_stream() {
        let mut cfg = config(Some("deny"), "application/octet-stream");
        cfg.detection = DetectionStrategy::Extension;
        let gk = Gatekeeper::new(cfg);

        let detection = gk.detect_bytes(b"data", "blob.zzz");
        assert_eq!(detection.raw, MediaType::from(OCTET_STREAM));
        assert_eq!(detection.sniffer, UNCLASSIFIED_SNIFFER);
        assert!(detection.degraded);
        assert!(gk.scan_bytes(b"data", "blob.zzz").is_blocked());
    }

    #[test]
    fn test_injected_registry_drives_extensions() {
        let registry = FileTypeRegistry::from_entries([
            FileTypeEntry::new("webp", "image/webp"),
            FileTypeEntry::new("wbp", "image/webp"),
        ]);
        let gk = Gatekeeper::builder(config(Some("allow"), "image/webp"))
            .with_registry(Arc::new(registry))
            .build();

        let outcome = gk.scan_bytes(PDF, "a.pdf");
        assert_eq!(outcome.rejection().unwrap().extensions, vec!["webp", "wbp"]);
    }

    #[test]
    fn test_custom_normalizer() {
        let gk = Gatekeeper::builder(config(Some("allow"), "application/gzip"))
            .with_normalizer(Normalizer::new())
            .build();
        assert_eq!(gk.scan_bytes(GZIP, "a.gz"), ScanOutcome::Ok);
    }

    #[test]
    fn test_scan_detailed_reports_detection() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/up/p", PNG);
        let gk = gatekeeper(config(Some("deny"), "image/png"), &fs);

        let (detection, outcome) = gk.scan_detailed(Path::new("/up/p"), "p.png");
        assert_eq!(
            detection.map(|d| d.normalized),
            Some(MediaType::from("image/png"))
        );
        assert!(outcome.is_blocked());
    }

    #[test]
    fn test_max_sniff_bytes_limits_read() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/up/long", PNG);
        let mut cfg = config(Some("allow"), "image/png");
        cfg.max_sniff_bytes = 2;
        let gk = gatekeeper(cfg, &fs);

        // Two bytes are not enough for the PNG signature.
        assert!(gk.scan(Path::new("/up/long"), "long.png").is_blocked());
    }
}
