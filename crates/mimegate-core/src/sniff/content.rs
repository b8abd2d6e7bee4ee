//! Magic-byte sniffer backed by the `infer` crate.

use infer::Infer;

use super::chain::Sniffer;
use crate::media_type::{EMPTY_MEDIA_TYPE, MediaType, OCTET_STREAM};

/// Primary sniffer: magic-byte signatures, then text heuristics.
///
/// Classification order:
///
/// 1. zero bytes → `inode/x-empty`
/// 2. markup whose root element is `<svg>` → `image/svg+xml`, and text
///    opening with `<?php` (or a `php` shebang) → `text/x-php`
/// 3. a known signature (via [`infer`]) → its media type, e.g. gzip content
///    is reported as `application/gzip`
/// 4. text starting with an XML declaration → `text/xml`
/// 5. other text → `text/plain`
/// 6. anything else → `application/octet-stream`
///
/// This sniffer always answers, so it terminates any chain it is part of.
pub struct ContentSniffer {
    infer: Infer,
}

impl ContentSniffer {
    pub fn new() -> Self {
        Self {
            infer: Infer::new(),
        }
    }

    /// Create a sniffer with additional signatures registered on the
    /// underlying [`Infer`] instance.
    pub fn with_matchers<F>(setup: F) -> Self
    where
        F: FnOnce(&mut Infer),
    {
        let mut infer = Infer::new();
        setup(&mut infer);
        Self { infer }
    }

    /// Classify `content`. Never fails.
    pub fn classify(&self, content: &[u8]) -> MediaType {
        if content.is_empty() {
            return MediaType::from(EMPTY_MEDIA_TYPE);
        }
        // infer reports any XML prologue as text/xml, so script-bearing
        // formats are checked first.
        if let Some(script) = sniff_script_markup(content) {
            return MediaType::from(script);
        }
        if let Some(kind) = self.infer.get(content) {
            return MediaType::from(kind.mime_type());
        }
        if looks_like_text(content) {
            if starts_with_xml_declaration(content) {
                return MediaType::from("text/xml");
            }
            return MediaType::from("text/plain");
        }
        MediaType::from(OCTET_STREAM)
    }
}

impl Default for ContentSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContentSniffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentSniffer").finish_non_exhaustive()
    }
}

impl Sniffer for ContentSniffer {
    fn sniff(&self, content: &[u8], _filename: &str) -> Option<MediaType> {
        Some(self.classify(content))
    }

    fn name(&self) -> &str {
        "ContentSniffer"
    }
}

/// Text if there are no NUL bytes and either the bytes are UTF-8 (a
/// multi-byte sequence cut off by the read limit is tolerated) or no C0
/// control characters other than common whitespace and ESC appear.
fn looks_like_text(content: &[u8]) -> bool {
    if content.contains(&0) {
        return false;
    }
    match std::str::from_utf8(content) {
        Ok(_) => true,
        Err(e) if e.error_len().is_none() => true,
        Err(_) => !content.iter().any(|&b| is_binary_control(b)),
    }
}

fn is_binary_control(b: u8) -> bool {
    matches!(b, 0x01..=0x08 | 0x0E..=0x1A | 0x1C..=0x1F | 0x7F)
}

fn strip_bom(content: &[u8]) -> &[u8] {
    content
        .strip_prefix(b"\xEF\xBB\xBF")
        .unwrap_or(content)
        .trim_ascii_start()
}

fn starts_with_xml_declaration(content: &[u8]) -> bool {
    strip_bom(content).starts_with(b"<?xml")
}

fn sniff_script_markup(content: &[u8]) -> Option<&'static str> {
    if !looks_like_text(content) {
        return None;
    }
    let text = strip_bom(content);
    if is_php(text) {
        return Some("text/x-php");
    }
    if root_element(text).is_some_and(is_svg_tag) {
        return Some("image/svg+xml");
    }
    None
}

fn is_php(text: &[u8]) -> bool {
    if text.len() >= 5 && text[..5].eq_ignore_ascii_case(b"<?php") {
        return true;
    }
    text.strip_prefix(b"#!")
        .and_then(|rest| rest.split(|&b| b == b'\n').next())
        .is_some_and(|line| line.windows(3).any(|w| w == b"php"))
}

/// Skip the XML declaration, processing instructions, comments and the
/// doctype, and return the markup starting at the first element.
fn root_element(mut text: &[u8]) -> Option<&[u8]> {
    loop {
        text = text.trim_ascii_start();
        let close: &[u8] = if text.starts_with(b"<?") {
            b"?>"
        } else if text.starts_with(b"<!--") {
            b"-->"
        } else if text.starts_with(b"<!") {
            b">"
        } else if text.starts_with(b"<") {
            return Some(text);
        } else {
            return None;
        };
        let end = find(text, close)?;
        text = &text[end + close.len()..];
    }
}

fn is_svg_tag(element: &[u8]) -> bool {
    element.len() > 4
        && element[..4].eq_ignore_ascii_case(b"<svg")
        && matches!(element[4], b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'/')
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";
    const GZIP: &[u8] = b"\x1f\x8b\x08\x00\x00\x00\x00\x00\x00\x03";
    const PDF: &[u8] = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n";

    fn classify(content: &[u8]) -> MediaType {
        ContentSniffer::new().classify(content)
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(classify(b""), EMPTY_MEDIA_TYPE);
    }

    #[test]
    fn test_png_signature() {
        assert_eq!(classify(PNG), "image/png");
    }

    #[test]
    fn test_gzip_signature() {
        assert_eq!(classify(GZIP), "application/gzip");
    }

    #[test]
    fn test_pdf_signature() {
        assert_eq!(classify(PDF), "application/pdf");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(classify(b"hello world\nsecond line\n"), "text/plain");
        assert_eq!(classify("unicode: \u{00e9}\u{4e2d}".as_bytes()), "text/plain");
    }

    #[test]
    fn test_truncated_utf8_is_text() {
        // "\u{4e2d}" cut after its first byte by the read limit
        let mut content = b"abc ".to_vec();
        content.push(0xE4);
        assert_eq!(classify(&content), "text/plain");
    }

    #[test]
    fn test_latin1_text_is_text() {
        assert_eq!(classify(b"caf\xe9 cr\xe8me\n"), "text/plain");
    }

    #[test]
    fn test_xml_declaration() {
        assert_eq!(
            classify(b"<?xml version=\"1.0\"?>\n<root/>"),
            "text/xml"
        );
        assert_eq!(
            classify(b"\xEF\xBB\xBF  <?xml version=\"1.0\"?><a/>"),
            "text/xml"
        );
    }

    #[test]
    fn test_svg_root_element() {
        let with_prologue = b"<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"><script>alert(1)</script></svg>";
        assert_eq!(classify(with_prologue), "image/svg+xml");
        assert_eq!(classify(b"<svg width=\"10\"/>"), "image/svg+xml");
        assert_eq!(
            classify(b"<!-- logo -->\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"x.dtd\">\n<SVG>"),
            "image/svg+xml"
        );
    }

    #[test]
    fn test_svg_needs_svg_root() {
        assert_eq!(
            classify(b"<?xml version=\"1.0\"?>\n<svgfont/>"),
            "text/xml"
        );
        assert_eq!(
            classify(b"<?xml version=\"1.0\"?>\n<doc><svg/></doc>"),
            "text/xml"
        );
    }

    #[test]
    fn test_php_source() {
        assert_eq!(classify(b"<?php system($_GET['c']); ?>"), "text/x-php");
        assert_eq!(classify(b"\n  <?PHP echo 1;"), "text/x-php");
        assert_eq!(
            classify(b"#!/usr/bin/env php\n<?php echo 1;"),
            "text/x-php"
        );
        assert_eq!(classify(b"#!/bin/sh\necho php\n"), "text/x-shellscript");
    }

    #[test]
    fn test_binary_falls_back_to_octet_stream() {
        assert_eq!(classify(b"\x01\x02\x03\x00\xff\xfe"), OCTET_STREAM);
        assert_eq!(classify(b"\x01\x02\x03\x04\x05"), OCTET_STREAM);
    }

    #[test]
    fn test_custom_matcher() {
        fn is_moodle_profile(buf: &[u8]) -> bool {
            buf.starts_with(b"MPR1")
        }
        let sniffer = ContentSniffer::with_matchers(|infer| {
            infer.add("application/vnd.moodle.profiling", "mpr", is_moodle_profile);
        });
        assert_eq!(
            sniffer.classify(b"MPR1\x00\x01"),
            "application/vnd.moodle.profiling"
        );
    }

    #[test]
    fn test_sniff_always_answers() {
        let sniffer = ContentSniffer::new();
        assert!(sniffer.sniff(b"\x00\x00", "x.bin").is_some());
        assert!(!sniffer.is_degraded());
    }
}
