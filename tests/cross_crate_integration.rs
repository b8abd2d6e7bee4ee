//! Cross-crate integration tests verifying contracts between workspace crates.
//!
//! These tests exercise mimegate-core the way the CLI and embedding hosts
//! use it, and check that the core's registry stays in step with the table
//! generated by mimegate-types.

use mimegate_core::{
    FileTypeRegistry, Gatekeeper, GatekeeperConfig, MediaType, Scanner, TypeExtensionRegistry,
};

// ============================================================================
// types <-> core contracts
// ============================================================================

#[test]
fn builtin_registry_matches_generated_table() {
    let registry = FileTypeRegistry::builtin();
    assert_eq!(registry.len(), mimegate_types::filetype_count());
    for (ext, media_type) in mimegate_types::FILETYPES_DATA {
        assert_eq!(
            registry.media_type_for(ext),
            Some(MediaType::from(*media_type)),
            "extension {ext}"
        );
    }
}

#[test]
fn extension_lookup_agrees_across_crates() {
    let registry = FileTypeRegistry::builtin();
    for media_type in ["image/png", "text/xml", "application/x-msdownload"] {
        let from_core = registry.extensions_for(&MediaType::from(media_type));
        let from_types: Vec<String> = mimegate_types::extensions_for_media_type(media_type)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(from_core, from_types, "{media_type}");
    }
}

// ============================================================================
// host <-> core contracts
// ============================================================================

#[test]
fn default_config_builds_an_open_gate() {
    let gatekeeper = Gatekeeper::new(GatekeeperConfig::default());
    assert!(!gatekeeper.is_configured());
    assert!(gatekeeper.scan_bytes(b"MZ\x90\0", "setup.exe").is_ok());
}

#[test]
fn toml_config_drives_gatekeeper() {
    let config: GatekeeperConfig = toml_config(
        r#"
scanmode = "allow"
mimetypes = "application/vnd.moodle.profiling"

[filetypes]
add = [{ extension = "mpr", type = "application/vnd.moodle.profiling" }]
"#,
    );
    let gatekeeper = Gatekeeper::new(config);

    let outcome = gatekeeper.scan_bytes(b"%PDF-1.4\n", "a.pdf");
    assert_eq!(
        outcome.rejection().map(|r| r.extensions.clone()),
        Some(vec!["mpr".to_string()])
    );
}

#[test]
fn outcome_serializes_with_status_tag() {
    let config = GatekeeperConfig::builder()
        .scanmode("deny")
        .mimetypes("application/pdf")
        .build()
        .unwrap();
    let outcome = Gatekeeper::new(config).scan_bytes(b"%PDF-1.4\n", "a.pdf");
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "rejected");
    assert_eq!(json["details"]["reason"], "denied");
    assert_eq!(json["details"]["detected"], "application/pdf");
    assert_eq!(json["details"]["extensions"][0], "fdf");
}

fn toml_config(source: &str) -> GatekeeperConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mimegate.toml");
    std::fs::write(&path, source).unwrap();
    GatekeeperConfig::load(&path).unwrap()
}
