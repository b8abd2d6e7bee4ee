//! Build script for mimegate-types.
//!
//! Generates Rust code from filetypes.json at compile time.

use std::env;
use std::fs;
use std::path::Path;

/// Maximum allowed file size for filetypes.json (1 MB)
const MAX_FILETYPES_FILE_SIZE: u64 = 1024 * 1024;

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let table_path = Path::new(&manifest_dir).join("filetypes.json");

    println!("cargo:rerun-if-changed={}", table_path.display());

    let file_size = fs::metadata(&table_path)
        .unwrap_or_else(|e| panic!("Failed to get metadata for {}: {}", table_path.display(), e))
        .len();
    if file_size > MAX_FILETYPES_FILE_SIZE {
        panic!(
            "filetypes.json at {} is too large ({} bytes, max {} bytes)",
            table_path.display(),
            file_size,
            MAX_FILETYPES_FILE_SIZE
        );
    }

    let table_json = fs::read_to_string(&table_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read filetypes.json at {}: {}",
            table_path.display(),
            e
        )
    });

    let table: serde_json::Value = serde_json::from_str(&table_json).unwrap_or_else(|e| {
        panic!(
            "Failed to parse filetypes.json at {}: {}",
            table_path.display(),
            e
        )
    });

    let entries = table["filetypes"]
        .as_array()
        .expect("filetypes.json must have a 'filetypes' array");

    let mut generated_code = String::new();
    generated_code.push_str("// Auto-generated from filetypes.json by build.rs\n");
    generated_code.push_str("// Do not edit manually!\n\n");
    generated_code.push_str("/// File type data as (extension, media type) tuples, in table order.\n");
    generated_code.push_str("pub const FILETYPES_DATA: &[(&str, &str)] = &[\n");

    let escape_str = |s: &str| {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    };

    // Extensions are stored without the leading dot.
    let is_valid_extension = |ext: &str| -> bool {
        !ext.is_empty()
            && ext.len() <= 32
            && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    };

    let is_valid_type = |ty: &str| -> bool {
        match ty.split_once('/') {
            Some((top, sub)) => {
                !top.is_empty()
                    && !sub.is_empty()
                    && ty.len() <= 255
                    && !ty.chars().any(|c| c.is_whitespace() || c.is_control())
            }
            None => false,
        }
    };

    let mut seen = std::collections::HashSet::new();

    for (idx, entry) in entries.iter().enumerate() {
        let extension = entry["extension"]
            .as_str()
            .unwrap_or_else(|| panic!("filetypes[{}] must have string 'extension' field", idx));
        let media_type = entry["type"]
            .as_str()
            .unwrap_or_else(|| panic!("filetypes[{}] must have string 'type' field", idx));

        if !is_valid_extension(extension) {
            panic!(
                "filetypes[{}] has invalid extension '{}': must be 1-32 alphanumeric/underscore/hyphen characters",
                idx, extension
            );
        }
        if !is_valid_type(media_type) {
            panic!(
                "filetypes[{}] '{}' has invalid type '{}': must be type/subtype",
                idx, extension, media_type
            );
        }
        if !seen.insert(extension.to_string()) {
            panic!("filetypes[{}] duplicates extension '{}'", idx, extension);
        }

        generated_code.push_str(&format!(
            "    (\"{}\", \"{}\"),\n",
            escape_str(extension),
            escape_str(media_type)
        ));
    }

    generated_code.push_str("];\n");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("filetypes_data.rs");
    fs::write(&dest_path, generated_code).expect("Failed to write generated file types");
}
