// Rebuild when message catalogs change so rust_i18n re-embeds them.
fn main() {
    println!("cargo:rerun-if-changed=locales");
    let Ok(entries) = std::fs::read_dir("locales") else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.extension().is_some_and(|ext| ext == "yml") {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }
}
