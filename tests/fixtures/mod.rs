//! Shared test fixtures for integration tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokenkit::config::{BuildSettings, Config, PathConfig};
use tokenkit::models::Platform;

/// Color source for the `acme` brand.
pub const ACME_COLOR: &str = r##"{
  "color": {
    "primary": { "value": "#0055ff", "type": "color" },
    "accent": { "value": "{color.primary}", "type": "color" },
    "surface": {
      "themeA": { "value": "#ffffff", "type": "themeA" }
    }
  }
}"##;

/// Spacing source for the `acme` brand, in JSON5.
pub const ACME_SPACING: &str = r#"{
  // base grid
  spacing: {
    sm: { value: '4px' },
    md: { value: '8px' },
  },
}"#;

/// Writes a file, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Creates `<root>/src/acme/{color,spacing}.json` and returns the temp dir.
pub fn create_acme_sources() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let brand_dir = temp_dir.path().join("src").join("acme");
    write_file(&brand_dir.join("color.json"), ACME_COLOR);
    write_file(&brand_dir.join("spacing.json"), ACME_SPACING);
    temp_dir
}

/// Configuration building `brands` from `<root>/src` into `<root>/build`.
pub fn test_config(root: &Path, brands: &[&str], platforms: &[Platform]) -> Config {
    Config {
        paths: PathConfig {
            source_root: root.join("src"),
            build_root: root.join("build"),
        },
        build: BuildSettings {
            brands: brands.iter().map(|s| (*s).to_string()).collect(),
            themes: vec!["themeA".to_string(), "themeB".to_string()],
            platforms: platforms.to_vec(),
            ..BuildSettings::default()
        },
        ..Config::default()
    }
}

/// Lays out a compiled tree the way the resolver expects it:
/// `<root>/build/web/global/<brand>/<format>/<file>`.
///
/// Returns the global directory.
pub fn create_compiled_tree(root: &Path, files: &[(&str, &str, &str)]) -> PathBuf {
    let global_dir = root.join("build").join("web").join("global");
    for (brand, format, file) in files {
        write_file(
            &global_dir.join(brand).join(format).join(file),
            &format!("/* {brand} {file} */\n"),
        );
    }
    global_dir
}

/// The `acme` compiled tree used by resolver tests: css color and spacing
/// artifacts plus a generic file.
pub fn create_acme_compiled_tree(root: &Path) -> PathBuf {
    create_compiled_tree(
        root,
        &[
            ("acme", "css", "acme-color.css"),
            ("acme", "css", "acme-spacing.css"),
            ("acme", "css", "tokens.css"),
            ("acme", "js", "acme-spacing.js"),
            ("acme", "js", "acme-background-color.js"),
            ("globex", "json", "tokens.json"),
        ],
    )
}

/// Relative paths of every file below `dir`, sorted.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(dir)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    files.sort();
    files
}
