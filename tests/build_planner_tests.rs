//! End-to-end tests for category scanning, descriptors and builds.

use std::fs;
use std::sync::Arc;

use tokenkit::compiler::{MockCompiler, NativeCompiler};
use tokenkit::config::FailurePolicy;
use tokenkit::models::{Platform, TokenFilter};
use tokenkit::planner::{BuildOrchestrator, BuildPlanner, CellOutcome, PlanError};

mod fixtures;
use fixtures::*;

fn planner(config: &tokenkit::config::Config) -> BuildPlanner {
    BuildPlanner::new(config.paths.clone(), config.build.clone())
}

#[test]
fn test_web_global_build_produces_twelve_files() {
    let temp_dir = create_acme_sources();
    let config = test_config(temp_dir.path(), &["acme"], &[Platform::WebGlobal]);

    let report = BuildOrchestrator::new(planner(&config), Arc::new(NativeCompiler))
        .run()
        .expect("build should succeed");

    assert!(report.published);
    assert_eq!(
        list_files(&temp_dir.path().join("build/web/global")),
        vec![
            "acme/css/color.css",
            "acme/css/spacing.css",
            "acme/css/tokens.css",
            "acme/js/color.js",
            "acme/js/spacing.js",
            "acme/js/tokens.js",
            "acme/json/color.json",
            "acme/json/spacing.json",
            "acme/json/tokens.json",
            "acme/scss/color.scss",
            "acme/scss/spacing.scss",
            "acme/scss/tokens.scss",
        ]
    );

    let spacing = fs::read_to_string(temp_dir.path().join("build/web/global/acme/css/spacing.css"))
        .unwrap();
    assert!(spacing.contains("--spacing-sm: 4px;"));
    assert!(!spacing.contains("--color-primary"));

    let tokens = fs::read_to_string(temp_dir.path().join("build/web/global/acme/scss/tokens.scss"))
        .unwrap();
    assert!(tokens.contains("$spacing-md: 8px;"));
    assert!(tokens.contains("$color-accent: #0055ff;"));
}

#[test]
fn test_descriptor_filters_follow_registry() {
    let temp_dir = create_acme_sources();
    let config = test_config(temp_dir.path(), &["acme"], &Platform::ALL);
    let planner = planner(&config);
    let registry = planner.scan().unwrap();

    let descriptor = planner
        .descriptor(&registry, "acme", Platform::WebGlobal)
        .unwrap();
    let web = descriptor.platform(Platform::WebGlobal).unwrap();
    assert_eq!(web.files.len(), 12);
    assert_eq!(web.files.iter().filter(|f| f.filter.is_unfiltered()).count(), 4);

    let descriptor = planner
        .descriptor(&registry, "acme", Platform::Android)
        .unwrap();
    let android = descriptor.platform(Platform::Android).unwrap();
    assert!(matches!(
        &android.files[1].filter,
        TokenFilter::Category { name, spec: Some(_) } if name == "color"
    ));
}

#[test]
fn test_full_matrix_builds_every_platform() {
    let temp_dir = create_acme_sources();
    let config = test_config(temp_dir.path(), &["acme"], &Platform::ALL);

    let report = BuildOrchestrator::new(planner(&config), Arc::new(NativeCompiler))
        .run()
        .unwrap();
    assert!(!report.has_failures());

    let build = temp_dir.path().join("build");
    let colors = fs::read_to_string(build.join("android/acme/xml/colors.xml")).unwrap();
    assert!(colors.contains("<color name=\"color_primary\">#0055ff</color>"));
    assert!(!colors.contains("spacing"));

    let strings = fs::read_to_string(build.join("android/acme/xml/tokens.xml")).unwrap();
    assert!(strings.contains("spacing_sm"));

    let header = fs::read_to_string(build.join("ios/acme/tokens.h")).unwrap();
    assert!(header.contains("#define SpacingSm @\"4px\""));

    // Only themeA has matching tokens; empty theme files are not written
    assert_eq!(
        list_files(&build.join("web/themes")),
        vec![
            "themeA/css/themeA.css",
            "themeA/js/themeA.js",
            "themeA/json/themeA.json",
            "themeA/scss/themeA.scss",
        ]
    );
    let theme_css = fs::read_to_string(build.join("web/themes/themeA/css/themeA.css")).unwrap();
    assert!(theme_css.contains("--color-surface-theme-a: #ffffff;"));
}

#[test]
fn test_missing_brand_source_is_configuration_error() {
    let temp_dir = create_acme_sources();
    let config = test_config(temp_dir.path(), &["acme", "globex"], &[Platform::Ios]);

    let err = planner(&config).scan().unwrap_err();
    assert!(matches!(err, PlanError::MissingSourceDirectory { ref brand, .. } if brand == "globex"));

    let result = BuildOrchestrator::new(planner(&config), Arc::new(MockCompiler::default())).run();
    assert!(result.is_err());
    assert!(!temp_dir.path().join("build").exists());
}

#[test]
fn test_failed_cell_leaves_published_tree_untouched() {
    let temp_dir = create_acme_sources();
    let config = test_config(temp_dir.path(), &["acme"], &[Platform::WebGlobal, Platform::Ios]);

    // First run publishes a complete tree
    BuildOrchestrator::new(planner(&config), Arc::new(NativeCompiler))
        .run()
        .unwrap();
    let before = list_files(&temp_dir.path().join("build"));

    // Second run fails one cell
    let mock = Arc::new(MockCompiler::failing(&[("acme", Platform::Ios)]));
    let report = BuildOrchestrator::new(planner(&config), mock.clone())
        .run()
        .unwrap();

    assert!(!report.published);
    assert_eq!(mock.calls().len(), 2, "collect policy builds every cell");
    assert_eq!(list_files(&temp_dir.path().join("build")), before);

    let built = fs::read_to_string(temp_dir.path().join("build/ios/acme/tokens.h")).unwrap();
    assert!(!built.contains("mock token content"));
}

#[test]
fn test_fail_fast_stops_after_first_failure() {
    let temp_dir = create_acme_sources();
    let mut config = test_config(temp_dir.path(), &["acme"], &Platform::ALL);
    config.build.failure_policy = FailurePolicy::FailFast;

    let mock = Arc::new(MockCompiler::failing(&[("acme", Platform::WebThemes)]));
    let report = BuildOrchestrator::new(planner(&config), mock.clone())
        .run()
        .unwrap();

    assert_eq!(
        mock.calls(),
        vec![
            ("acme".to_string(), Platform::WebGlobal),
            ("acme".to_string(), Platform::WebThemes)
        ]
    );
    assert!(matches!(report.cells[2].outcome, CellOutcome::Skipped { .. }));
    assert!(matches!(report.cells[3].outcome, CellOutcome::Skipped { .. }));
}

#[test]
fn test_dedupe_themes_builds_themes_once() {
    let temp_dir = create_acme_sources();
    write_file(
        &temp_dir.path().join("src/globex/size.json"),
        r#"{ "size": { "base": { "value": "2px" } } }"#,
    );
    let mut config = test_config(temp_dir.path(), &["acme", "globex"], &[Platform::WebThemes]);

    let mock = Arc::new(MockCompiler::default());
    BuildOrchestrator::new(planner(&config), mock.clone())
        .run()
        .unwrap();
    assert_eq!(mock.calls().len(), 2, "themes build once per brand by default");

    config.build.dedupe_themes = true;
    let mock = Arc::new(MockCompiler::default());
    let report = BuildOrchestrator::new(planner(&config), mock.clone())
        .run()
        .unwrap();
    assert_eq!(mock.calls(), vec![("globex".to_string(), Platform::WebThemes)]);
    assert!(matches!(report.cells[0].outcome, CellOutcome::Skipped { .. }));
    assert!(report.published);
}

#[test]
fn test_dedupe_themes_keeps_later_brand_theme_tokens() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    write_file(
        &temp_dir.path().join("src/plain/spacing.json"),
        r#"{ "spacing": { "sm": { "value": "4px" } } }"#,
    );
    write_file(
        &temp_dir.path().join("src/themed/color.json"),
        r##"{ "color": { "themeA": { "bg": { "value": "#101010" } } } }"##,
    );
    let mut config = test_config(temp_dir.path(), &["plain", "themed"], &[Platform::WebThemes]);
    let themes_dir = temp_dir.path().join("build/web/themes");

    BuildOrchestrator::new(planner(&config), Arc::new(NativeCompiler))
        .run()
        .unwrap();
    let swept = list_files(&themes_dir);
    assert_eq!(swept.len(), 4);

    config.build.dedupe_themes = true;
    let report = BuildOrchestrator::new(planner(&config), Arc::new(NativeCompiler))
        .run()
        .unwrap();

    assert!(report.published);
    assert_eq!(list_files(&themes_dir), swept);
    let css = fs::read_to_string(themes_dir.join("themeA/css/themeA.css")).unwrap();
    assert!(css.contains("#101010"));
}
