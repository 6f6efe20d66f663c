//! Integration tests for artifact resolution against a compiled tree.

use tokenkit::models::Format;
use tokenkit::resolver::{Listing, LookupError, Resolver};
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

fn acme_resolver() -> (Resolver, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let global_dir = create_acme_compiled_tree(temp_dir.path());
    (Resolver::new(global_dir), temp_dir)
}

#[test]
fn test_resolve_specific_token_type() {
    let (resolver, temp_dir) = acme_resolver();

    let artifact = resolver.resolve("acme", Some("spacing"), "css").unwrap();
    assert_eq!(
        artifact.path,
        temp_dir.path().join("build/web/global/acme/css/acme-spacing.css")
    );
    assert_eq!(artifact.format, Format::Css);
    assert_eq!(artifact.content_type(), "text/css");
}

#[test]
fn test_resolve_missing_lists_available_types() {
    let (resolver, _temp_dir) = create_only_categories();

    let err = resolver.resolve("acme", Some("missing"), "css").unwrap_err();
    match err {
        LookupError::NotFound {
            available_token_types,
            expected_path,
            ..
        } => {
            assert_eq!(available_token_types, vec!["color", "spacing"]);
            assert_eq!(
                expected_path,
                "global/acme/css/acme-missing.css or global/acme/css/tokens.css"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn create_only_categories() -> (Resolver, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let global_dir = create_compiled_tree(
        temp_dir.path(),
        &[
            ("acme", "css", "acme-spacing.css"),
            ("acme", "css", "acme-color.css"),
        ],
    );
    (Resolver::new(global_dir), temp_dir)
}

#[test]
fn test_generic_tokens_fallback_and_precedence() {
    let (resolver, temp_dir) = acme_resolver();
    let css_dir = temp_dir.path().join("build/web/global/acme/css");

    // Only tokens.css exists
    let artifact = resolver.resolve("acme", Some("tokens"), "css").unwrap();
    assert_eq!(artifact.path, css_dir.join("tokens.css"));

    // <brand>-tokens.css takes precedence once present
    write_file(&css_dir.join("acme-tokens.css"), "/* specific */");
    let artifact = resolver.resolve("acme", Some("tokens"), "css").unwrap();
    assert_eq!(artifact.path, css_dir.join("acme-tokens.css"));
}

#[test]
fn test_generic_fallback_only_for_tokens_type() {
    let (resolver, _temp_dir) = acme_resolver();
    let err = resolver.resolve("acme", Some("typography"), "css").unwrap_err();
    assert!(matches!(err, LookupError::NotFound { .. }));
}

#[test]
fn test_invalid_format_rejected_before_filesystem() {
    let (resolver, _temp_dir) = acme_resolver();

    for format in ["xml", "h", "CSS", ""] {
        let err = resolver
            .resolve("no-such-brand", Some("color"), format)
            .unwrap_err();
        assert!(
            matches!(err, LookupError::InvalidFormat { .. }),
            "format {format:?} should be rejected, got {err}"
        );
    }

    let err = Resolver::new("/definitely/not/here")
        .resolve("acme", None, "xml")
        .unwrap_err();
    assert!(matches!(err, LookupError::InvalidFormat { .. }));
}

#[test]
fn test_path_like_identifiers_rejected() {
    let (resolver, _temp_dir) = acme_resolver();

    let err = resolver.resolve("../acme", Some("color"), "css").unwrap_err();
    assert!(matches!(err, LookupError::InvalidIdentifier { field: "brand", .. }));

    let err = resolver.resolve("acme", Some("../../secret"), "css").unwrap_err();
    assert!(matches!(err, LookupError::InvalidIdentifier { field: "token type", .. }));
}

#[test]
fn test_best_available_prefers_color() {
    let (resolver, temp_dir) = acme_resolver();

    let artifact = resolver.resolve("acme", None, "css").unwrap();
    assert_eq!(artifact.token_type, "color");

    // background-color sorts first and contains "color"
    let artifact = resolver.resolve("acme", None, "js").unwrap();
    assert_eq!(
        artifact.path,
        temp_dir.path().join("build/web/global/acme/js/acme-background-color.js")
    );
}

#[test]
fn test_discovery_listings() {
    let (resolver, temp_dir) = acme_resolver();

    let mut brands = resolver.list_brands().into_vec();
    brands.sort();
    assert_eq!(brands, vec!["acme", "globex"]);

    let mut types = resolver.list_token_types("acme", "css").unwrap().into_vec();
    types.sort();
    assert_eq!(types, vec!["color", "spacing", "tokens"]);

    // Absent format directory is empty, not an error
    assert_eq!(resolver.list_token_types("acme", "md").unwrap(), Listing::Absent);
    assert!(resolver.list_token_types("acme", "md").unwrap().into_vec().is_empty());

    // Listing validates its request like resolution does
    assert!(matches!(
        resolver.list_token_types("..", "css"),
        Err(LookupError::InvalidIdentifier { .. })
    ));
    assert!(matches!(
        resolver.list_token_types("acme", "xml"),
        Err(LookupError::InvalidFormat { .. })
    ));

    // A stray file in the global directory is not a brand
    write_file(&temp_dir.path().join("build/web/global/README.md"), "x");
    assert_eq!(resolver.list_brands().into_vec().len(), 2);
}
