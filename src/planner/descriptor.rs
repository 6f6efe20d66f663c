//! Build descriptors handed to the compilation engine.
//!
//! A descriptor is the declarative description of one (brand, platform)
//! build: which sources to read, where each output file goes, which renderer
//! writes it and which tokens it receives. It serializes to the camelCase
//! shape style-dictionary style engines consume.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{COLOR_CATEGORY, GENERIC_TOKEN_TYPE};
use crate::models::{CategoryRegistry, Format, Platform, Renderer, TokenFilter, TransformGroup};

/// One output file of a platform build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path relative to the platform's build path.
    pub destination: String,
    /// Renderer that writes the file.
    pub format: Renderer,
    /// Tokens the file receives. Omitted when unfiltered.
    #[serde(default, skip_serializing_if = "TokenFilter::is_unfiltered")]
    pub filter: TokenFilter,
}

impl FileDescriptor {
    fn new(destination: String, format: Renderer, filter: TokenFilter) -> Self {
        Self {
            destination,
            format,
            filter,
        }
    }
}

/// Output configuration for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDescriptor {
    /// Transforms the engine applies before rendering.
    pub transform_group: TransformGroup,
    /// Output directory, with a trailing slash.
    pub build_path: String,
    /// Files to write.
    pub files: Vec<FileDescriptor>,
}

impl PlatformDescriptor {
    /// Full output path of a file in this platform.
    pub fn output_path(&self, file: &FileDescriptor) -> PathBuf {
        Path::new(&self.build_path).join(&file.destination)
    }
}

/// Complete input for one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDescriptor {
    /// Source globs.
    pub source: Vec<String>,
    /// Platform configurations; always exactly one entry.
    pub platforms: BTreeMap<Platform, PlatformDescriptor>,
    /// Brand this descriptor was generated for.
    #[serde(skip)]
    pub brand: String,
    /// Directory the source glob is rooted at.
    #[serde(skip)]
    pub source_dir: PathBuf,
}

impl BuildDescriptor {
    /// Platform configuration, if the descriptor covers `platform`.
    pub fn platform(&self, platform: Platform) -> Option<&PlatformDescriptor> {
        self.platforms.get(&platform)
    }

    /// Every output path of a platform, in descriptor order.
    pub fn output_paths(&self, platform: Platform) -> Vec<PathBuf> {
        self.platform(platform)
            .map(|p| p.files.iter().map(|f| p.output_path(f)).collect())
            .unwrap_or_default()
    }
}

/// Renders a path for a descriptor: forward slashes, trailing slash.
fn build_path(root: &Path, segments: &[&str]) -> String {
    let mut path = root.display().to_string().replace('\\', "/");
    while path.ends_with('/') && path.len() > 1 {
        path.pop();
    }
    for segment in segments {
        path.push('/');
        path.push_str(segment);
    }
    path.push('/');
    path
}

/// Source glob for a brand: `<source_dir>/**/*.{json,json5}`.
pub fn source_glob(source_dir: &Path) -> String {
    let mut glob = build_path(source_dir, &[]);
    glob.push_str("**/*.{json,json5}");
    glob
}

fn web_renderer(format: Format) -> Renderer {
    Renderer::for_web(format).unwrap_or(Renderer::JsonFlat)
}

fn web_global(registry: &CategoryRegistry, brand: &str, build_root: &Path) -> PlatformDescriptor {
    let mut files: Vec<FileDescriptor> = Format::WEB
        .iter()
        .map(|&format| {
            let ext = format.extension();
            FileDescriptor::new(
                format!("{brand}/{ext}/{GENERIC_TOKEN_TYPE}.{ext}"),
                web_renderer(format),
                TokenFilter::Unfiltered,
            )
        })
        .collect();

    for category in registry.categories(brand) {
        for &format in &Format::WEB {
            let ext = format.extension();
            files.push(FileDescriptor::new(
                format!("{brand}/{ext}/{category}.{ext}"),
                web_renderer(format),
                registry.filter_for(brand, category),
            ));
        }
    }

    PlatformDescriptor {
        transform_group: Platform::WebGlobal.transform_group(),
        build_path: build_path(build_root, &["web", "global"]),
        files,
    }
}

/// Theme files ignore the brand: every brand writes the same paths.
fn web_themes(themes: &[String], build_root: &Path) -> PlatformDescriptor {
    let files = themes
        .iter()
        .flat_map(|theme| {
            Format::WEB.iter().map(move |&format| {
                let ext = format.extension();
                FileDescriptor::new(
                    format!("{theme}/{ext}/{theme}.{ext}"),
                    web_renderer(format),
                    TokenFilter::theme(theme.clone()),
                )
            })
        })
        .collect();

    PlatformDescriptor {
        transform_group: Platform::WebThemes.transform_group(),
        build_path: build_path(build_root, &["web", "themes"]),
        files,
    }
}

fn android(registry: &CategoryRegistry, brand: &str, build_root: &Path) -> PlatformDescriptor {
    PlatformDescriptor {
        transform_group: Platform::Android.transform_group(),
        build_path: build_path(build_root, &["android", brand]),
        files: vec![
            FileDescriptor::new(
                format!("xml/tokens.{}", Format::Xml),
                Renderer::AndroidStrings,
                TokenFilter::Unfiltered,
            ),
            FileDescriptor::new(
                format!("xml/colors.{}", Format::Xml),
                Renderer::AndroidColors,
                registry.filter_for(brand, COLOR_CATEGORY),
            ),
        ],
    }
}

fn ios(brand: &str, build_root: &Path) -> PlatformDescriptor {
    PlatformDescriptor {
        transform_group: Platform::Ios.transform_group(),
        build_path: build_path(build_root, &["ios", brand]),
        files: vec![FileDescriptor::new(
            format!("tokens.{}", Format::H),
            Renderer::IosMacros,
            TokenFilter::Unfiltered,
        )],
    }
}

/// Generates the descriptor for one (brand, platform) cell.
pub fn generate(
    registry: &CategoryRegistry,
    themes: &[String],
    source_dir: &Path,
    build_root: &Path,
    brand: &str,
    platform: Platform,
) -> BuildDescriptor {
    let platform_descriptor = match platform {
        Platform::WebGlobal => web_global(registry, brand, build_root),
        Platform::WebThemes => web_themes(themes, build_root),
        Platform::Android => android(registry, brand, build_root),
        Platform::Ios => ios(brand, build_root),
    };

    let mut platforms = BTreeMap::new();
    platforms.insert(platform, platform_descriptor);

    BuildDescriptor {
        source: vec![source_glob(source_dir)],
        platforms,
        brand: brand.to_string(),
        source_dir: source_dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttributeSpec;

    fn registry() -> CategoryRegistry {
        let mut registry = CategoryRegistry::new();
        registry.register("acme", "color");
        registry.register("acme", "spacing");
        registry
    }

    fn themes() -> Vec<String> {
        vec!["themeA".to_string(), "themeB".to_string()]
    }

    fn destinations(descriptor: &BuildDescriptor, platform: Platform) -> Vec<String> {
        descriptor.platforms[&platform]
            .files
            .iter()
            .map(|f| f.destination.clone())
            .collect()
    }

    #[test]
    fn test_source_glob_covers_json_and_json5() {
        assert_eq!(
            source_glob(Path::new("sd4/all-tokens/acme")),
            "sd4/all-tokens/acme/**/*.{json,json5}"
        );
    }

    #[test]
    fn test_web_global_generic_files_then_categories() {
        let descriptor = generate(
            &registry(),
            &themes(),
            Path::new("sd4/all-tokens/acme"),
            Path::new("build"),
            "acme",
            Platform::WebGlobal,
        );

        let platform = &descriptor.platforms[&Platform::WebGlobal];
        assert_eq!(platform.build_path, "build/web/global/");
        assert_eq!(platform.transform_group, TransformGroup::Web);
        assert_eq!(
            destinations(&descriptor, Platform::WebGlobal),
            vec![
                "acme/scss/tokens.scss",
                "acme/css/tokens.css",
                "acme/js/tokens.js",
                "acme/json/tokens.json",
                "acme/scss/color.scss",
                "acme/css/color.css",
                "acme/js/color.js",
                "acme/json/color.json",
                "acme/scss/spacing.scss",
                "acme/css/spacing.css",
                "acme/js/spacing.js",
                "acme/json/spacing.json",
            ]
        );

        assert!(platform.files[..4].iter().all(|f| f.filter.is_unfiltered()));
        assert_eq!(
            platform.files[5].filter,
            TokenFilter::category("color", Some(AttributeSpec::for_category("color")))
        );
        assert_eq!(platform.files[1].format, Renderer::CssVariables);
    }

    #[test]
    fn test_web_themes_ignore_brand() {
        let a = generate(
            &registry(),
            &themes(),
            Path::new("src/acme"),
            Path::new("build"),
            "acme",
            Platform::WebThemes,
        );
        let mut other = registry();
        other.add_brand("globex");
        let b = generate(
            &other,
            &themes(),
            Path::new("src/globex"),
            Path::new("build"),
            "globex",
            Platform::WebThemes,
        );

        assert_eq!(a.platforms, b.platforms);
        let dests = destinations(&a, Platform::WebThemes);
        assert_eq!(dests.len(), 8);
        assert_eq!(dests[0], "themeA/scss/themeA.scss");
        assert_eq!(dests[7], "themeB/json/themeB.json");
        assert_eq!(
            a.platforms[&Platform::WebThemes].files[0].filter,
            TokenFilter::theme("themeA")
        );
    }

    #[test]
    fn test_android_emits_tokens_and_colors() {
        let descriptor = generate(
            &registry(),
            &themes(),
            Path::new("src/acme"),
            Path::new("build"),
            "acme",
            Platform::Android,
        );

        let platform = &descriptor.platforms[&Platform::Android];
        assert_eq!(platform.build_path, "build/android/acme/");
        assert_eq!(
            destinations(&descriptor, Platform::Android),
            vec!["xml/tokens.xml", "xml/colors.xml"]
        );
        assert_eq!(
            platform.files[1].filter,
            TokenFilter::category("color", Some(AttributeSpec::for_category("color")))
        );
        assert_eq!(
            descriptor.output_paths(Platform::Android)[1],
            PathBuf::from("build/android/acme/xml/colors.xml")
        );
    }

    #[test]
    fn test_android_colors_open_when_brand_has_no_color_category() {
        let mut registry = CategoryRegistry::new();
        registry.register("plain", "spacing");
        let descriptor = generate(
            &registry,
            &themes(),
            Path::new("src/plain"),
            Path::new("build"),
            "plain",
            Platform::Android,
        );

        assert_eq!(
            descriptor.platforms[&Platform::Android].files[1].filter,
            TokenFilter::category("color", None)
        );
    }

    #[test]
    fn test_ios_single_unfiltered_header() {
        let descriptor = generate(
            &registry(),
            &themes(),
            Path::new("src/acme"),
            Path::new("out/"),
            "acme",
            Platform::Ios,
        );

        let platform = &descriptor.platforms[&Platform::Ios];
        assert_eq!(platform.build_path, "out/ios/acme/");
        assert_eq!(platform.files.len(), 1);
        assert_eq!(platform.files[0].destination, "tokens.h");
        assert!(platform.files[0].filter.is_unfiltered());
    }

    #[test]
    fn test_transform_group_follows_platform() {
        for platform in Platform::ALL {
            let descriptor = generate(
                &registry(),
                &themes(),
                Path::new("src/acme"),
                Path::new("out"),
                "acme",
                platform,
            );
            assert_eq!(
                descriptor.platforms[&platform].transform_group,
                platform.transform_group()
            );
        }
        assert_eq!(Platform::Android.transform_group(), TransformGroup::Android);
        assert_eq!(Platform::WebThemes.transform_group(), TransformGroup::Web);
    }

    #[test]
    fn test_descriptor_serializes_engine_shape() {
        let descriptor = generate(
            &registry(),
            &themes(),
            Path::new("sd4/all-tokens/acme"),
            Path::new("build"),
            "acme",
            Platform::Ios,
        );

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "source": ["sd4/all-tokens/acme/**/*.{json,json5}"],
                "platforms": {
                    "ios": {
                        "transformGroup": "ios",
                        "buildPath": "build/ios/acme/",
                        "files": [
                            { "destination": "tokens.h", "format": "ios/macros" }
                        ]
                    }
                }
            })
        );
    }
}
