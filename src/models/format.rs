//! Output formats, platforms and renderer identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A compiled artifact format (file extension).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// CSS custom properties
    Css,
    /// SCSS variables
    Scss,
    /// Flat CommonJS module
    Js,
    /// Flat JSON object
    Json,
    /// Markdown documentation
    Md,
    /// Android XML resources
    Xml,
    /// iOS macro header
    H,
}

impl Format {
    /// Web formats in the order the build emits them.
    pub const WEB: [Self; 4] = [Self::Scss, Self::Css, Self::Js, Self::Json];

    /// Formats the resolver accepts in lookup requests.
    pub const SERVABLE: [Self; 5] = [Self::Css, Self::Js, Self::Json, Self::Scss, Self::Md];

    /// File extension without the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Js => "js",
            Self::Json => "json",
            Self::Md => "md",
            Self::Xml => "xml",
            Self::H => "h",
        }
    }

    /// HTTP content type used when serving an artifact of this format.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Css => "text/css",
            Self::Scss => "text/x-scss",
            Self::Js => "application/javascript",
            Self::Json => "application/json",
            Self::Md => "text/markdown",
            Self::Xml => "application/xml",
            Self::H => "text/x-c",
        }
    }

    /// Parses a lookup format, accepting only [`Format::SERVABLE`] values.
    pub fn parse_servable(raw: &str) -> Option<Self> {
        Self::SERVABLE
            .into_iter()
            .find(|format| format.extension() == raw)
    }

    /// Comma-separated list of servable formats, for error messages.
    pub fn servable_list() -> String {
        Self::SERVABLE
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A build target with its own output directory convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    /// Per-brand web artifacts, generic plus one per category
    WebGlobal,
    /// Brand-agnostic theme artifacts
    WebThemes,
    /// Android XML resources
    Android,
    /// iOS macro header
    Ios,
}

impl Platform {
    /// Every platform, in the default build order.
    pub const ALL: [Self; 4] = [Self::WebGlobal, Self::WebThemes, Self::Ios, Self::Android];

    /// Identifier used in configuration files and descriptors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::WebGlobal => "webGlobal",
            Self::WebThemes => "webThemes",
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }

    /// Transform group the compilation engine applies for this platform.
    pub const fn transform_group(self) -> TransformGroup {
        match self {
            Self::WebGlobal | Self::WebThemes => TransformGroup::Web,
            Self::Android => TransformGroup::Android,
            Self::Ios => TransformGroup::Ios,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.name() == s)
            .ok_or_else(|| {
                format!(
                    "unknown platform '{s}' (expected one of: webGlobal, webThemes, ios, android)"
                )
            })
    }
}

/// Named set of value/name transforms applied by the compilation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformGroup {
    /// Kebab-case names
    Web,
    /// snake_case names
    Android,
    /// PascalCase names
    Ios,
}

/// Renderer selection for one output file.
///
/// Serialized with the identifiers the compilation engine knows them by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Renderer {
    /// `scss/variables`
    #[serde(rename = "scss/variables")]
    ScssVariables,
    /// `css/variables`
    #[serde(rename = "css/variables")]
    CssVariables,
    /// `javascript/module-flat`
    #[serde(rename = "javascript/module-flat")]
    JavascriptModuleFlat,
    /// `json/flat`
    #[serde(rename = "json/flat")]
    JsonFlat,
    /// `android/strings`
    #[serde(rename = "android/strings")]
    AndroidStrings,
    /// `android/colors`
    #[serde(rename = "android/colors")]
    AndroidColors,
    /// `ios/macros`
    #[serde(rename = "ios/macros")]
    IosMacros,
}

impl Renderer {
    /// Renderer for a web format. Non-web formats have no web renderer.
    pub const fn for_web(format: Format) -> Option<Self> {
        match format {
            Format::Scss => Some(Self::ScssVariables),
            Format::Css => Some(Self::CssVariables),
            Format::Js => Some(Self::JavascriptModuleFlat),
            Format::Json => Some(Self::JsonFlat),
            Format::Md | Format::Xml | Format::H => None,
        }
    }
}
