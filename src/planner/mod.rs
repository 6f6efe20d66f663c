//! Build planning: category discovery, build descriptors and orchestration.
//!
//! The planner turns the configured brand/platform matrix and the raw source
//! tree into one [`BuildDescriptor`] per (brand, platform) cell. The
//! [`BuildOrchestrator`] hands those descriptors to a
//! [`TokenCompiler`](crate::compiler::TokenCompiler), one at a time.

pub mod descriptor;
pub mod orchestrator;
pub mod registry;
mod staging;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::{BuildSettings, PathConfig};
use crate::models::{CategoryRegistry, Platform};
use crate::resolver::is_safe_segment;

pub use descriptor::{BuildDescriptor, FileDescriptor, PlatformDescriptor};
pub use orchestrator::{ArtifactRecord, BuildOrchestrator, BuildReport, CellOutcome, CellReport};

/// Errors raised while planning a build. All of them are configuration
/// errors: nothing has been built when they occur.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A configured brand has no raw source directory.
    #[error("No source directory for brand '{brand}' at {}", .path.display())]
    MissingSourceDirectory {
        /// Brand identifier
        brand: String,
        /// Expected directory
        path: PathBuf,
    },

    /// A brand's source directory exists but could not be listed.
    #[error("Failed to read source directory for brand '{brand}' at {}", .path.display())]
    UnreadableSourceDirectory {
        /// Brand identifier
        brand: String,
        /// Directory that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configured theme cannot be used as an output path segment.
    #[error("Invalid theme identifier '{0}': must be a single path segment")]
    InvalidTheme(String),

    /// A descriptor was requested for a brand that was never scanned.
    #[error("Brand '{0}' is not in the category registry")]
    UnknownBrand(String),
}

/// One (brand, platform) pair of the build matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCell {
    /// Brand identifier
    pub brand: String,
    /// Target platform
    pub platform: Platform,
    /// Set when the cell is part of the matrix but should not run
    pub skip_reason: Option<String>,
}

/// Derives categories and build descriptors from explicit configuration.
#[derive(Debug, Clone)]
pub struct BuildPlanner {
    paths: PathConfig,
    settings: BuildSettings,
}

impl BuildPlanner {
    /// Creates a planner for a set of paths and build settings.
    pub fn new(paths: PathConfig, settings: BuildSettings) -> Self {
        Self { paths, settings }
    }

    /// Paths this planner reads from and writes to.
    pub fn paths(&self) -> &PathConfig {
        &self.paths
    }

    /// Build settings this planner was created with.
    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Scans the raw source tree of every configured brand.
    ///
    /// Theme identifiers are checked first since they become output paths.
    pub fn scan(&self) -> Result<CategoryRegistry, PlanError> {
        if let Some(theme) = self.settings.themes.iter().find(|t| !is_safe_segment(t)) {
            return Err(PlanError::InvalidTheme(theme.clone()));
        }
        registry::scan_categories(&self.paths.source_root, &self.settings.brands)
    }

    /// The build matrix in brand-major, platform-minor order.
    ///
    /// Every brand writes `webThemes` to the same brand-agnostic paths, each
    /// from its own sources, so a later brand overwrites an earlier one. With
    /// `dedupe_themes` only the last brand builds `webThemes`; earlier brands
    /// carry a skip reason.
    pub fn cells(&self) -> Vec<BuildCell> {
        let theme_brand = self.settings.brands.last();
        let mut cells = Vec::new();

        for brand in &self.settings.brands {
            for &platform in &self.settings.platforms {
                let skip_reason = if platform == Platform::WebThemes
                    && self.settings.dedupe_themes
                    && Some(brand) != theme_brand
                {
                    debug!("Skipping webThemes for {}: a later brand overwrites it", brand);
                    Some("theme output is overwritten by a later brand".to_string())
                } else {
                    None
                };

                cells.push(BuildCell {
                    brand: brand.clone(),
                    platform,
                    skip_reason,
                });
            }
        }

        cells
    }

    /// Descriptor for one cell, writing under the configured build root.
    pub fn descriptor(
        &self,
        registry: &CategoryRegistry,
        brand: &str,
        platform: Platform,
    ) -> Result<BuildDescriptor, PlanError> {
        self.descriptor_in(registry, brand, platform, &self.paths.build_root)
    }

    /// Descriptor for one cell, writing under `build_root` instead of the
    /// configured root (used for staged builds).
    pub fn descriptor_in(
        &self,
        registry: &CategoryRegistry,
        brand: &str,
        platform: Platform,
        build_root: &Path,
    ) -> Result<BuildDescriptor, PlanError> {
        if !registry.contains_brand(brand) {
            return Err(PlanError::UnknownBrand(brand.to_string()));
        }

        Ok(descriptor::generate(
            registry,
            &self.settings.themes,
            &self.paths.brand_source_dir(brand),
            build_root,
            brand,
            platform,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(brands: &[&str], dedupe_themes: bool) -> BuildPlanner {
        let settings = BuildSettings {
            brands: brands.iter().map(|s| (*s).to_string()).collect(),
            dedupe_themes,
            ..BuildSettings::default()
        };
        BuildPlanner::new(PathConfig::default(), settings)
    }

    #[test]
    fn test_cells_are_brand_major() {
        let cells = planner(&["a", "b"], false).cells();
        let order: Vec<_> = cells
            .iter()
            .map(|c| format!("{}:{}", c.brand, c.platform))
            .collect();

        assert_eq!(
            order,
            vec![
                "a:webGlobal",
                "a:webThemes",
                "a:ios",
                "a:android",
                "b:webGlobal",
                "b:webThemes",
                "b:ios",
                "b:android"
            ]
        );
        assert!(cells.iter().all(|c| c.skip_reason.is_none()));
    }

    #[test]
    fn test_dedupe_themes_keeps_last_brand() {
        let cells = planner(&["a", "b", "c"], true).cells();
        let skipped: Vec<_> = cells
            .iter()
            .filter(|c| c.skip_reason.is_some())
            .map(|c| (c.brand.as_str(), c.platform))
            .collect();

        assert_eq!(
            skipped,
            vec![("a", Platform::WebThemes), ("b", Platform::WebThemes)]
        );
    }

    #[test]
    fn test_scan_rejects_path_like_theme() {
        let mut planner = planner(&["a"], false);
        planner.settings.themes = vec!["../escaped".to_string()];

        let err = planner.scan().unwrap_err();
        assert!(matches!(err, PlanError::InvalidTheme(ref theme) if theme == "../escaped"));
    }

    #[test]
    fn test_descriptor_for_unscanned_brand_fails() {
        let planner = planner(&["a"], false);
        let err = planner
            .descriptor(&CategoryRegistry::new(), "a", Platform::Ios)
            .unwrap_err();
        assert!(matches!(err, PlanError::UnknownBrand(_)));
    }
}
