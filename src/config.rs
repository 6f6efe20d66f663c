//! Configuration management for the token build and resolver.
//!
//! This module handles loading, validating, and saving configuration in TOML
//! format. Configuration is always passed explicitly to the planner and the
//! resolver, so several configurations (fixtures, production) can coexist.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    APP_NAME, CONFIG_FILE_NAME, DEFAULT_BRANDS, DEFAULT_BUILD_ROOT, DEFAULT_PORT,
    DEFAULT_SOURCE_ROOT, DEFAULT_THEMES,
};
use crate::models::Platform;
use crate::resolver::is_safe_segment;

/// File system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Raw token sources, one directory per brand (e.g., "sd4/all-tokens")
    pub source_root: PathBuf,
    /// Compiled output root (e.g., "build")
    pub build_root: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
            build_root: PathBuf::from(DEFAULT_BUILD_ROOT),
        }
    }
}

impl PathConfig {
    /// Directory holding per-brand web artifacts (`<build_root>/web/global`).
    pub fn global_dir(&self) -> PathBuf {
        self.build_root.join("web").join("global")
    }

    /// Raw source directory for a brand.
    pub fn brand_source_dir(&self, brand: &str) -> PathBuf {
        self.source_root.join(brand)
    }
}

/// What the orchestrator does when one (brand, platform) build fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Build every remaining cell and report all failures at the end
    #[default]
    Collect,
    /// Abort the run on the first failing cell
    FailFast,
}

/// Which compilation engine executes build descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompilerConfig {
    /// Built-in renderer
    #[default]
    Native,
    /// External program receiving the descriptor as JSON on stdin
    Command {
        /// Program to execute (e.g., "node")
        program: String,
        /// Arguments placed before the platform name
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Build matrix settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Brands to build, in build order
    pub brands: Vec<String>,
    /// Theme identifiers emitted by `webThemes`
    pub themes: Vec<String>,
    /// Platforms to build for each brand, in build order
    pub platforms: Vec<Platform>,
    /// Per-cell failure handling
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Build `webThemes` once instead of once per brand (its output ignores the brand)
    #[serde(default)]
    pub dedupe_themes: bool,
    /// Compilation engine
    #[serde(default)]
    pub compiler: CompilerConfig,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            brands: DEFAULT_BRANDS.iter().map(|s| (*s).to_string()).collect(),
            themes: DEFAULT_THEMES.iter().map(|s| (*s).to_string()).collect(),
            platforms: Platform::ALL.to_vec(),
            failure_policy: FailurePolicy::default(),
            dedupe_themes: false,
            compiler: CompilerConfig::default(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// 1. `--config <file>` when given
/// 2. `./tokenkit.toml`
/// 3. Linux: `~/.config/tokenkit/config.toml`, macOS:
///    `~/Library/Application Support/tokenkit/config.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Build matrix
    #[serde(default)]
    pub build: BuildSettings,
    /// HTTP server
    #[serde(default)]
    pub serve: ServeConfig,
}

impl Config {
    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the user-level config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, the project-local file and
    /// then the user-level file are tried; if neither exists the defaults are
    /// returned.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Ok(user) = Self::config_file_path() {
            if user.exists() {
                return Self::load_from(&user);
            }
        }

        Ok(Self::default())
    }

    /// Loads and validates configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the user-level config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to a file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        // Atomic rename
        fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename temp config file to: {}", path.display())
        })?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - brand, theme and platform lists are non-empty and free of duplicates
    /// - every brand and theme is a single safe path segment
    pub fn validate(&self) -> Result<()> {
        if self.build.brands.is_empty() {
            anyhow::bail!("No brands configured");
        }
        if self.build.themes.is_empty() {
            anyhow::bail!("No themes configured");
        }
        if self.build.platforms.is_empty() {
            anyhow::bail!("No platforms configured");
        }

        for brand in &self.build.brands {
            if !is_safe_segment(brand) {
                anyhow::bail!("Invalid brand identifier '{brand}': must be a single path segment");
            }
        }
        for theme in &self.build.themes {
            if !is_safe_segment(theme) {
                anyhow::bail!("Invalid theme identifier '{theme}': must be a single path segment");
            }
        }

        check_unique("brand", self.build.brands.iter().map(String::as_str))?;
        check_unique("theme", self.build.themes.iter().map(String::as_str))?;
        check_unique("platform", self.build.platforms.iter().map(|p| p.name()))?;

        if let CompilerConfig::Command { program, .. } = &self.build.compiler {
            if program.trim().is_empty() {
                anyhow::bail!("Command compiler requires a program");
            }
        }

        Ok(())
    }
}

fn check_unique<'a>(kind: &str, values: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            anyhow::bail!("Duplicate {kind} '{value}' in configuration");
        }
    }
    Ok(())
}
