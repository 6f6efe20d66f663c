//! Application-wide constants.
//!
//! Defaults mirror the layout the design-system repository has always used,
//! so a missing config file still builds and serves the same tree.

/// The display name of the application.
pub const APP_NAME: &str = "tokenkit";

/// Project-local configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "tokenkit.toml";

/// Default raw token source root (one directory per brand).
pub const DEFAULT_SOURCE_ROOT: &str = "sd4/all-tokens";

/// Default compiled output root.
pub const DEFAULT_BUILD_ROOT: &str = "build";

/// Brands built when no configuration overrides them.
pub const DEFAULT_BRANDS: &[&str] = &["brand-a", "brand-b", "brand-a-theme", "brand-b-theme"];

/// Theme identifiers emitted by the `webThemes` platform.
pub const DEFAULT_THEMES: &[&str] = &[
    "themeEDSMUI",
    "themeEDSChameleonMUI",
    "themeAFIMUI",
    "themeAFIChameleonMUI",
];

/// Name of the generic, unfiltered web artifact (`tokens.<format>`).
pub const GENERIC_TOKEN_TYPE: &str = "tokens";

/// Category used for the Android color resource file.
pub const COLOR_CATEGORY: &str = "color";

/// Default HTTP port for the token server.
pub const DEFAULT_PORT: u16 = 3000;
