//! Compiled artifact lookup.
//!
//! Maps a (brand, token type, format) request onto a file under
//! `<build_root>/web/global/<brand>/<format>/`, and answers the discovery
//! queries (brands, token types) the serving layer exposes.
//!
//! # Resolution order
//!
//! 1. `format` must be one of the servable formats; nothing on disk is
//!    touched otherwise.
//! 2. `<brand>-<tokenType>.<format>`
//! 3. `tokens.<format>`, only when `tokenType == "tokens"`
//!
//! Without a token type the best available artifact is picked: the first
//! (by name) whose token type contains `color`, else the first.

mod listing;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::constants::{COLOR_CATEGORY, GENERIC_TOKEN_TYPE};
use crate::models::Format;

pub use listing::Listing;

static SAFE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("valid regex"));

/// True if `value` can be used as one path segment without escaping its parent.
pub fn is_safe_segment(value: &str) -> bool {
    SAFE_SEGMENT.is_match(value) && !value.contains("..")
}

/// Errors returned by [`Resolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The requested format is not servable.
    #[error("Invalid format '{format}'. Supported: {supported}")]
    InvalidFormat {
        /// Format as requested
        format: String,
        /// Comma-separated list of servable formats
        supported: String,
    },

    /// A brand or token type is not a plain path segment.
    #[error("Invalid {field} '{value}'")]
    InvalidIdentifier {
        /// Which request field was rejected ("brand" or "token type")
        field: &'static str,
        /// Rejected value
        value: String,
    },

    /// No artifact exists for the requested token type.
    #[error("Token type '{token_type}' for brand '{brand}' with format '{format}' not found")]
    NotFound {
        /// Requested brand
        brand: String,
        /// Requested token type
        token_type: String,
        /// Requested format
        format: Format,
        /// Token types that do exist for this brand and format
        available_token_types: Vec<String>,
        /// Where the artifact was expected
        expected_path: String,
    },

    /// The brand has no directory for this format.
    #[error("Brand '{brand}' with format '{format}' not found or directory doesn't exist")]
    FormatDirectoryMissing {
        /// Requested brand
        brand: String,
        /// Requested format
        format: Format,
    },

    /// The format directory exists but holds no artifacts.
    #[error("No {format} files found for brand '{brand}'")]
    NoArtifacts {
        /// Requested brand
        brand: String,
        /// Requested format
        format: Format,
    },
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArtifact {
    /// Path of the artifact on disk.
    pub path: PathBuf,
    /// Format of the artifact.
    pub format: Format,
    /// Token type the artifact was resolved as.
    pub token_type: String,
}

impl ResolvedArtifact {
    /// HTTP content type for the artifact.
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Artifacts available for one brand, grouped by format directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandInventory {
    /// Brand identifier
    pub brand: String,
    /// Format directory name paired with the artifact file names it holds
    pub formats: Vec<(String, Vec<String>)>,
}

/// Checks the format, then the brand, before any filesystem access.
fn validate_request(brand: &str, format: &str) -> Result<Format, LookupError> {
    let format = Format::parse_servable(format).ok_or_else(|| LookupError::InvalidFormat {
        format: format.to_string(),
        supported: Format::servable_list(),
    })?;

    if !is_safe_segment(brand) {
        return Err(LookupError::InvalidIdentifier {
            field: "brand",
            value: brand.to_string(),
        });
    }

    Ok(format)
}

/// Resolves lookup requests against a compiled-output tree.
#[derive(Debug, Clone)]
pub struct Resolver {
    global_dir: PathBuf,
}

impl Resolver {
    /// Creates a resolver rooted at the per-brand web artifact directory
    /// (usually `<build_root>/web/global`).
    pub fn new(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_dir: global_dir.into(),
        }
    }

    /// Root directory this resolver reads from.
    pub fn global_dir(&self) -> &Path {
        &self.global_dir
    }

    /// Lists brands: the subdirectories of the global directory.
    pub fn list_brands(&self) -> Listing {
        Listing::read(&self.global_dir, |entry| {
            entry
                .file_type()
                .ok()
                .filter(std::fs::FileType::is_dir)
                .and_then(|_| entry.file_name().to_str().map(str::to_string))
        })
    }

    /// Lists token types for a brand and format.
    ///
    /// The format and brand are validated as in [`Resolver::resolve`]. Files
    /// ending in `.<format>` are reported with the `<brand>-` prefix
    /// stripped; `tokens.<format>` is reported as `tokens`. A missing format
    /// directory is [`Listing::Absent`], not an error.
    pub fn list_token_types(&self, brand: &str, format: &str) -> Result<Listing, LookupError> {
        let format = validate_request(brand, format)?;
        Ok(self.token_types_in(brand, format))
    }

    fn token_types_in(&self, brand: &str, format: Format) -> Listing {
        let suffix = format!(".{}", format.extension());
        let prefix = format!("{brand}-");
        Listing::read(&self.format_dir(brand, format), |entry| {
            let name = entry.file_name().to_str()?.to_string();
            let stem = name.strip_suffix(&suffix)?;
            Some(stem.strip_prefix(&prefix).unwrap_or(stem).to_string())
        })
    }

    /// Resolves a lookup request.
    ///
    /// `token_type == None` selects the best available artifact instead of a
    /// specific category.
    pub fn resolve(
        &self,
        brand: &str,
        token_type: Option<&str>,
        format: &str,
    ) -> Result<ResolvedArtifact, LookupError> {
        let format = validate_request(brand, format)?;

        match token_type {
            Some(token_type) => {
                if !is_safe_segment(token_type) {
                    return Err(LookupError::InvalidIdentifier {
                        field: "token type",
                        value: token_type.to_string(),
                    });
                }
                self.resolve_token_type(brand, token_type, format)
            }
            None => self.resolve_best_available(brand, format),
        }
    }

    fn format_dir(&self, brand: &str, format: Format) -> PathBuf {
        self.global_dir.join(brand).join(format.extension())
    }

    fn resolve_token_type(
        &self,
        brand: &str,
        token_type: &str,
        format: Format,
    ) -> Result<ResolvedArtifact, LookupError> {
        let ext = format.extension();
        let format_dir = self.format_dir(brand, format);

        let primary = format_dir.join(format!("{brand}-{token_type}.{ext}"));
        debug!("Looking for token file at: {}", primary.display());
        if primary.is_file() {
            return Ok(ResolvedArtifact {
                path: primary,
                format,
                token_type: token_type.to_string(),
            });
        }

        if token_type == GENERIC_TOKEN_TYPE {
            let generic = format_dir.join(format!("{GENERIC_TOKEN_TYPE}.{ext}"));
            debug!("Looking for generic tokens file at: {}", generic.display());
            if generic.is_file() {
                return Ok(ResolvedArtifact {
                    path: generic,
                    format,
                    token_type: token_type.to_string(),
                });
            }
        }

        let mut available_token_types = self.token_types_in(brand, format).into_vec();
        available_token_types.sort();

        Err(LookupError::NotFound {
            brand: brand.to_string(),
            token_type: token_type.to_string(),
            format,
            available_token_types,
            expected_path: format!(
                "global/{brand}/{ext}/{brand}-{token_type}.{ext} or global/{brand}/{ext}/{GENERIC_TOKEN_TYPE}.{ext}"
            ),
        })
    }

    fn resolve_best_available(
        &self,
        brand: &str,
        format: Format,
    ) -> Result<ResolvedArtifact, LookupError> {
        let ext = format.extension();
        let format_dir = self.format_dir(brand, format);
        let suffix = format!(".{ext}");

        let mut files = match Listing::read(&format_dir, |entry| {
            entry
                .file_name()
                .to_str()
                .filter(|name| name.ends_with(&suffix))
                .map(str::to_string)
        }) {
            Listing::Absent => {
                return Err(LookupError::FormatDirectoryMissing {
                    brand: brand.to_string(),
                    format,
                })
            }
            other => other.into_vec(),
        };

        if files.is_empty() {
            return Err(LookupError::NoArtifacts {
                brand: brand.to_string(),
                format,
            });
        }

        files.sort();
        let prefix = format!("{brand}-");
        let token_type_of = |file: &str| -> String {
            let stem = file.strip_suffix(&suffix).unwrap_or(file);
            stem.strip_prefix(&prefix).unwrap_or(stem).to_string()
        };

        let chosen = files
            .iter()
            .find(|file| token_type_of(file).contains(COLOR_CATEGORY))
            .unwrap_or(&files[0]);

        debug!("Best available {} artifact for {}: {}", ext, brand, chosen);

        Ok(ResolvedArtifact {
            path: format_dir.join(chosen),
            format,
            token_type: token_type_of(chosen),
        })
    }

    /// Walks brands and their format directories, listing artifact files.
    pub fn inventory(&self) -> Vec<BrandInventory> {
        let mut brands = self.list_brands().into_vec();
        brands.sort();

        brands
            .into_iter()
            .map(|brand| {
                let brand_dir = self.global_dir.join(&brand);
                let mut format_names = Listing::read(&brand_dir, |entry| {
                    entry
                        .file_type()
                        .ok()
                        .filter(std::fs::FileType::is_dir)
                        .and_then(|_| entry.file_name().to_str().map(str::to_string))
                })
                .into_vec();
                format_names.sort();

                let formats = format_names
                    .into_iter()
                    .map(|format| {
                        let suffix = format!(".{format}");
                        let mut files = Listing::read(&brand_dir.join(&format), |entry| {
                            entry
                                .file_name()
                                .to_str()
                                .filter(|name| name.ends_with(&suffix))
                                .map(str::to_string)
                        })
                        .into_vec();
                        files.sort();
                        (format, files)
                    })
                    .collect();

                BrandInventory { brand, formats }
            })
            .collect()
    }
}
