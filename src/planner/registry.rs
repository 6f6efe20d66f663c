//! Category discovery from the raw source tree.

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use super::PlanError;
use crate::models::CategoryRegistry;

/// Scans `<source_root>/<brand>/` for every brand (non-recursively) and
/// registers one category per `*.json` file, named after the file stem.
///
/// Other entries are ignored. A brand without a source directory fails the
/// whole scan; there is no partial registry.
pub fn scan_categories(
    source_root: &Path,
    brands: &[String],
) -> Result<CategoryRegistry, PlanError> {
    let mut registry = CategoryRegistry::new();

    for brand in brands {
        let brand_dir = source_root.join(brand);
        let entries = fs::read_dir(&brand_dir).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                PlanError::MissingSourceDirectory {
                    brand: brand.clone(),
                    path: brand_dir.clone(),
                }
            } else {
                PlanError::UnreadableSourceDirectory {
                    brand: brand.clone(),
                    path: brand_dir.clone(),
                    source,
                }
            }
        })?;

        registry.add_brand(brand);

        for entry in entries {
            let entry = entry.map_err(|source| PlanError::UnreadableSourceDirectory {
                brand: brand.clone(),
                path: brand_dir.clone(),
                source,
            })?;

            let file_name = entry.file_name();
            let Some(category) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(".json"))
            else {
                continue;
            };

            if category.is_empty() {
                continue;
            }

            info!(brand = %brand, "category: {}", category);
            registry.register(brand, category);
        }
    }

    Ok(registry)
}
