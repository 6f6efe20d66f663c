//! Staged output tree published by rename.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// A scratch build tree next to the published build root.
///
/// Dropping an unpublished staging directory removes it, so a failed or
/// aborted run never leaves partial output behind.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    target: PathBuf,
    published: bool,
}

fn sibling(target: &Path, tag: &str) -> PathBuf {
    let name = target
        .file_name()
        .map_or_else(|| "build".to_string(), |n| n.to_string_lossy().into_owned());
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    parent.join(format!(".{name}.{tag}-{}", uuid::Uuid::new_v4()))
}

impl StagingDir {
    /// Creates an empty staging directory for `target`.
    pub fn create(target: &Path) -> Result<Self> {
        let path = sibling(target, "staging");
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create staging directory {}", path.display()))?;
        debug!("Staging build output in {}", path.display());

        Ok(Self {
            path,
            target: target.to_path_buf(),
            published: false,
        })
    }

    /// Root the cells build into.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the target with the staged tree.
    ///
    /// This is two renames, not one: the previous tree moves aside, then the
    /// staged tree moves in. Readers never see a mix of old and new files,
    /// but between the renames the target does not exist. The previous tree
    /// is restored if the second rename fails.
    pub fn publish(mut self) -> Result<()> {
        let previous = if self.target.exists() {
            let aside = sibling(&self.target, "old");
            fs::rename(&self.target, &aside).with_context(|| {
                format!("Failed to move {} aside", self.target.display())
            })?;
            Some(aside)
        } else {
            if let Some(parent) = self.target.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
            None
        };

        if let Err(e) = fs::rename(&self.path, &self.target) {
            if let Some(aside) = &previous {
                if let Err(restore) = fs::rename(aside, &self.target) {
                    warn!(
                        "Failed to restore previous build from {}: {}",
                        aside.display(),
                        restore
                    );
                }
            }
            return Err(e).with_context(|| {
                format!(
                    "Failed to publish {} to {}",
                    self.path.display(),
                    self.target.display()
                )
            });
        }

        self.published = true;

        if let Some(aside) = previous {
            if let Err(e) = fs::remove_dir_all(&aside) {
                warn!("Failed to remove previous build {}: {}", aside.display(), e);
            }
        }

        Ok(())
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if !self.published && self.path.exists() {
            debug!("Discarding staging directory {}", self.path.display());
            if let Err(e) = fs::remove_dir_all(&self.path) {
                warn!("Failed to remove staging directory {}: {}", self.path.display(), e);
            }
        }
    }
}
