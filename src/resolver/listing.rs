//! Directory listings that keep "absent" and "unreadable" apart from "empty".

use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Outcome of a discovery scan.
///
/// Discovery endpoints degrade every failure to an empty result so they stay
/// available while the tree is being rebuilt; this type records which kind of
/// empty it was so the caller can log or report the difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The directory was read; the selected names, possibly none.
    Entries(Vec<String>),
    /// The directory does not exist.
    Absent,
    /// The directory exists but could not be read.
    Unreadable {
        /// Directory that failed
        path: PathBuf,
        /// I/O error text
        reason: String,
    },
}

impl Listing {
    /// Reads `dir`, keeping the names `select` returns.
    pub fn read(dir: &Path, mut select: impl FnMut(&DirEntry) -> Option<String>) -> Self {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::Absent,
            Err(e) => {
                return Self::Unreadable {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => names.extend(select(&entry)),
                Err(e) => {
                    return Self::Unreadable {
                        path: dir.to_path_buf(),
                        reason: e.to_string(),
                    }
                }
            }
        }

        Self::Entries(names)
    }

    /// Collapses the listing to its names, logging why it is empty when it
    /// did not come from a successful read.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Entries(names) => names,
            Self::Absent => {
                debug!("Directory absent, treating as empty");
                Vec::new()
            }
            Self::Unreadable { path, reason } => {
                warn!("Error listing files in {}: {}", path.display(), reason);
                Vec::new()
            }
        }
    }
}
