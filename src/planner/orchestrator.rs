//! Sequential brand × platform build driver.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use super::staging::StagingDir;
use super::BuildPlanner;
use crate::compiler::{self, TokenCompiler};
use crate::config::{Config, FailurePolicy};
use crate::models::Platform;

/// A file written by a cell, relative to the build root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    /// Path relative to the build root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// SHA256 hash (hex)
    pub sha256: String,
}

impl ArtifactRecord {
    fn from_file(root: &Path, path: &Path) -> std::io::Result<Self> {
        let size = fs::metadata(path)?.len();
        let sha256 = calculate_sha256(path)?;
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        Ok(Self {
            path: relative,
            size,
            sha256,
        })
    }
}

/// Calculates the SHA256 hash of a file.
fn calculate_sha256(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Result of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CellOutcome {
    /// The engine completed; the files it wrote.
    Built {
        /// Written files
        artifacts: Vec<ArtifactRecord>,
    },
    /// The engine failed.
    Failed {
        /// Error message
        error: String,
    },
    /// The cell did not run.
    Skipped {
        /// Why the cell was skipped
        reason: String,
    },
}

/// One (brand, platform) row of a build report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellReport {
    /// Brand identifier
    pub brand: String,
    /// Target platform
    pub platform: Platform,
    /// What happened
    #[serde(flatten)]
    pub outcome: CellOutcome,
}

/// Summary of a full build run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Published build root
    pub build_root: PathBuf,
    /// Whether the staged output replaced the build root
    pub published: bool,
    /// Every cell of the matrix, in build order
    pub cells: Vec<CellReport>,
}

impl BuildReport {
    /// True if any cell failed.
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Failed cells with their error messages.
    pub fn failures(&self) -> impl Iterator<Item = (&CellReport, &str)> {
        self.cells.iter().filter_map(|cell| match &cell.outcome {
            CellOutcome::Failed { error } => Some((cell, error.as_str())),
            _ => None,
        })
    }

    /// Total number of files written across all cells.
    pub fn artifact_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| match &cell.outcome {
                CellOutcome::Built { artifacts } => artifacts.len(),
                _ => 0,
            })
            .sum()
    }
}

/// Drives every cell of the build matrix through a [`TokenCompiler`].
pub struct BuildOrchestrator {
    planner: BuildPlanner,
    compiler: Arc<dyn TokenCompiler>,
}

impl BuildOrchestrator {
    /// Creates an orchestrator with an explicit engine.
    pub fn new(planner: BuildPlanner, compiler: Arc<dyn TokenCompiler>) -> Self {
        Self { planner, compiler }
    }

    /// Creates an orchestrator with the engine selected in configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            BuildPlanner::new(config.paths.clone(), config.build.clone()),
            compiler::from_config(&config.build.compiler),
        )
    }

    /// Runs the full matrix, one cell at a time.
    ///
    /// Categories for every brand are scanned before any cell runs; a scan
    /// failure aborts the run with nothing written. Cells build into a
    /// staging tree that replaces the build root only when no cell failed.
    pub fn run(&self) -> Result<BuildReport> {
        let started_at = Utc::now();
        let build_root = self.planner.paths().build_root.clone();
        let policy = self.planner.settings().failure_policy;

        info!("Build started ({} compiler)...", self.compiler.name());

        let registry = self
            .planner
            .scan()
            .context("Failed to derive category registry")?;

        let staging = StagingDir::create(&build_root)?;
        let mut reports = Vec::new();
        let mut aborted = false;

        for cell in self.planner.cells() {
            if aborted {
                reports.push(CellReport {
                    brand: cell.brand,
                    platform: cell.platform,
                    outcome: CellOutcome::Skipped {
                        reason: "run aborted after an earlier failure".to_string(),
                    },
                });
                continue;
            }

            info!("==============================================");
            info!("Processing: [{}] [{}]", cell.platform, cell.brand);

            if let Some(reason) = cell.skip_reason {
                info!("Skipped: {}", reason);
                reports.push(CellReport {
                    brand: cell.brand,
                    platform: cell.platform,
                    outcome: CellOutcome::Skipped { reason },
                });
                continue;
            }

            let descriptor = self
                .planner
                .descriptor_in(&registry, &cell.brand, cell.platform, staging.path())?;

            let outcome = match self.compiler.build_platform(&descriptor, cell.platform) {
                Ok(paths) => paths
                    .iter()
                    .map(|path| ArtifactRecord::from_file(staging.path(), path))
                    .collect::<std::io::Result<Vec<_>>>()
                    .map_or_else(
                        |e| CellOutcome::Failed {
                            error: format!("Failed to read build output: {e}"),
                        },
                        |artifacts| CellOutcome::Built { artifacts },
                    ),
                Err(e) => CellOutcome::Failed {
                    error: e.to_string(),
                },
            };

            if let CellOutcome::Failed { error } = &outcome {
                error!("Build failed for [{}] [{}]: {}", cell.platform, cell.brand, error);
                aborted = policy == FailurePolicy::FailFast;
            }

            reports.push(CellReport {
                brand: cell.brand,
                platform: cell.platform,
                outcome,
            });

            info!("End processing");
        }

        let mut report = BuildReport {
            started_at,
            finished_at: Utc::now(),
            build_root: build_root.clone(),
            published: false,
            cells: reports,
        };

        if report.has_failures() {
            warn!(
                "{} cell(s) failed; {} left untouched",
                report.failures().count(),
                build_root.display()
            );
            drop(staging);
        } else {
            staging.publish()?;
            report.published = true;
            info!("==============================================");
            info!("Build completed! {} file(s) written", report.artifact_count());
        }

        report.finished_at = Utc::now();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::MockCompiler;
    use crate::config::{BuildSettings, PathConfig};
    use tempfile::TempDir;

    fn setup(brands: &[&str], policy: FailurePolicy) -> (TempDir, BuildPlanner) {
        let temp_dir = TempDir::new().unwrap();
        for brand in brands {
            let dir = temp_dir.path().join("src").join(brand);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("color.json"), "{}").unwrap();
        }
        let paths = PathConfig {
            source_root: temp_dir.path().join("src"),
            build_root: temp_dir.path().join("build"),
        };
        let settings = BuildSettings {
            brands: brands.iter().map(|s| (*s).to_string()).collect(),
            themes: vec!["themeA".to_string()],
            platforms: vec![Platform::WebGlobal, Platform::Ios],
            failure_policy: policy,
            ..BuildSettings::default()
        };
        (temp_dir, BuildPlanner::new(paths, settings))
    }

    #[test]
    fn test_successful_run_publishes_with_hashes() {
        let (temp_dir, planner) = setup(&["acme"], FailurePolicy::Collect);
        let compiler = Arc::new(MockCompiler::default());
        let report = BuildOrchestrator::new(planner, compiler.clone()).run().unwrap();

        assert!(report.published);
        assert!(!report.has_failures());
        assert_eq!(report.artifact_count(), 9);
        assert!(temp_dir.path().join("build/web/global/acme/css/tokens.css").exists());
        assert!(temp_dir.path().join("build/ios/acme/tokens.h").exists());

        let CellOutcome::Built { artifacts } = &report.cells[1].outcome else {
            panic!("ios cell did not build");
        };
        assert_eq!(artifacts[0].path, PathBuf::from("ios/acme/tokens.h"));
        assert_eq!(artifacts[0].size, 18);
        assert_eq!(artifacts[0].sha256.len(), 64);
        assert_eq!(
            compiler.calls(),
            vec![
                ("acme".to_string(), Platform::WebGlobal),
                ("acme".to_string(), Platform::Ios)
            ]
        );
    }

    #[test]
    fn test_collect_policy_builds_remaining_cells() {
        let (temp_dir, planner) = setup(&["a", "b"], FailurePolicy::Collect);
        fs::create_dir_all(temp_dir.path().join("build")).unwrap();
        fs::write(temp_dir.path().join("build/previous.txt"), "old").unwrap();

        let compiler = Arc::new(MockCompiler::failing(&[("a", Platform::Ios)]));
        let report = BuildOrchestrator::new(planner, compiler.clone()).run().unwrap();

        assert!(!report.published);
        assert_eq!(compiler.calls().len(), 4);
        let failed: Vec<_> = report
            .failures()
            .map(|(cell, _)| (cell.brand.as_str(), cell.platform))
            .collect();
        assert_eq!(failed, vec![("a", Platform::Ios)]);

        // Published tree untouched, staging discarded
        assert!(temp_dir.path().join("build/previous.txt").exists());
        assert!(!temp_dir.path().join("build/ios").exists());
        let leftovers = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .contains("staging")
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_fail_fast_skips_remaining_cells() {
        let (_temp_dir, planner) = setup(&["a", "b"], FailurePolicy::FailFast);
        let compiler = Arc::new(MockCompiler::failing(&[("a", Platform::WebGlobal)]));
        let report = BuildOrchestrator::new(planner, compiler.clone()).run().unwrap();

        assert_eq!(compiler.calls().len(), 1);
        assert_eq!(report.cells.len(), 4);
        assert!(report.cells[1..]
            .iter()
            .all(|c| matches!(c.outcome, CellOutcome::Skipped { .. })));
    }

    #[test]
    fn test_missing_source_directory_aborts_before_building() {
        let (temp_dir, planner) = setup(&["a"], FailurePolicy::Collect);
        let mut settings = planner.settings().clone();
        settings.brands.push("ghost".to_string());
        let planner = BuildPlanner::new(planner.paths().clone(), settings);

        let compiler = Arc::new(MockCompiler::default());
        let err = BuildOrchestrator::new(planner, compiler.clone())
            .run()
            .unwrap_err();

        assert!(format!("{err:#}").contains("ghost"));
        assert!(compiler.calls().is_empty());
        assert!(!temp_dir.path().join("build").exists());
    }
}
