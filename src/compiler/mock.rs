//! Mock compilation engine for testing.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{CompileError, TokenCompiler};
use crate::models::Platform;
use crate::planner::BuildDescriptor;

/// Writes placeholder content to every output path of a descriptor, failing
/// for the configured (brand, platform) cells.
#[derive(Debug, Default)]
pub struct MockCompiler {
    /// Cells that fail with [`CompileError::Simulated`].
    pub failures: Vec<(String, Platform)>,
    calls: Mutex<Vec<(String, Platform)>>,
}

impl MockCompiler {
    /// A mock that fails exactly the given cells.
    pub fn failing(failures: &[(&str, Platform)]) -> Self {
        Self {
            failures: failures
                .iter()
                .map(|(brand, platform)| ((*brand).to_string(), *platform))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Cells built so far, in call order.
    pub fn calls(&self) -> Vec<(String, Platform)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl TokenCompiler for MockCompiler {
    fn name(&self) -> &str {
        "mock"
    }

    fn build_platform(
        &self,
        descriptor: &BuildDescriptor,
        platform: Platform,
    ) -> Result<Vec<PathBuf>, CompileError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((descriptor.brand.clone(), platform));
        }

        if self
            .failures
            .iter()
            .any(|(brand, p)| *brand == descriptor.brand && *p == platform)
        {
            return Err(CompileError::Simulated(format!(
                "Mock build failed for {} [{}]",
                descriptor.brand, platform
            )));
        }

        let mut written = Vec::new();
        for path in descriptor.output_paths(platform) {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| CompileError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, b"mock token content").map_err(|source| CompileError::Write {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }

        Ok(written)
    }
}
