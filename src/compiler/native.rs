//! Built-in compilation engine.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::render::render;
use super::source::load_tokens;
use super::{CompileError, TokenCompiler};
use crate::models::{Platform, Token};
use crate::planner::BuildDescriptor;

/// Compiles descriptors in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCompiler;

/// Directory the descriptor's sources live in.
///
/// Descriptors read back from JSON carry only the glob, so the directory is
/// recovered from its non-wildcard prefix.
fn source_dir(descriptor: &BuildDescriptor) -> PathBuf {
    if !descriptor.source_dir.as_os_str().is_empty() {
        return descriptor.source_dir.clone();
    }

    descriptor
        .source
        .first()
        .map(|glob| {
            let prefix = glob.split("/**").next().unwrap_or(glob);
            PathBuf::from(prefix)
        })
        .unwrap_or_default()
}

fn write_file(path: &Path, contents: &str) -> Result<(), CompileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CompileError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| CompileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

impl TokenCompiler for NativeCompiler {
    fn name(&self) -> &str {
        "native"
    }

    fn build_platform(
        &self,
        descriptor: &BuildDescriptor,
        platform: Platform,
    ) -> Result<Vec<PathBuf>, CompileError> {
        let config = descriptor
            .platform(platform)
            .ok_or(CompileError::MissingPlatform(platform))?;

        let tokens = load_tokens(&source_dir(descriptor))?;
        debug!("{} tokens loaded for {} [{}]", tokens.len(), descriptor.brand, platform);

        let mut written = Vec::new();
        for file in &config.files {
            let selected: Vec<&Token> = tokens.iter().filter(|t| file.filter.matches(t)).collect();
            let path = config.output_path(file);

            if selected.is_empty() {
                warn!("No tokens matched {}, file not written", path.display());
                continue;
            }

            write_file(&path, &render(file.format, config.transform_group, &selected))?;
            debug!("✔︎ {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}
