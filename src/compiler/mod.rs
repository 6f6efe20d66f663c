//! Compilation engines executing build descriptors.
//!
//! The orchestrator only talks to [`TokenCompiler`]; which engine runs is a
//! configuration choice ([`CompilerConfig`]).

mod command;
mod mock;
mod native;
mod render;
mod source;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::CompilerConfig;
use crate::models::Platform;
use crate::planner::BuildDescriptor;

pub use command::CommandCompiler;
pub use mock::MockCompiler;
pub use native::NativeCompiler;
pub use source::load_tokens;

/// Errors raised while compiling one (brand, platform) cell.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The descriptor has no block for the requested platform.
    #[error("Descriptor has no configuration for platform '{0}'")]
    MissingPlatform(Platform),

    /// A source file or directory could not be read.
    #[error("Failed to read token source {}", .path.display())]
    ReadSource {
        /// File or directory that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A source file is not valid JSON/JSON5.
    #[error("Failed to parse token source {}: {reason}", .path.display())]
    ParseSource {
        /// File that failed
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A `{a.b}` reference names no token.
    #[error("Token '{token}' references unknown token '{reference}'")]
    UnresolvedReference {
        /// Referencing token path
        token: String,
        /// Referenced path
        reference: String,
    },

    /// References form a cycle.
    #[error("Circular reference while resolving token '{token}'")]
    CircularReference {
        /// Token where the cycle was detected
        token: String,
    },

    /// An output file could not be written.
    #[error("Failed to write {}", .path.display())]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The descriptor could not be serialized for an external engine.
    #[error("Failed to serialize build descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),

    /// An external engine could not be started.
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An external engine exited unsuccessfully.
    #[error("{program} failed for {platform} (exit code {code:?}): {stderr}")]
    CommandFailed {
        /// Program name
        program: String,
        /// Platform being built
        platform: Platform,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Simulated failure from [`MockCompiler`].
    #[error("{0}")]
    Simulated(String),
}

/// A compilation engine, allowing mock injection for tests.
pub trait TokenCompiler: Send + Sync {
    /// Short engine name for logs and reports.
    fn name(&self) -> &str;

    /// Builds one platform of a descriptor.
    ///
    /// Blocks until every file is written. Returns the written paths in
    /// descriptor order.
    fn build_platform(
        &self,
        descriptor: &BuildDescriptor,
        platform: Platform,
    ) -> Result<Vec<PathBuf>, CompileError>;
}

/// Creates the engine selected in configuration.
pub fn from_config(config: &CompilerConfig) -> Arc<dyn TokenCompiler> {
    match config {
        CompilerConfig::Native => Arc::new(NativeCompiler),
        CompilerConfig::Command { program, args } => {
            Arc::new(CommandCompiler::new(program.clone(), args.clone()))
        }
    }
}
