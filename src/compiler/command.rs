//! External compilation engine invoked as a child process.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info};

use super::{CompileError, TokenCompiler};
use crate::models::Platform;
use crate::planner::BuildDescriptor;

/// Runs an external program per platform build.
///
/// The descriptor is written to the program's stdin as JSON and the platform
/// name is appended as the last argument. Success means exit status zero;
/// the files written are the descriptor's output paths that exist afterwards.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
}

impl CommandCompiler {
    /// Creates an engine running `program args... <platform>`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl TokenCompiler for CommandCompiler {
    fn name(&self) -> &str {
        &self.program
    }

    fn build_platform(
        &self,
        descriptor: &BuildDescriptor,
        platform: Platform,
    ) -> Result<Vec<PathBuf>, CompileError> {
        if descriptor.platform(platform).is_none() {
            return Err(CompileError::MissingPlatform(platform));
        }

        let payload = serde_json::to_vec(descriptor)?;

        info!("Running: {} {} {}", self.program, self.args.join(" "), platform);

        let spawn_err = |source| CompileError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(platform.name())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // stdin is fed from its own thread while stdout/stderr drain here, so
        // neither side blocks on a full pipe.
        let (output, fed) = thread::scope(|scope| {
            let feeder = child.stdin.take().map(|mut stdin| {
                let payload = &payload;
                scope.spawn(move || match stdin.write_all(payload) {
                    // A program that exits without reading stdin is judged by its exit status.
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    result => result,
                })
            });
            let output = child.wait_with_output();
            let fed = feeder.map_or(Ok(()), |handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")))
            });
            (output, fed)
        });
        let output = output.map_err(spawn_err)?;
        fed.map_err(spawn_err)?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("[{}] {}", self.program, line);
        }

        if !output.status.success() {
            return Err(CompileError::CommandFailed {
                program: self.program.clone(),
                platform,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(descriptor
            .output_paths(platform)
            .into_iter()
            .filter(|path| path.exists())
            .collect())
    }
}
