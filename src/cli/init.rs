//! `init` command: write a starter configuration file.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::constants::CONFIG_FILE_NAME;

/// Write a configuration file populated with the defaults
#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Write the user-level config instead of ./tokenkit.toml
    #[arg(long, conflicts_with = "path")]
    pub user: bool,

    /// Destination file
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command with `config` as the starting point.
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let target = if self.user {
            Config::config_file_path().map_err(|e| CliError::io(format!("{e:#}")))?
        } else {
            self.path
                .clone()
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
        };

        if target.exists() && !self.force {
            return Err(CliError::validation(format!(
                "{} already exists (use --force to overwrite)",
                target.display()
            )));
        }

        write_config(config, &target, self.user)?;
        println!("Wrote {}", target.display());
        Ok(())
    }
}

fn write_config(config: &Config, target: &Path, user: bool) -> CliResult<()> {
    let result = if user {
        config.save()
    } else {
        config.save_to(target)
    };
    result.map_err(|e| CliError::io(format!("{e:#}")))
}
