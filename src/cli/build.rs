//! `build` command: compile every (brand, platform) cell.

use clap::Args;

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::{Config, FailurePolicy};
use crate::models::Platform;
use crate::planner::{BuildOrchestrator, CellOutcome};

/// Compile raw token sources into the build root
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Only build these brands (repeatable)
    #[arg(long = "brand", value_name = "BRAND")]
    pub brands: Vec<String>,

    /// Only build these platforms (repeatable)
    #[arg(long = "platform", value_name = "PLATFORM")]
    pub platforms: Vec<Platform>,

    /// Abort on the first failing cell
    #[arg(long)]
    pub fail_fast: bool,

    /// Build webThemes for the last brand only
    #[arg(long)]
    pub dedupe_themes: bool,

    /// Output the build report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Narrows the configured matrix to the requested brands and platforms,
/// keeping configured order.
pub(crate) fn restrict(
    config: &Config,
    brands: &[String],
    platforms: &[Platform],
) -> CliResult<Config> {
    let mut config = config.clone();

    if !brands.is_empty() {
        if let Some(unknown) = brands.iter().find(|b| !config.build.brands.contains(b)) {
            return Err(CliError::validation(format!(
                "Brand '{unknown}' is not configured"
            )));
        }
        config.build.brands.retain(|b| brands.contains(b));
    }

    if !platforms.is_empty() {
        config.build.platforms.retain(|p| platforms.contains(p));
        if config.build.platforms.is_empty() {
            return Err(CliError::validation("None of the requested platforms is configured"));
        }
    }

    Ok(config)
}

impl BuildArgs {
    /// Execute the build command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let mut config = restrict(config, &self.brands, &self.platforms)?;
        if self.fail_fast {
            config.build.failure_policy = FailurePolicy::FailFast;
        }
        if self.dedupe_themes {
            config.build.dedupe_themes = true;
        }

        let report = BuildOrchestrator::from_config(&config)
            .run()
            .map_err(|e| CliError::validation(format!("Build failed: {e:#}")))?;

        if self.json {
            print_json(&report)?;
        } else {
            for cell in &report.cells {
                let status = match &cell.outcome {
                    CellOutcome::Built { artifacts } => format!("{} file(s)", artifacts.len()),
                    CellOutcome::Failed { error } => format!("FAILED: {error}"),
                    CellOutcome::Skipped { reason } => format!("skipped ({reason})"),
                };
                println!("  {:<20} {:<10} {}", cell.brand, cell.platform, status);
            }
            println!();
            if report.published {
                println!(
                    "Published {} file(s) to {}",
                    report.artifact_count(),
                    report.build_root.display()
                );
            }
        }

        if report.has_failures() {
            return Err(CliError::validation(format!(
                "{} cell(s) failed; {} was not updated",
                report.failures().count(),
                report.build_root.display()
            )));
        }

        Ok(())
    }
}
