//! `plan` and `categories` commands: inspect a build without running it.

use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use crate::cli::build::restrict;
use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::Config;
use crate::models::{Platform, TokenFilter};
use crate::planner::{BuildDescriptor, BuildPlanner};

/// Print the build descriptors the build would hand to the compiler
#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Only plan these brands (repeatable)
    #[arg(long = "brand", value_name = "BRAND")]
    pub brands: Vec<String>,

    /// Only plan these platforms (repeatable)
    #[arg(long = "platform", value_name = "PLATFORM")]
    pub platforms: Vec<Platform>,

    /// Output the descriptors as JSON
    #[arg(long)]
    pub json: bool,
}

/// List categories discovered in the raw source tree
#[derive(Debug, Clone, Args)]
pub struct CategoriesArgs {
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlannedCell {
    brand: String,
    platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip_reason: Option<String>,
    descriptor: BuildDescriptor,
}

fn planner_for(config: &Config) -> BuildPlanner {
    BuildPlanner::new(config.paths.clone(), config.build.clone())
}

impl PlanArgs {
    /// Execute the plan command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let config = restrict(config, &self.brands, &self.platforms)?;
        let planner = planner_for(&config);
        let registry = planner
            .scan()
            .map_err(|e| CliError::validation(e.to_string()))?;

        let mut cells = Vec::new();
        for cell in planner.cells() {
            let descriptor = planner
                .descriptor(&registry, &cell.brand, cell.platform)
                .map_err(|e| CliError::validation(e.to_string()))?;
            cells.push(PlannedCell {
                brand: cell.brand,
                platform: cell.platform,
                skip_reason: cell.skip_reason,
                descriptor,
            });
        }

        if self.json {
            return print_json(&cells);
        }

        for cell in &cells {
            let Some(platform) = cell.descriptor.platform(cell.platform) else {
                continue;
            };
            let note = cell
                .skip_reason
                .as_ref()
                .map(|r| format!(" (skipped: {r})"))
                .unwrap_or_default();
            println!("[{}] [{}]{}", cell.platform, cell.brand, note);
            println!("  source: {}", cell.descriptor.source.join(", "));
            for file in &platform.files {
                let format = serde_json::to_value(file.format)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                let filter = match &file.filter {
                    TokenFilter::Category { name, .. } => format!("category={name}"),
                    TokenFilter::Theme { theme } => format!("theme={theme}"),
                    TokenFilter::Unfiltered => "all".to_string(),
                };
                println!(
                    "    {}{:<40} {:<24} {}",
                    platform.build_path, file.destination, format, filter
                );
            }
        }

        Ok(())
    }
}

impl CategoriesArgs {
    /// Execute the categories command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let registry = planner_for(config)
            .scan()
            .map_err(|e| CliError::validation(e.to_string()))?;

        let categories: BTreeMap<&str, Vec<&str>> = registry
            .brands()
            .map(|brand| (brand, registry.categories(brand).collect()))
            .collect();

        if self.json {
            return print_json(&categories);
        }

        for (brand, names) in &categories {
            if names.is_empty() {
                println!("{brand}: (no categories)");
            } else {
                println!("{brand}: {}", names.join(", "));
            }
        }

        Ok(())
    }
}
