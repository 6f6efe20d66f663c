//! CLI command handlers for tokenkit.
//!
//! Headless, scriptable access to the build planner and the artifact
//! resolver for automation and CI/CD integration.

pub mod build;
pub mod common;
pub mod init;
pub mod plan;
pub mod query;

// Re-export types used by main.rs and tests
pub use build::BuildArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use init::InitArgs;
pub use plan::{CategoriesArgs, PlanArgs};
pub use query::{BrandsArgs, InventoryArgs, ResolveArgs, TypesArgs};
