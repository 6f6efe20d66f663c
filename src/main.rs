//! tokenkit - design token build planner and artifact resolver
//!
//! Compiles per-brand raw token sources into web, Android and iOS artifacts
//! and answers lookups against the compiled tree.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokenkit::cli::{
    BrandsArgs, BuildArgs, CategoriesArgs, CliError, CliResult, ExitCode, InitArgs,
    InventoryArgs, PlanArgs, ResolveArgs, TypesArgs,
};
use tokenkit::config::Config;

/// tokenkit - design token build planner and artifact resolver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./tokenkit.toml, then the user config)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the raw token source root
    #[arg(long, global = true, value_name = "DIR")]
    source_root: Option<PathBuf>,

    /// Override the build output root
    #[arg(long, global = true, value_name = "DIR")]
    build_root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile raw token sources into the build root
    Build(BuildArgs),
    /// Print the build descriptors without building
    Plan(PlanArgs),
    /// List categories discovered in the raw source tree
    Categories(CategoriesArgs),
    /// List brands with compiled artifacts
    Brands(BrandsArgs),
    /// List token types for a brand and format
    Types(TypesArgs),
    /// Resolve a compiled artifact path
    Resolve(ResolveArgs),
    /// Show all compiled artifacts
    Inventory(InventoryArgs),
    /// Write a configuration file populated with the defaults
    Init(InitArgs),
}

fn load_config(cli: &Cli) -> CliResult<Config> {
    // init starts from the defaults; the file it writes may not exist yet
    let mut config = if matches!(cli.command, Commands::Init(_)) {
        Config::default()
    } else {
        Config::load(cli.config.as_deref())
            .map_err(|e| CliError::validation(format!("{e:#}")))?
    };

    if let Some(source_root) = &cli.source_root {
        config.paths.source_root.clone_from(source_root);
    }
    if let Some(build_root) = &cli.build_root {
        config.paths.build_root.clone_from(build_root);
    }

    Ok(config)
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Build(args) => args.execute(&config),
        Commands::Plan(args) => args.execute(&config),
        Commands::Categories(args) => args.execute(&config),
        Commands::Brands(args) => args.execute(&config),
        Commands::Types(args) => args.execute(&config),
        Commands::Resolve(args) => args.execute(&config),
        Commands::Inventory(args) => args.execute(&config),
        Commands::Init(args) => args.execute(&config),
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays parseable
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let code = match run(&cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {e}");
            e.code
        }
    };
    std::process::exit(code.code());
}
