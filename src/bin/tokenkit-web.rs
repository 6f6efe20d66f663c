//! tokenkit Web Server Binary
//!
//! Serves compiled token artifacts over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Serve ./build/web/global on 127.0.0.1:3000
//! tokenkit-web
//!
//! # Specify port and build root
//! tokenkit-web --port 8080 --build-root packages/tokens/build
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokenkit::config::Config;
use tokenkit::web;

/// tokenkit Web Server - REST API for compiled design tokens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (defaults to the configured port, 3000)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Host to bind to (defaults to the configured host)
    #[arg(long)]
    host: Option<String>,

    /// Build root containing web/global/<brand>/<format>/
    #[arg(short, long)]
    build_root: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(build_root) = args.build_root {
        config.paths.build_root = build_root;
    }
    let host = args.host.unwrap_or(config.serve.host);
    let port = args.port.unwrap_or(config.serve.port);

    let global_dir = config.paths.global_dir();
    info!("Serving artifacts from {}", global_dir.display());

    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    web::run_server(global_dir, addr).await
}
