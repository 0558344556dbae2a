//! Web form for interactive genre predictions.
//!
//! Loads the bundle once at startup and refuses to start if it is missing
//! or inconsistent.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use server::{InferenceService, ServeConfig};

#[derive(Parser, Debug)]
#[command(name = "genre-web")]
#[command(about = "Serve the movie genre prediction form", long_about = None)]
struct Args {
    /// Directory holding the trained bundle
    #[arg(long, env = "GENRE_BUNDLE_DIR", default_value = "models")]
    bundle: PathBuf,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "GENRE_PORT", default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,pipeline=debug")),
        )
        .init();

    let args = Args::parse();
    let config = ServeConfig {
        bundle_dir: args.bundle,
        host: args.host,
        port: args.port,
    };

    info!("Loading model bundle from {}", config.bundle_dir.display());
    let service = match InferenceService::load(&config.bundle_dir) {
        Ok(service) => Arc::new(service),
        Err(err) => {
            error!("Failed to load model bundle: {:#}", anyhow::Error::new(err));
            return ExitCode::FAILURE;
        }
    };
    info!("Bundle {} ready", service.bundle().version());

    if let Err(err) = server::run_server(service, &config).await {
        error!("Server stopped: {:#}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
