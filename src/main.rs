// src/main.rs
use clap::Parser;
use tracing_subscriber::EnvFilter;

use load_it_now::cli::{Cli, execute};
use load_it_now::config::AppConfig;

fn main() {
    // Loaded first so RUST_LOG may come from .env.
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = dotenv_result {
        let not_found = matches!(
            err,
            dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        );
        if !not_found {
            tracing::warn!("Could not load .env: {}", err);
        }
    }

    let cli = Cli::parse();
    let app_config = AppConfig::from_env();

    let stdout = std::io::stdout();
    if let Err(err) = execute(cli, &app_config, &mut stdout.lock()) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
