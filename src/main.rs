use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sinigang::cli::{self, Cli};
use sinigang::config::SinigangConfig;
use sinigang::service::SocialService;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = SinigangConfig::load_or_create(&cli.config);

    // RUST_LOG wins over the configured level
    let level = loaded.as_ref().map(|c| c.log_level.as_str()).unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let config = match loaded {
        Ok(config) => {
            info!("Config loaded from {}", cli.config);
            config
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut service = match SocialService::open(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("Could not open account database: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = cli::account::handle_command(&mut service, cli.command);
    let closed = service.close();

    match outcome.and(closed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
