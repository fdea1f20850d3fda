use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use assessment_client::{
    api::ApiClient,
    cli::{execute_command, Cli},
    config::{Config, LogFormat},
    session::SessionStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(url) = cli.api_url.clone() {
        config.api.base_url = url;
    }
    if let Some(token) = cli.token.clone() {
        config.api.token = Some(token);
    }

    // Initialize logging
    init_logging(&config);

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "Assessment client starting"
    );

    let client = match ApiClient::new(&config.api, config.request.clone(), SessionStore::new()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to initialize API client");
            return Err(e.into());
        }
    };

    let result = execute_command(cli.command, client, &config).await;
    if result.exit_code == 0 {
        println!("{}", result.message);
    } else {
        eprintln!("{}", result.message);
    }
    std::process::exit(result.exit_code);
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
