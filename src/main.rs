use clap::Parser;

use vidly_api::cli::{self, Cli};
use vidly_api::config::AppConfig;
use vidly_api::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and the signing key
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // The log file location is part of the config, so nothing is logged before it loads
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = logging::init(&config.logging)?;

    cli::run(cli, config).await
}
