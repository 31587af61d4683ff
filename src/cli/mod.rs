pub mod seed;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, Store};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "vidly-api")]
#[command(about = "Vidly - video rental management REST API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides VIDLY_PORT/PORT")]
        port: Option<u16>,

        #[arg(long, help = "Keep all data in process memory instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Populate the genres collection with reference data")]
    Seed {
        #[arg(long, help = "JSON file with an array of genres, replaces the built-in list")]
        genres: Option<PathBuf>,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        memory: false,
    }) {
        Commands::Serve { port, memory } => serve(config, port, memory).await,
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
        Commands::Seed { genres } => seed(config, genres).await,
    }
}

async fn seed(config: AppConfig, file: Option<PathBuf>) -> anyhow::Result<()> {
    let genres = match file {
        Some(path) => seed::load_genres(&path)?,
        None => seed::default_genres(),
    };

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }
    let store = Store::postgres(pool);

    let created = seed::seed_genres(&store, genres).await?;
    info!("Seeded {} genres", created.len());
    Ok(())
}

async fn serve(mut config: AppConfig, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let store = if memory {
        info!("Using in-memory store; data is lost on exit");
        Store::memory()
    } else {
        let pool = DatabaseManager::connect(&config.database).await?;
        if config.database.run_migrations {
            DatabaseManager::migrate(&pool).await?;
        }
        Store::postgres(pool)
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        "Starting Vidly API in {:?} mode (atomic rental issue: {})",
        config.environment, config.rentals.atomic_issue
    );

    let app = crate::app(AppState::new(config, store));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
