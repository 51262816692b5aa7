use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use filekeep::file::FileStorage;
use filekeep::web::WebServer;
use filekeep::{Config, Database};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration
    let config = if Path::new(&config_path).exists() {
        match Config::load_with_env(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {config_path}: {e}");
                std::process::exit(1);
            }
        }
    } else {
        eprintln!("{config_path} not found. Using default configuration.");
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = filekeep::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        filekeep::logging::init_console_only(&config.logging.level);
    }

    info!("filekeep {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> filekeep::Result<()> {
    let db = Arc::new(Database::open(&config.database.path, config.database.max_connections).await?);
    let storage = Arc::new(FileStorage::new(&config.storage.path)?);
    info!("File storage at {}", storage.base_path().display());

    let server = WebServer::new(&config.web, db.clone(), storage, &config.storage)?;
    let result = server.run(shutdown_signal()).await;

    db.close().await;
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
