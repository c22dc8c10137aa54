use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bffcli::config::AppConfig;
use bffcli::server::{AppState, create_router};
use bffcli::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "bffcli")]
#[command(about = "Backend-for-frontend gateway for the platform CLI", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database (overrides the config file)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Create the manifest and dataset version tables
    InitDb {
        /// Data directory for the database (overrides the config file)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::load(path)?),
        None => Ok(AppConfig::default()),
    }
}

fn open_store(config: &AppConfig) -> anyhow::Result<SqliteStore> {
    fs::create_dir_all(&config.server.data_dir)?;
    let store = SqliteStore::new(config.server.db_path())?;
    store.initialize()?;
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bffcli=info".parse()?))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::InitDb { data_dir } => {
            if let Some(data_dir) = data_dir {
                config.server.data_dir = data_dir;
            }
            open_store(&config)?;
            info!("Database ready at {}", config.server.db_path().display());
        }
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.server.data_dir = data_dir;
            }
            if config.auth.jwt_secret.is_none() {
                info!("No JWT secret configured, token signatures are not checked");
            }

            let store = open_store(&config)?;
            let state = Arc::new(AppState::from_config(Arc::new(store), &config)?);

            let app = create_router(state);
            let addr = config.server.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
