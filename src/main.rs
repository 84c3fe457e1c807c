mod config;
mod encoding;
mod error;
mod protocol;
mod server;
mod store;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use config::{Backend, Config, LogConfig};
use server::Server;
use store::IdStrategy;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// albumdb - a small REST catalog of music albums
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listening address, overrides the config file
    #[arg(long)]
    addr: Option<String>,

    /// Store backend: memory or file
    #[arg(long)]
    backend: Option<Backend>,

    /// Backing document for the file backend
    #[arg(long)]
    data: Option<PathBuf>,

    /// Id assignment: length or next-free
    #[arg(long)]
    id_strategy: Option<IdStrategy>,
}

impl Cli {
    /// Load the config file (or defaults) and apply command line overrides
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(addr) = self.addr {
            config.server_addr = addr;
        }
        if let Some(backend) = self.backend {
            config.store.backend = backend;
        }
        if let Some(path) = self.data {
            config.store.path = path;
        }
        if let Some(ids) = self.id_strategy {
            config.store.id_strategy = ids;
        }

        Ok(config)
    }
}

fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match &log.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file '{}'", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    init_logging(&config.log)?;

    info!("Starting albumdb - album catalog service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let store = store::open(&config.store)
        .await
        .context("failed to open album store")?;

    let server = Server::bind(&config.server_addr, store)
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;
    info!("Server listening on: {}", server.local_addr());

    server.run().await?;

    Ok(())
}
