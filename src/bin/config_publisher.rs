//! Config Publisher
//!
//! Publishes versioned config snapshots to the engine, either once or on every
//! `POST /publish`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ctc_protocol::config::ProtocolConfig;
use ctc_protocol::logging::init_tracing;
use ctc_protocol::publisher::{self, Publisher};
use ctc_protocol::{HttpTransport, SqliteStore};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "config-publisher")]
#[command(about = "Publish versioned config snapshots")]
struct Cli {
    /// Config file layered over ctc.toml and the environment
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// SQLite database (overrides publisher.database)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Receiver endpoint (overrides publisher.engine_url)
    #[arg(long, global = true)]
    engine_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single publish cycle and exit
    Publish,

    /// Serve POST /publish (default)
    Listen {
        /// Bind address (overrides publisher.bind)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config =
        ProtocolConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(config.logging.json)?;

    if let Some(database) = cli.database {
        config.publisher.database = database;
    }
    if let Some(url) = cli.engine_url {
        config.publisher.engine_url = url;
    }

    let store = Arc::new(
        SqliteStore::open(&config.publisher.database)
            .with_context(|| format!("opening {}", config.publisher.database.display()))?,
    );
    let transport = Arc::new(HttpTransport::new(
        config.publisher.engine_url.clone(),
        config.publisher.transmit_timeout(),
    )?);
    let publisher = Publisher::new(store.clone(), store, transport)
        .with_store_timeout(config.publisher.store_timeout());

    match cli.command.unwrap_or(Commands::Listen { bind: None }) {
        Commands::Publish => {
            let receipt = publisher.publish_once().await?;
            println!(
                "Published ConfigSnapshot v{} ({} bytes)",
                receipt.version, receipt.bytes
            );
        }
        Commands::Listen { bind } => {
            let bind = bind.unwrap_or(config.publisher.bind);
            let listener = TcpListener::bind(&bind)
                .await
                .with_context(|| format!("binding {}", bind))?;
            info!(
                bind = %bind,
                engine = %config.publisher.engine_url,
                "config-publisher listening"
            );
            axum::serve(listener, publisher::router(Arc::new(publisher)))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("server failed")?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
