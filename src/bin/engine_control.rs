//! Engine control listener
//!
//! Accepts config snapshots on `POST /config` and answers liveness probes.

use anyhow::Context;
use clap::Parser;
use ctc_protocol::config::ProtocolConfig;
use ctc_protocol::logging::init_tracing;
use ctc_protocol::receiver;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "engine-control")]
#[command(about = "Receive and validate config snapshots")]
struct Cli {
    /// Config file layered over ctc.toml and the environment
    #[arg(short, long)]
    config: Option<String>,

    /// Bind address (overrides receiver.bind)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config =
        ProtocolConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(config.logging.json)?;

    let bind = cli.bind.unwrap_or(config.receiver.bind);
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!(bind = %bind, "engine control listening");

    axum::serve(listener, receiver::router(config.receiver.max_body_bytes))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutting down");
            }
        })
        .await
        .context("server failed")?;
    Ok(())
}
