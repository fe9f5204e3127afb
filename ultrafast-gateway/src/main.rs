//! # Ultrafast Gateway Binary
//!
//! Entry point: parse arguments, load and validate configuration, bind
//! the data-plane HTTP listener, and serve.
//!
//! ## Usage
//!
//! ```bash
//! ultrafast-gateway --config gateway.toml
//! ultrafast-gateway --host 0.0.0.0 --port 8080
//! ```

use std::net::SocketAddr;

use clap::Parser;
use ultrafast_gateway::{config::GatewayConfig, server::create_server};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: String,

    /// Overrides `server.port` from the configuration file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Overrides `server.host` from the configuration file.
    #[arg(long)]
    host: Option<String>,

    /// Tracing filter, e.g. "info" or "ultrafast_gateway=debug".
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(args.log_level.clone())
        .init();

    let mut config = GatewayConfig::load(&args.config)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    config.validate()?;

    let app = create_server(config.clone());

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!(%addr, "starting ultrafast-gateway");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
