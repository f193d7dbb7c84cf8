//! Chain router HTTP front-end.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ Application::dispatch
//!                                          │
//!                                          ▼
//!                                     ChainRouter
//!                          ┌───────────────┼───────────────┐
//!                          ▼               ▼               ▼
//!                    CollectionAdapter TreeAdapter        ...
//!                          │   (first match wins)
//!                          ▼
//!                 match? ── no ──▶ not-found route
//!                          │
//!                          ▼
//!     Client Response ◀── Controllers (Module:Controller:action)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use chain_router::config::load_config;
use chain_router::http::{Controllers, HttpServer};
use chain_router::lifecycle::{signals, Application, Shutdown};
use chain_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "chain-router")]
#[command(about = "Serve module routes through a chained router", long_about = None)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "config/app.toml")]
    config: PathBuf,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_tracing(&config.observability.log_level);
    tracing::info!(
        config = %cli.config.display(),
        app = %config.app.name,
        environment = %config.app.environment,
        modules = config.modules.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let mut app = Application::new(config);
    app.boot()?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(app, Controllers::echo());
    let serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::forward_to(&shutdown).await;
    serving.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
