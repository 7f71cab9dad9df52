//! CRM gateway
//!
//! ```text
//!     Client ──▶ axum router ──▶ /services ──▶ ServiceRegistry ──▶ snapshot file
//!                    │
//!                    ├──▶ /forward/{name} ──▶ ForwardingEngine ──▶ backend
//!                    │                          (retry + timeout)
//!                    ├──▶ /health/{name}  ──▶ HealthProbe ───────▶ backend
//!                    │
//!                    └──▶ /mcp ──▶ RpcDispatcher ──▶ ForwardingEngine
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use crm_gateway::config::{load_or_default, validation::validate_config, ConfigError};
use crm_gateway::lifecycle::{open_registry, wait_for_signal, Shutdown};
use crm_gateway::observability::{logging, metrics};
use crm_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "crm-gateway", version)]
#[command(about = "Service registry and forwarding gateway for the CRM backends", long_about = None)]
struct Args {
    /// TOML config file. Defaults apply when omitted.
    #[arg(short, long, env = "CRM_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long, env = "CRM_GATEWAY_BIND")]
    bind: Option<String>,

    /// Override the registry snapshot path.
    #[arg(long, env = "CRM_GATEWAY_REGISTRY")]
    registry: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_or_default(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(path) = args.registry {
        config.registry.path = path;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("crm-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        registry_path = %config.registry.path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation already checked the address parses.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let registry = open_registry(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(&config, registry);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
