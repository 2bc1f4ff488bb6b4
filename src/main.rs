//! Framing reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────────────────┐
//!                 │                      FRAME PROXY                          │
//!                 │                                                           │
//!  Client Request │  ┌──────────┐   ┌────────────┐   ┌──────────────┐         │
//!  ───────────────┼─▶│  http    │──▶│  routing   │──▶│  upstream    │─────────┼──▶ Upstream
//!                 │  │ server   │   │ normalizer │   │   client     │         │    Origin
//!                 │  └──────────┘   └────────────┘   └──────┬───────┘         │
//!                 │                                         │                 │
//!                 │                       ┌─────────────────┴─────┐           │
//!                 │                       ▼                       ▼           │
//!                 │               ┌──────────────┐       ┌──────────────┐     │
//!                 │               │   redirect   │       │   security   │     │
//!                 │               │   rewriter   │       │   headers    │     │
//!                 │               └──────┬───────┘       └──────┬───────┘     │
//!                 │                      │                      ▼             │
//!                 │                      │               ┌──────────────┐     │
//!                 │                      │               │ body rewrite │     │
//!                 │                      │               │ html / pass  │     │
//!                 │                      │               └──────┬───────┘     │
//!  Client Response│  ┌──────────┐        │                      │             │
//!  ◀──────────────┼──│ response │◀───────┴──────────────────────┘             │
//!                 │  │ assemble │                                             │
//!                 │  └──────────┘                                             │
//!                 └───────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use frame_proxy::config::loader::{load_config, ConfigError, ConfigOverrides};
use frame_proxy::observability::{logging, metrics};
use frame_proxy::{HttpServer, ProxyConfig, Shutdown};

#[derive(Parser)]
#[command(name = "frame-proxy")]
#[command(about = "Reverse proxy that makes a fixed upstream site embeddable in iframes", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream origin, e.g. https://www.example.com
    #[arg(long, env = "FRAME_PROXY_UPSTREAM")]
    upstream: Option<String>,

    /// Path prefix the proxy is mounted under, e.g. /proxy
    #[arg(long, env = "FRAME_PROXY_MOUNT_PREFIX")]
    mount_prefix: Option<String>,
}

impl Cli {
    /// Load the config file (or defaults) with command-line overrides applied.
    fn resolve(&self) -> Result<ProxyConfig, ConfigError> {
        let overrides = ConfigOverrides {
            bind_address: self.bind.clone(),
            upstream: self.upstream.clone(),
            mount_prefix: self.mount_prefix.clone(),
        };
        load_config(self.config.as_deref(), &overrides)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    logging::init_logging(&config.observability);

    tracing::info!("frame-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin,
        mount_prefix = %config.proxy.mount_prefix,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&bind_address).await?;

    // Only OS signals stop the binary; the coordinator is kept alive so its
    // receiver never reports a closed channel.
    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
