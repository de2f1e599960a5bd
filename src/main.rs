//! Path-encoded HTTP forward proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                    PATH PROXY                     │
//!                         │                                                   │
//!   GET /proxx/https%3A.. │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!   ──────────────────────┼─▶│  http   │──▶│ routing  │──▶│   security   │   │
//!                         │  │ server  │   │ extract/ │   │ egress check │   │
//!                         │  └─────────┘   │ decode   │   └──────┬───────┘   │
//!                         │       │        └──────────┘          │           │
//!                         │       ▼ no target                    ▼           │
//!                         │  ┌──────────┐                 ┌──────────────┐   │
//!                         │  │ fallback │                 │   forward    │───┼──▶ Target
//!                         │  │   page   │                 │ + deadline   │◀──┼─── origin
//!                         │  └──────────┘                 └──────┬───────┘   │
//!   ◀─────────────────────┼──────────────── response.rs ◀────────┘           │
//!                         │            (strip CSP/XFO, add CORS)              │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use path_proxy::config::{self, ConfigError, ExtractionMode, LogFormat, ProxyConfig};
use path_proxy::lifecycle::{signals, Shutdown};
use path_proxy::observability::{logging, metrics};
use path_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "path-proxy")]
#[command(about = "HTTP forward proxy driven by URLs encoded in the request path", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override extraction.mode (prefix or bare).
    #[arg(short, long)]
    mode: Option<ExtractionMode>,

    /// Override extraction.marker.
    #[arg(long)]
    marker: Option<String>,

    /// Override observability.log_format (pretty or json).
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn apply(self, config: &mut ProxyConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(mode) = self.mode {
            config.extraction.mode = mode;
        }
        if let Some(marker) = self.marker {
            config.extraction.marker = marker;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }

    /// File (or defaults), then flag overrides, then one validation pass.
    fn resolve_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut resolved = match &self.config {
            Some(path) => config::read_config(path)?,
            None => ProxyConfig::default(),
        };
        self.apply(&mut resolved);
        config::validate_config(&resolved).map_err(ConfigError::Validation)?;
        Ok(resolved)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("path-proxy: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.resolve_config()?;

    logging::init_logging(&config.observability);

    tracing::info!("path-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = ?config.extraction.mode,
        marker = %config.extraction.marker,
        upstream_timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_on_signal(&shutdown).await;
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
