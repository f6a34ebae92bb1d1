//! precise-relay
//!
//! A single-target HTTP relay built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                     PRECISE RELAY                     │
//!                    │                                                       │
//!  Client Request    │  ┌──────────┐   ┌────────┐   ┌───────────────────┐   │
//!  ──────────────────┼─▶│   net    │──▶│  http  │──▶│  relay pipeline   │   │
//!                    │  │ listener │   │ server │   │ buffer + headers  │   │
//!                    │  └──────────┘   └────────┘   └─────────┬─────────┘   │
//!                    │                                         │             │
//!                    │                               ┌─────────▼─────────┐   │
//!                    │                               │     transform     │   │
//!                    │                               │  precise_amount   │   │
//!                    │                               └─────────┬─────────┘   │
//!                    │                                         │             │
//!  Client Response   │  ┌──────────┐                 ┌─────────▼─────────┐   │
//!  ◀─────────────────┼──│ response │◀────────────────│  hyper-util client │◀──┼── Upstream
//!                    │  └──────────┘                 └───────────────────┘   │
//!                    │                                                       │
//!                    │   config · observability · resilience · lifecycle    │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use precise_relay::config::loader::{load_config, ConfigError};
use precise_relay::config::validation::validate_config;
use precise_relay::config::ProxyConfig;
use precise_relay::lifecycle::{signals, Shutdown};
use precise_relay::observability::{logging, metrics};
use precise_relay::{net, HttpServer};

#[derive(Parser)]
#[command(name = "precise-relay")]
#[command(
    about = "Relay HTTP traffic to one upstream, converting precise_amount to an exact number",
    long_about = None
)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.port`.
    #[arg(long)]
    listen_port: Option<u16>,

    /// Override `upstream.host`.
    #[arg(long)]
    target_host: Option<String>,

    /// Override `upstream.port`.
    #[arg(long)]
    target_port: Option<u16>,
}

impl Cli {
    fn load(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(port) = self.listen_port {
            config.listener.port = port;
        }
        if let Some(host) = &self.target_host {
            config.upstream.host = host.clone();
        }
        if let Some(port) = self.target_port {
            config.upstream.port = port;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_logging(&config.observability);

    tracing::info!(
        listen = %config.listener.bind_address(),
        target = %config.upstream.base_url(),
        timeout_secs = config.upstream.timeout_secs,
        "precise-relay v0.1.0 starting"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // The only fatal runtime condition: the listen port cannot be bound.
    let listener = net::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
