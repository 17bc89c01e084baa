//! Booking Gateway
//!
//! Authenticated gateway between the booking site and its upstream REST API.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                   BOOKING GATEWAY                    │
//!                         │                                                      │
//!   Browser Request       │  ┌─────────┐   ┌─────────┐   ┌─────────────┐         │
//!   ──────────────────────┼─▶│  http   │──▶│ routing │──▶│  security   │         │
//!                         │  │ server  │   │  table  │   │ credentials │         │
//!                         │  └─────────┘   └─────────┘   └──────┬──────┘         │
//!                         │                                     │                │
//!                         │                                     ▼                │
//!                         │                              ┌─────────────┐         │
//!                         │                              │  upstream   │─────────┼──▶ Upstream
//!                         │                              │  forwarder  │◀────────┼─── REST API
//!                         │                              └──────┬──────┘         │
//!                         │                                     ▼                │
//!   Envelope Response     │  ┌─────────┐   ┌─────────┐   ┌─────────────┐         │
//!   ◀─────────────────────┼──│response │◀──│ assets  │◀──│ normalizer  │         │
//!                         │  │envelope │   │ (rooms) │   │             │         │
//!                         │  └─────────┘   └─────────┘   └─────────────┘         │
//!                         │                                                      │
//!                         │  config · observability · lifecycle                  │
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use booking_gateway::config::load_config;
use booking_gateway::lifecycle::{signals, Shutdown};
use booking_gateway::observability::{logging, metrics};
use booking_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "booking-gateway")]
#[command(about = "Authenticated gateway for the booking site upstream API", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_tracing(&config.observability);

    tracing::info!("booking-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        upstream_timeout_ms = config.upstream.timeout_ms,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = GatewayServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
