//! firewall-proxy: HTTP forward proxy with a URL firewall.
//!
//! Every inbound request is classified by an external urldb service before
//! being relayed upstream. The urldb backend is chosen per request by
//! hashing the request URL, so classification is sharded deterministically.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use firewall_proxy::config::loader::load_config;
use firewall_proxy::firewall::HyperClient;
use firewall_proxy::http::HttpServer;
use firewall_proxy::lifecycle::Shutdown;

#[derive(Parser)]
#[command(name = "firewall-proxy", about = "HTTP forward proxy with a URL firewall")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, short)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.observability.log_level)
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        backends = config.urldb.len(),
        "firewall-proxy starting"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger();
        }
    });

    let server = HttpServer::new(config, HyperClient::new());
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
