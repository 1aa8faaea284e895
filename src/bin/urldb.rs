//! urldb: the URL-classification service consulted by the proxy.
//!
//! Serves `GET <prefix><url>` with the URL's stored label, or "SAFE" when
//! the URL is not blacklisted. The blacklist is loaded once at startup from
//! a text file of `<url> <label>` lines.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use firewall_proxy::urldb::{router, UrlStore};

#[derive(Parser)]
#[command(name = "urldb", about = "URL-classification service")]
struct Args {
    /// Server address.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port.
    #[arg(long, default_value_t = 8888)]
    port: u16,

    /// URI prefix of the lookup namespace.
    #[arg(long, default_value = "/urlinfo/1/")]
    prefix: String,

    /// Text file containing blacklisted URLs, one "<url> <label>" per line.
    #[arg(long)]
    fwdb: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut store = UrlStore::new(args.prefix);
    if let Some(path) = &args.fwdb {
        store.load_blacklist(path)?;
        tracing::info!(file = %path.display(), entries = store.len(), "Blacklist loaded");
    }

    let bind_address = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %bind_address, prefix = store.prefix(), "urldb starting");

    axum::serve(listener, router(Arc::new(store))).await?;
    Ok(())
}
