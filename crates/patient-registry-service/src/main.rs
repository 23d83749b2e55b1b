//! `patient-registry-service` - HTTP API over the flat-file patient store.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use patient_registry_core::FileStore;

mod logging;
mod routes;

use routes::ServiceState;

#[derive(Debug, Parser)]
#[command(name = "patient-registry-service")]
#[command(about = "HTTP API over a flat-file patient record store")]
struct Args {
    /// Path to the persisted patient document.
    #[arg(long, default_value = "./patients.json")]
    data: PathBuf,

    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging();

    let state = ServiceState::new(FileStore::new(args.data.clone()));
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!(bind = %args.bind, data = %args.data.display(), "patient registry listening");
    axum::serve(listener, routes::app(state)).await?;
    Ok(())
}
