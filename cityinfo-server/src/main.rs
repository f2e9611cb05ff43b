//! Entry point for the CityInfo HTTP server.
#![forbid(unsafe_code)]

use std::sync::Arc;

use clap::Parser;
use cityinfo_core::{MemoryStore, SqliteStore};
use cityinfo_server::config::{Args, ServerError};
use cityinfo_server::{AppState, LogMailSender, router, seed};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("cityinfo-server: {err}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<(), ServerError> {
    let args = Args::try_parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let notifier = Arc::new(LogMailSender);
    let state = match &args.database {
        Some(path) => {
            let store = SqliteStore::open(path)?;
            seed::ensure_seed_data(&store)?;
            info!(path = %path.display(), "using SQLite aggregate store");
            AppState::new(Arc::new(store), notifier)
        }
        None => {
            let store = MemoryStore::new();
            seed::ensure_seed_data(&store)?;
            info!("using in-memory aggregate store");
            AppState::new(Arc::new(store), notifier)
        }
    };

    let app = router(state);
    let listener = TcpListener::bind(args.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: args.bind,
            source,
        })?;
    info!(addr = %args.bind, "listening");
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
