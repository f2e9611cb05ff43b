//! Server configuration and startup errors.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Command-line arguments for the CityInfo server.
#[derive(Debug, Parser)]
#[command(
    name = "cityinfo-server",
    about = "HTTP resource service for cities and their points of interest",
    version
)]
pub struct Args {
    /// Socket address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000", value_name = "addr")]
    pub bind: SocketAddr,
    /// SQLite database path; omitted means the in-memory store.
    #[arg(long, value_name = "path")]
    pub database: Option<PathBuf>,
}

/// Errors emitted while bringing the server up or tearing it down.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Opening or seeding the aggregate store failed.
    #[error("failed to prepare the aggregate store: {0}")]
    Store(#[from] cityinfo_core::StoreError),
    /// The listen socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested listen address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The accept loop failed.
    #[error("server terminated: {0}")]
    Serve(#[source] std::io::Error),
}
