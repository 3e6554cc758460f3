mod api;
pub mod config;
pub mod controller;
pub mod models;
mod pages;
mod remote;
pub mod repo;
pub mod view;

use std::error::Error;
use std::fmt;
use std::io;
use std::net::SocketAddr;

use axum::{serve::Serve, Router};
use tokio::net::TcpListener;
use tracing::info;

pub use api::{build_app, LOGIN_PATH, NOT_FOUND_PATH};
pub use config::{Config, ConfigError, RemoteSettings};
pub use remote::{RemoteBackend, RemoteError};

#[derive(Debug)]
pub enum StartupError {
    ClientError(RemoteError),
    BindError(io::Error),
}

impl From<RemoteError> for StartupError {
    fn from(error: RemoteError) -> Self {
        StartupError::ClientError(error)
    }
}

impl From<io::Error> for StartupError {
    fn from(error: io::Error) -> Self {
        StartupError::BindError(error)
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::ClientError(e) => write!(f, "could not set up the backend client: {e}"),
            StartupError::BindError(e) => write!(f, "could not bind the listening socket: {e}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StartupError::ClientError(e) => Some(e),
            StartupError::BindError(e) => Some(e),
        }
    }
}

/// Binds the listener and returns its address with the server future, which
/// does nothing until awaited.
pub async fn start_server(
    config: Config,
) -> Result<(SocketAddr, Serve<TcpListener, Router, Router>), StartupError> {
    let backend = RemoteBackend::new(&config.remote)?;
    info!(
        "Using data API at {} and identity provider at {}",
        config.remote.data_url, config.remote.auth_url
    );

    let router = build_app::<RemoteError, _>(backend);

    let listener = TcpListener::bind(config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!("Listening on {}", local_addr);

    Ok((local_addr, axum::serve(listener, router)))
}
