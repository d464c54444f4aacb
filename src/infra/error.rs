use std::net::SocketAddr;

use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Failures while wiring the process to the outside world: the database,
/// the listening socket and the tracing subscriber.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("database url is not configured; set database.url or QUILLPOST__DATABASE__URL")]
    MissingDatabaseUrl,
    #[error("failed to connect to the database")]
    Connect(#[source] sqlx::Error),
    #[error("failed to apply migrations")]
    Migration(#[source] MigrateError),
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("http server stopped unexpectedly")]
    Serve(#[source] std::io::Error),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl InfraError {
    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind { addr, source }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
