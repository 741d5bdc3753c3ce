//! Server error types.

use std::{io, net::SocketAddr, path::PathBuf};

use lockgate_core::ConfigError;
use thiserror::Error;

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Lock configuration rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The secret file could not be read.
    #[error("failed to read secret file {path}: {source}")]
    SecretFile {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested listen address
        addr: SocketAddr,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The HTTP server failed while running.
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
