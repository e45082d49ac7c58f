// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::net::SocketAddr;
use thiserror::Error;

/// Server error type
#[derive(Error, Debug, Diagnostic)]
pub enum ServerError {
    /// The listen socket could not be opened
    #[error("Failed to listen on {addr}: {source}")]
    #[diagnostic(
        code(server::bind_failed),
        help("Check that the address is free and the process may bind to it")
    )]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop stopped with an I/O error
    #[error("HTTP server error: {0}")]
    #[diagnostic(code(server::serve_failed))]
    ServeFailed(#[source] std::io::Error),
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;
