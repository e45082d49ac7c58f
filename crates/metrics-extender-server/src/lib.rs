//! Metrics Extender Server - HTTP transport for the scheduler extender
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The `/scheduler/{filter,prioritize,preemption,bind}` endpoints
//! - Health and counter endpoints
//! - Graceful shutdown on a cancellation token

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use error::{Result, ServerError};
pub use server::{ApiServer, Config};
pub use state::AppState;
