// Allow unused assignments for diagnostic fields - they're used by the thiserror/miette macros
#![allow(unused_assignments)]

//! Metrics Extender Client - Access to the Kubernetes API for the extender
//!
//! This crate provides:
//! - The `ClusterClient` capability the decision logic depends on
//! - `KubeClient`, a kube-rs implementation against the API server
//! - Credential resolution (in-cluster service account, kubeconfig fallback)
//! - `MockClusterClient` for tests

pub mod config;
pub mod error;
pub mod kube_client;
pub mod mock;
pub mod traits;

// Re-export primary types
pub use config::{infer_config, ConfigSource};
pub use error::{ClientError, Result};
pub use kube_client::KubeClient;
pub use mock::MockClusterClient;
pub use traits::ClusterClient;
