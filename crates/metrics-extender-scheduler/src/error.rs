// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::time::Duration;
use thiserror::Error;

/// Extender error type
#[derive(Error, Debug, Diagnostic)]
pub enum ExtenderError {
    /// No candidate node carries the admission label
    #[error("all node do not have label {label}")]
    #[diagnostic(
        code(extender::admission_exhausted),
        help("Label at least one schedulable node with '{label}'")
    )]
    AdmissionExhausted { label: String },

    /// The metrics API could not provide a snapshot
    #[error("Node metrics unavailable: {reason}")]
    #[diagnostic(
        code(extender::metrics_unavailable),
        help("Check that metrics-server is running and the APIService metrics.k8s.io is available")
    )]
    MetricsUnavailable { reason: String },

    /// An inbound request body could not be decoded
    #[error("Failed to decode {endpoint} request: {message}")]
    #[diagnostic(
        code(extender::decode_failure),
        help("The scheduler and extender disagree on the extender/v1 schema")
    )]
    DecodeFailure { endpoint: String, message: String },

    /// The cluster rejected the binding
    #[error("Failed to bind pod {pod} to node {node}: {reason}")]
    #[diagnostic(
        code(extender::bind_commit_failure),
        help("The core scheduler owns retries; check the pod and node still exist")
    )]
    BindCommitFailure {
        pod: String,
        node: String,
        reason: String,
    },

    /// A cluster call exceeded the request deadline
    #[error("Timed out after {after:?} waiting for {operation}")]
    #[diagnostic(
        code(extender::timeout),
        help("Raise --request-timeout or investigate API server latency")
    )]
    Timeout { operation: String, after: Duration },

    /// The request was structurally invalid
    #[error("Invalid request: {0}")]
    #[diagnostic(code(extender::invalid_request))]
    InvalidRequest(#[from] metrics_extender_core::CoreError),

    /// Cluster API error
    #[error("Cluster API error: {0}")]
    #[diagnostic(
        code(extender::cluster_error),
        help("Check API server connectivity and RBAC permissions")
    )]
    Cluster(#[from] metrics_extender_client::ClientError),
}

/// Result type for extender operations
pub type Result<T> = std::result::Result<T, ExtenderError>;

impl ExtenderError {
    /// Create an AdmissionExhausted error
    pub fn admission_exhausted(label: impl Into<String>) -> Self {
        Self::AdmissionExhausted {
            label: label.into(),
        }
    }

    /// Create a MetricsUnavailable error
    pub fn metrics_unavailable(reason: impl Into<String>) -> Self {
        Self::MetricsUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a DecodeFailure error
    pub fn decode_failure(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeFailure {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a BindCommitFailure error
    pub fn bind_commit_failure(
        pod: impl Into<String>,
        node: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::BindCommitFailure {
            pod: pod.into(),
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// Create a Timeout error
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_exhausted_message() {
        let err = ExtenderError::admission_exhausted("filter.xy.com");
        assert_eq!(err.to_string(), "all node do not have label filter.xy.com");
    }

    #[test]
    fn test_timeout_message() {
        let err = ExtenderError::timeout("create binding", Duration::from_secs(2));
        assert_eq!(err.to_string(), "Timed out after 2s waiting for create binding");
    }
}
