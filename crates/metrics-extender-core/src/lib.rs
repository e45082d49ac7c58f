//! Metrics Extender Core - Wire types and shared data model for the scheduler extender
//!
//! This crate provides:
//! - The `extender/v1` request/response payloads exchanged with kube-scheduler
//! - `metrics.k8s.io` node metrics objects and per-node usage samples
//! - Kubernetes CPU quantity parsing
//! - Error types with miette diagnostics

pub mod error;
pub mod extender;
pub mod metrics;
pub mod quantities;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use extender::{
    ExtenderArgs, ExtenderBindingArgs, ExtenderBindingResult, ExtenderFilterResult,
    ExtenderPreemptionArgs, ExtenderPreemptionResult, FailedNodesMap, HostPriority,
    HostPriorityList, MetaPod, MetaVictims, NodeList, Victims,
};
pub use metrics::{NodeMetrics, NodeMetricsList};
pub use quantities::parse_cpu_millicores;
pub use types::{node_name, pod_name, BindingDecision, NodeMetricsSample};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::api::core::v1::{Node, Pod};
pub use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
