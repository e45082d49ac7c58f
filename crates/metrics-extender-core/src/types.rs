use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Node, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::error::{CoreError, Result};
use crate::extender::ExtenderBindingArgs;
use crate::quantities::parse_cpu_millicores;

/// Name of a node, or "unknown" if the object has none
pub fn node_name(node: &Node) -> &str {
    node.metadata.name.as_deref().unwrap_or("unknown")
}

/// Name of a pod, or "unknown" if the object has none
pub fn pod_name(pod: &Pod) -> &str {
    pod.metadata.name.as_deref().unwrap_or("unknown")
}

/// Point-in-time CPU usage reported for one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetricsSample {
    /// Node name
    pub node_name: String,
    /// Raw CPU usage quantity, if the sample carried one
    pub cpu: Option<Quantity>,
    /// When the sample was collected
    pub timestamp: Option<DateTime<Utc>>,
}

impl NodeMetricsSample {
    pub fn new(node_name: impl Into<String>, cpu: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            cpu: Some(Quantity(cpu.into())),
            timestamp: None,
        }
    }

    /// CPU usage in millicores
    pub fn cpu_millicores(&self) -> Result<i64> {
        let cpu = self
            .cpu
            .as_ref()
            .ok_or_else(|| CoreError::missing_field("NodeMetrics", "usage.cpu"))?;
        parse_cpu_millicores(&cpu.0)
    }
}

/// The pod-to-node assignment to commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDecision {
    pub pod_name: String,
    pub pod_namespace: String,
    /// Optional UID precondition; empty means unchecked
    pub pod_uid: String,
    pub node_name: String,
}

impl BindingDecision {
    pub fn new(
        pod_namespace: impl Into<String>,
        pod_name: impl Into<String>,
        node_name: impl Into<String>,
    ) -> Self {
        Self {
            pod_name: pod_name.into(),
            pod_namespace: pod_namespace.into(),
            pod_uid: String::new(),
            node_name: node_name.into(),
        }
    }

    /// Validate the wire arguments into a decision
    pub fn from_args(args: &ExtenderBindingArgs) -> Result<Self> {
        if args.pod_name.is_empty() {
            return Err(CoreError::missing_field("ExtenderBindingArgs", "podName"));
        }
        if args.node.is_empty() {
            return Err(CoreError::missing_field("ExtenderBindingArgs", "node"));
        }

        let pod_namespace = if args.pod_namespace.is_empty() {
            "default".to_string()
        } else {
            args.pod_namespace.clone()
        };

        Ok(Self {
            pod_name: args.pod_name.clone(),
            pod_namespace,
            pod_uid: args.pod_uid.clone(),
            node_name: args.node.clone(),
        })
    }
}

impl std::fmt::Display for BindingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} -> {}",
            self.pod_namespace, self.pod_name, self.node_name
        )
    }
}
