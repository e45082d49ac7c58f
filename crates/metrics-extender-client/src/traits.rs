use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use metrics_extender_core::{BindingDecision, NodeMetricsSample};

/// Cluster operations the extender depends on
///
/// Implementations are shared by every in-flight request and must be safe to
/// call concurrently. `KubeClient` talks to a real API server;
/// `MockClusterClient` keeps everything in memory for tests.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// List all nodes in the cluster
    async fn list_nodes(&self) -> Result<Vec<Node>>;

    /// List the current usage sample of every node reporting metrics
    async fn list_node_metrics(&self) -> Result<Vec<NodeMetricsSample>>;

    /// Bind a pod to a node. Called at most once per bind request.
    async fn create_binding(&self, binding: &BindingDecision) -> Result<()>;
}
