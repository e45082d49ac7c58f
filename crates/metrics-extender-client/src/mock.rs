use crate::error::{ClientError, Result};
use crate::traits::ClusterClient;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use metrics_extender_core::{node_name, BindingDecision, NodeMetricsSample};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Mock cluster for tests
///
/// Keeps nodes, metrics samples and committed bindings in memory. Failures
/// and latency can be injected per operation to exercise the degradation and
/// timeout paths of the extender.
#[derive(Default)]
pub struct MockClusterClient {
    nodes: Arc<RwLock<Vec<Node>>>,
    metrics: Arc<RwLock<Vec<NodeMetricsSample>>>,
    bindings: Arc<RwLock<Vec<BindingDecision>>>,
    metrics_error: Arc<RwLock<Option<String>>>,
    binding_error: Arc<RwLock<Option<(u16, String)>>>,
    latency: Arc<RwLock<Option<Duration>>>,
    list_nodes_calls: AtomicUsize,
    list_metrics_calls: AtomicUsize,
    binding_calls: AtomicUsize,
}

impl MockClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_nodes(&self, nodes: Vec<Node>) {
        *self.nodes.write().await = nodes;
    }

    pub async fn set_metrics(&self, samples: Vec<NodeMetricsSample>) {
        *self.metrics.write().await = samples;
    }

    /// Make `list_node_metrics` fail with the given message
    pub async fn fail_metrics(&self, message: impl Into<String>) {
        *self.metrics_error.write().await = Some(message.into());
    }

    /// Make `create_binding` fail with the given API status
    pub async fn fail_binding(&self, status: u16, message: impl Into<String>) {
        *self.binding_error.write().await = Some((status, message.into()));
    }

    /// Delay every operation by `latency`
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = Some(latency);
    }

    /// Bindings committed so far
    pub async fn bindings(&self) -> Vec<BindingDecision> {
        self.bindings.read().await.clone()
    }

    pub fn list_nodes_calls(&self) -> usize {
        self.list_nodes_calls.load(Ordering::SeqCst)
    }

    pub fn list_metrics_calls(&self) -> usize {
        self.list_metrics_calls.load(Ordering::SeqCst)
    }

    pub fn binding_calls(&self) -> usize {
        self.binding_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ClusterClient for MockClusterClient {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        self.list_nodes_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Ok(self.nodes.read().await.clone())
    }

    async fn list_node_metrics(&self) -> Result<Vec<NodeMetricsSample>> {
        self.list_metrics_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if let Some(message) = self.metrics_error.read().await.clone() {
            return Err(ClientError::api_status(503, message));
        }
        Ok(self.metrics.read().await.clone())
    }

    async fn create_binding(&self, decision: &BindingDecision) -> Result<()> {
        self.binding_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if let Some((status, message)) = self.binding_error.read().await.clone() {
            return Err(ClientError::api_status(status, message));
        }

        let nodes = self.nodes.read().await;
        if !nodes.iter().any(|n| node_name(n) == decision.node_name) {
            return Err(ClientError::api_status(
                404,
                format!("nodes \"{}\" not found", decision.node_name),
            ));
        }

        let mut bindings = self.bindings.write().await;
        if bindings.iter().any(|b| {
            b.pod_namespace == decision.pod_namespace && b.pod_name == decision.pod_name
        }) {
            return Err(ClientError::api_status(
                409,
                format!(
                    "pod {}/{} is already assigned to a node",
                    decision.pod_namespace, decision.pod_name
                ),
            ));
        }

        bindings.push(decision.clone());
        debug!("Mock: bound {}", decision);
        Ok(())
    }
}
