use crate::error::{ClientError, Result};
use crate::traits::ClusterClient;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Binding, Node, ObjectReference, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DynamicObject, ListParams, PostParams};
use kube::core::ApiResource;
use kube::{Client, Config};
use metrics_extender_core::{BindingDecision, NodeMetrics, NodeMetricsSample};
use std::time::Duration;
use tracing::debug;

/// Client for the Kubernetes API server
///
/// `kube::Client` pools connections internally, so one instance serves every
/// concurrent extender request.
pub struct KubeClient {
    client: Client,
    node_metrics: ApiResource,
}

/// `metrics.k8s.io/v1beta1` node metrics, served under the `nodes` plural
fn node_metrics_resource() -> ApiResource {
    ApiResource {
        group: "metrics.k8s.io".to_string(),
        version: "v1beta1".to_string(),
        api_version: "metrics.k8s.io/v1beta1".to_string(),
        kind: "NodeMetrics".to_string(),
        plural: "nodes".to_string(),
    }
}

impl KubeClient {
    /// Build a client from resolved connection settings
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(mut config: Config) -> Result<Self> {
        config.connect_timeout = Some(Duration::from_secs(5));

        let client = Client::try_from(config).map_err(|e| {
            ClientError::invalid_config(
                format!("failed to build Kubernetes client: {}", e),
                "Check the TLS and credential settings of the cluster configuration",
            )
        })?;

        Ok(Self::from_client(client))
    }

    /// Wrap an existing kube client
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            node_metrics: node_metrics_resource(),
        }
    }
}

/// The `Binding` subresource body for a decision
pub fn binding_object(decision: &BindingDecision) -> Binding {
    Binding {
        metadata: ObjectMeta {
            name: Some(decision.pod_name.clone()),
            namespace: Some(decision.pod_namespace.clone()),
            uid: (!decision.pod_uid.is_empty()).then(|| decision.pod_uid.clone()),
            ..Default::default()
        },
        target: ObjectReference {
            kind: Some("Node".to_string()),
            name: Some(decision.node_name.clone()),
            ..Default::default()
        },
    }
}

/// Convert a dynamically typed metrics object into a usage sample
fn metrics_sample(object: DynamicObject) -> Result<NodeMetricsSample> {
    let value = serde_json::to_value(&object)
        .map_err(|e| ClientError::decode_failed("NodeMetrics", e.to_string()))?;
    let metrics: NodeMetrics = serde_json::from_value(value)
        .map_err(|e| ClientError::decode_failed("NodeMetrics", e.to_string()))?;
    Ok(NodeMetricsSample::from(metrics))
}

#[async_trait]
impl ClusterClient for KubeClient {
    /// GET /api/v1/nodes
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        debug!("Listing nodes");
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = nodes
            .list(&ListParams::default())
            .await
            .map_err(|e| ClientError::from_kube("node list", e))?;
        Ok(list.items)
    }

    /// GET /apis/metrics.k8s.io/v1beta1/nodes
    async fn list_node_metrics(&self) -> Result<Vec<NodeMetricsSample>> {
        debug!("Listing node metrics");
        let metrics: Api<DynamicObject> = Api::all_with(self.client.clone(), &self.node_metrics);
        let list = metrics
            .list(&ListParams::default())
            .await
            .map_err(|e| ClientError::from_kube("node metrics", e))?;
        list.items.into_iter().map(metrics_sample).collect()
    }

    /// POST /api/v1/namespaces/{namespace}/pods/{name}/binding
    async fn create_binding(&self, decision: &BindingDecision) -> Result<()> {
        debug!("Creating binding {}", decision);
        let body = serde_json::to_vec(&binding_object(decision))
            .map_err(|e| ClientError::decode_failed("Binding", e.to_string()))?;

        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &decision.pod_namespace);
        pods.create_subresource::<serde_json::Value>(
            "binding",
            &decision.pod_name,
            &PostParams::default(),
            body,
        )
        .await
        .map_err(|e| ClientError::from_kube("pod binding", e))?;
        Ok(())
    }
}
