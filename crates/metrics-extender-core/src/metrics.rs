//! `metrics.k8s.io/v1beta1` node metrics objects, as served by metrics-server.

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::NodeMetricsSample;

/// Resource usage of a single node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
    #[serde(default)]
    pub usage: BTreeMap<String, Quantity>,
}

/// `NodeMetricsList` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetricsList {
    #[serde(default)]
    pub items: Vec<NodeMetrics>,
}

impl From<NodeMetrics> for NodeMetricsSample {
    fn from(mut metrics: NodeMetrics) -> Self {
        Self {
            node_name: metrics.metadata.name.take().unwrap_or_default(),
            cpu: metrics.usage.remove("cpu"),
            timestamp: metrics.timestamp,
        }
    }
}
