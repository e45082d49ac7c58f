//! Payloads of the kube-scheduler extender protocol (`k8s.io/kube-scheduler/extender/v1`).
//!
//! Field names follow the Go JSON tags exactly. Optional collections are
//! modelled as `Option` so that "absent" and "empty" survive a round trip,
//! which matters to the scheduler: it reads `nodes` or `nodenames` depending
//! on its `nodeCacheCapable` setting.

use crate::types::{node_name, pod_name};
use k8s_openapi::api::core::v1::{Node, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node name -> reason the node was rejected
pub type FailedNodesMap = BTreeMap<String, String>;

/// A list of nodes as embedded in extender payloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ListMeta>,
    #[serde(default)]
    pub items: Vec<Node>,
}

impl NodeList {
    pub fn new(items: Vec<Node>) -> Self {
        Self {
            metadata: None,
            items,
        }
    }
}

/// Arguments for the filter and prioritize verbs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtenderArgs {
    /// Pod being scheduled
    #[serde(default)]
    pub pod: Option<Pod>,
    /// Candidate nodes, sent when the extender is not node-cache capable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<NodeList>,
    /// Candidate node names, sent when the extender is node-cache capable
    #[serde(default, rename = "nodenames", skip_serializing_if = "Option::is_none")]
    pub node_names: Option<Vec<String>>,
}

impl ExtenderArgs {
    /// Name of the pod in the request, or "unknown"
    pub fn pod_name(&self) -> &str {
        self.pod.as_ref().map(pod_name).unwrap_or("unknown")
    }

    /// Candidate node names in request order.
    ///
    /// Full node objects take precedence over the names list. Returns `None`
    /// when the caller sent neither.
    pub fn candidate_names(&self) -> Option<Vec<String>> {
        if let Some(nodes) = &self.nodes {
            return Some(
                nodes
                    .items
                    .iter()
                    .map(|n| node_name(n).to_string())
                    .collect(),
            );
        }
        self.node_names.clone()
    }
}

/// Result of the filter verb
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtenderFilterResult {
    /// Admitted nodes (read when not node-cache capable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<NodeList>,
    /// Admitted node names (read when node-cache capable)
    #[serde(default, rename = "nodenames", skip_serializing_if = "Option::is_none")]
    pub node_names: Option<Vec<String>>,
    /// Rejected nodes and the reason; the scheduler may retry them after preemption
    #[serde(default, rename = "failedNodes", skip_serializing_if = "Option::is_none")]
    pub failed_nodes: Option<FailedNodesMap>,
    /// Rejected nodes that preemption cannot help
    #[serde(
        default,
        rename = "failedAndUnresolvableNodes",
        skip_serializing_if = "Option::is_none"
    )]
    pub failed_and_unresolvable_nodes: Option<FailedNodesMap>,
    /// Error message; when set, the node fields are ignored by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtenderFilterResult {
    /// Build a result carrying only an error
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Score of a single host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPriority {
    pub host: String,
    pub score: i64,
}

impl HostPriority {
    pub fn new(host: impl Into<String>, score: i64) -> Self {
        Self {
            host: host.into(),
            score,
        }
    }
}

/// Result of the prioritize verb
pub type HostPriorityList = Vec<HostPriority>;

/// Victims on a node, as full pod objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Victims {
    #[serde(default)]
    pub pods: Vec<Pod>,
    #[serde(default, rename = "numPDBViolations")]
    pub num_pdb_violations: i64,
}

/// Lightweight reference to a victim pod
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaPod {
    #[serde(default)]
    pub uid: String,
}

/// Victims on a node, as pod UIDs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaVictims {
    #[serde(default)]
    pub pods: Vec<MetaPod>,
    #[serde(default, rename = "numPDBViolations")]
    pub num_pdb_violations: i64,
}

impl From<&Victims> for MetaVictims {
    fn from(victims: &Victims) -> Self {
        Self {
            pods: victims
                .pods
                .iter()
                .map(|p| MetaPod {
                    uid: p.metadata.uid.clone().unwrap_or_default(),
                })
                .collect(),
            num_pdb_violations: victims.num_pdb_violations,
        }
    }
}

/// Arguments for the preemption verb
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtenderPreemptionArgs {
    #[serde(default)]
    pub pod: Option<Pod>,
    #[serde(default, rename = "nodeNameToVictims", skip_serializing_if = "Option::is_none")]
    pub node_name_to_victims: Option<BTreeMap<String, Victims>>,
    #[serde(
        default,
        rename = "nodeNameToMetaVictims",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_name_to_meta_victims: Option<BTreeMap<String, MetaVictims>>,
}

impl ExtenderPreemptionArgs {
    /// Name of the preemptor pod, or "unknown"
    pub fn pod_name(&self) -> &str {
        self.pod.as_ref().map(pod_name).unwrap_or("unknown")
    }
}

/// Result of the preemption verb
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtenderPreemptionResult {
    #[serde(
        default,
        rename = "nodeNameToMetaVictims",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_name_to_meta_victims: Option<BTreeMap<String, MetaVictims>>,
}

/// Arguments for the bind verb
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtenderBindingArgs {
    #[serde(default, rename = "podName")]
    pub pod_name: String,
    #[serde(default, rename = "podNamespace")]
    pub pod_namespace: String,
    #[serde(default, rename = "podUID")]
    pub pod_uid: String,
    #[serde(default)]
    pub node: String,
}

/// Result of the bind verb; success is the absence of an error
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtenderBindingResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtenderBindingResult {
    pub fn success() -> Self {
        Self { error: None }
    }

    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }
}
