use crate::types::{FilterOutcome, FilterResult};
use k8s_openapi::api::core::v1::{Node, Pod};
use metrics_extender_core::node_name;
use tracing::debug;

/// Filter predicate trait
pub trait FilterPredicate: Send + Sync {
    /// Filter a node for the given pod
    fn filter(&self, pod: Option<&Pod>, node: &Node) -> FilterResult;

    /// Name of the filter
    fn name(&self) -> &str;
}

/// Admits nodes that carry a label key, whatever its value
pub struct HasLabel {
    key: String,
}

impl HasLabel {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FilterPredicate for HasLabel {
    fn filter(&self, _pod: Option<&Pod>, node: &Node) -> FilterResult {
        let name = node_name(node).to_string();

        let labelled = node
            .metadata
            .labels
            .as_ref()
            .is_some_and(|labels| labels.contains_key(&self.key));

        debug!("Node {} has label {}: {}", name, self.key, labelled);

        if labelled {
            FilterResult::pass(name)
        } else {
            FilterResult::fail(name, format!("node does not have label {}", self.key))
        }
    }

    fn name(&self) -> &str {
        "HasLabel"
    }
}

/// Run a predicate over the candidates once, keeping admitted nodes in order
pub fn admit(predicate: &dyn FilterPredicate, pod: Option<&Pod>, nodes: Vec<Node>) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for node in nodes {
        let result = predicate.filter(pod, &node);
        if result.passed {
            outcome.admitted.push(node);
        } else {
            debug!(
                "Node {} filtered out by {}: {}",
                result.node_name,
                predicate.name(),
                result.reason.as_deref().unwrap_or_default()
            );
            outcome
                .failed
                .insert(result.node_name, result.reason.unwrap_or_default());
        }
    }

    outcome
}
