use k8s_openapi::api::core::v1::Node;
use metrics_extender_core::{
    node_name, ExtenderFilterResult, FailedNodesMap, HostPriorityList, NodeList,
};

/// Result of filtering a node
#[derive(Debug, Clone)]
pub struct FilterResult {
    /// Node name
    pub node_name: String,
    /// Whether the node passed the filter
    pub passed: bool,
    /// Reason for failure (if any)
    pub reason: Option<String>,
}

impl FilterResult {
    /// Create a passing filter result
    pub fn pass(node_name: String) -> Self {
        Self {
            node_name,
            passed: true,
            reason: None,
        }
    }

    /// Create a failing filter result
    pub fn fail(node_name: String, reason: String) -> Self {
        Self {
            node_name,
            passed: false,
            reason: Some(reason),
        }
    }
}

/// Partition of a candidate set into admitted and rejected nodes
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Admitted nodes, in candidate order
    pub admitted: Vec<Node>,
    /// Rejected node name -> reason
    pub failed: FailedNodesMap,
}

impl FilterOutcome {
    /// Names of the admitted nodes, in order
    pub fn admitted_names(&self) -> Vec<String> {
        self.admitted
            .iter()
            .map(|n| node_name(n).to_string())
            .collect()
    }

    /// Wire result carrying both node representations
    pub fn into_filter_result(self) -> ExtenderFilterResult {
        let names = self.admitted_names();
        ExtenderFilterResult {
            nodes: Some(NodeList::new(self.admitted)),
            node_names: Some(names),
            failed_nodes: (!self.failed.is_empty()).then_some(self.failed),
            failed_and_unresolvable_nodes: None,
            error: None,
        }
    }
}

/// Why a priority list may be incomplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// No snapshot could be fetched; the list is empty
    MetricsUnavailable { reason: String },
    /// Some samples were unusable and their nodes were not scored
    PartialSnapshot { dropped: Vec<String> },
}

/// Priority list plus a record of any best-effort degradation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritizeReport {
    pub priorities: HostPriorityList,
    pub degradation: Option<Degradation>,
}

impl PrioritizeReport {
    pub fn complete(priorities: HostPriorityList) -> Self {
        Self {
            priorities,
            degradation: None,
        }
    }

    pub fn degraded(priorities: HostPriorityList, degradation: Degradation) -> Self {
        Self {
            priorities,
            degradation: Some(degradation),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> Node {
        let mut node = Node::default();
        node.metadata.name = Some(name.to_string());
        node
    }

    #[test]
    fn test_filter_result() {
        let pass = FilterResult::pass("node1".to_string());
        assert!(pass.passed);
        assert!(pass.reason.is_none());

        let fail = FilterResult::fail("node2".to_string(), "missing label".to_string());
        assert!(!fail.passed);
        assert_eq!(fail.reason, Some("missing label".to_string()));
    }

    #[test]
    fn test_outcome_populates_both_representations() {
        let mut failed = FailedNodesMap::new();
        failed.insert("n2".to_string(), "missing label".to_string());
        let outcome = FilterOutcome {
            admitted: vec![node("n1"), node("n3")],
            failed,
        };

        let result = outcome.into_filter_result();
        assert!(result.error.is_none());
        assert_eq!(
            result.node_names,
            Some(vec!["n1".to_string(), "n3".to_string()])
        );
        assert_eq!(result.nodes.unwrap().items.len(), 2);
        assert_eq!(result.failed_nodes.unwrap().len(), 1);
    }

    #[test]
    fn test_outcome_without_rejections_omits_failed_nodes() {
        let outcome = FilterOutcome {
            admitted: vec![node("n1")],
            failed: FailedNodesMap::new(),
        };
        assert!(outcome.into_filter_result().failed_nodes.is_none());
    }
}
