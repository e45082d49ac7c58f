use crate::error::{ExtenderError, Result};
use crate::filter::{admit, HasLabel};
use crate::metrics::{MetricsFetcher, UsageSample};
use crate::preempt::{EchoVictims, PreemptionPolicy};
use crate::score::score_by_cpu_usage;
use crate::stats::ExtenderStats;
use crate::types::{Degradation, FilterOutcome, PrioritizeReport};
use k8s_openapi::api::core::v1::Node;
use metrics_extender_client::ClusterClient;
use metrics_extender_core::{
    node_name, BindingDecision, ExtenderArgs, ExtenderBindingArgs, ExtenderBindingResult,
    ExtenderFilterResult, ExtenderPreemptionArgs, ExtenderPreemptionResult,
};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Label key admitted by default
pub const DEFAULT_ADMISSION_LABEL: &str = "filter.xy.com";

/// Which nodes of a metrics snapshot get a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringScope {
    /// Only nodes that are also in the request's candidate set
    #[default]
    Candidates,
    /// Every node that reported metrics
    Snapshot,
}

/// Extender configuration
#[derive(Debug, Clone)]
pub struct ExtenderConfig {
    /// Label key a node must carry to pass Filter
    pub admission_label: String,
    /// Deadline for each call into the cluster
    pub request_timeout: Duration,
    pub scoring_scope: ScoringScope,
}

impl Default for ExtenderConfig {
    fn default() -> Self {
        Self {
            admission_label: DEFAULT_ADMISSION_LABEL.to_string(),
            request_timeout: Duration::from_secs(10),
            scoring_scope: ScoringScope::default(),
        }
    }
}

/// The four scheduler extender verbs over one cluster connection
pub struct Extender {
    client: Arc<dyn ClusterClient>,
    config: ExtenderConfig,
    predicate: HasLabel,
    preemption: Box<dyn PreemptionPolicy>,
    metrics: MetricsFetcher,
    stats: ExtenderStats,
}

impl Extender {
    /// Create a new extender using the echo preemption policy
    pub fn new(client: Arc<dyn ClusterClient>, config: ExtenderConfig) -> Self {
        let predicate = HasLabel::new(config.admission_label.clone());
        let metrics = MetricsFetcher::new(client.clone(), config.request_timeout);

        Self {
            client,
            config,
            predicate,
            preemption: Box::new(EchoVictims),
            metrics,
            stats: ExtenderStats::new(),
        }
    }

    /// Replace the preemption policy
    pub fn with_preemption_policy(mut self, policy: Box<dyn PreemptionPolicy>) -> Self {
        self.preemption = policy;
        self
    }

    pub fn config(&self) -> &ExtenderConfig {
        &self.config
    }

    pub fn stats(&self) -> &ExtenderStats {
        &self.stats
    }

    /// Run a cluster call under the request deadline
    async fn with_deadline<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = metrics_extender_client::Result<T>>,
    {
        tokio::time::timeout(self.config.request_timeout, call)
            .await
            .map_err(|_| ExtenderError::timeout(operation, self.config.request_timeout))?
            .map_err(ExtenderError::from)
    }

    /// Filter: keep the candidates that carry the admission label
    pub async fn filter(&self, args: ExtenderArgs) -> ExtenderFilterResult {
        self.stats.record_filter();
        let pod = args.pod_name().to_string();

        let outcome = match self.filter_candidates(args).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(pod = %pod, error = %e, "Filter could not resolve candidate nodes");
                return ExtenderFilterResult::from_error(e.to_string());
            }
        };

        if outcome.admitted.is_empty() {
            self.stats.record_admission_exhausted();
            let err = ExtenderError::admission_exhausted(&self.config.admission_label);
            info!(pod = %pod, rejected = outcome.failed.len(), "{}", err);
            return ExtenderFilterResult::from_error(err.to_string());
        }

        info!(
            pod = %pod,
            admitted = outcome.admitted.len(),
            rejected = outcome.failed.len(),
            "Filter finished"
        );
        outcome.into_filter_result()
    }

    async fn filter_candidates(&self, args: ExtenderArgs) -> Result<FilterOutcome> {
        if let Some(nodes) = args.nodes {
            return Ok(admit(&self.predicate, args.pod.as_ref(), nodes.items));
        }

        let Some(names) = args.node_names else {
            return Ok(FilterOutcome::default());
        };

        // Names only: label data has to come from the cluster
        let mut known: BTreeMap<String, Node> = self
            .with_deadline("node list", self.client.list_nodes())
            .await?
            .into_iter()
            .map(|n| (node_name(&n).to_string(), n))
            .collect();

        let mut seen = BTreeSet::new();
        let mut resolved = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            // Repeated names are considered once, at their first position
            if !seen.insert(name.clone()) {
                continue;
            }
            match known.remove(&name) {
                Some(node) => resolved.push(node),
                None => unknown.push(name),
            }
        }

        let mut outcome = admit(&self.predicate, args.pod.as_ref(), resolved);
        for name in unknown {
            debug!("Node {} is not known to the cluster", name);
            outcome.failed.insert(name, "node not found".to_string());
        }
        Ok(outcome)
    }

    /// Prioritize: score nodes by how little CPU they use right now
    ///
    /// Never fails. When no snapshot can be fetched the list is empty and
    /// the report carries the reason.
    pub async fn prioritize(&self, args: &ExtenderArgs) -> PrioritizeReport {
        self.stats.record_prioritize();
        let pod = args.pod_name();

        let snapshot = match self.metrics.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.stats.record_metrics_failure();
                warn!(pod = %pod, error = %e, "Node metrics unavailable, returning no priorities");
                return PrioritizeReport::degraded(
                    Vec::new(),
                    Degradation::MetricsUnavailable {
                        reason: e.to_string(),
                    },
                );
            }
        };

        let scored = self.scored_samples(args, snapshot.samples);
        let priorities = score_by_cpu_usage(&scored);
        info!(pod = %pod, scored = priorities.len(), "Prioritize finished");

        if snapshot.malformed.is_empty() {
            PrioritizeReport::complete(priorities)
        } else {
            self.stats.record_malformed_samples(snapshot.malformed.len());
            PrioritizeReport::degraded(
                priorities,
                Degradation::PartialSnapshot {
                    dropped: snapshot.malformed,
                },
            )
        }
    }

    fn scored_samples(&self, args: &ExtenderArgs, samples: Vec<UsageSample>) -> Vec<UsageSample> {
        if self.config.scoring_scope == ScoringScope::Snapshot {
            return samples;
        }
        let Some(candidates) = args.candidate_names() else {
            return samples;
        };

        let candidates: BTreeSet<String> = candidates.into_iter().collect();
        let (kept, outside): (Vec<_>, Vec<_>) = samples
            .into_iter()
            .partition(|s| candidates.contains(&s.node_name));

        if !outside.is_empty() {
            debug!("Skipping {} nodes outside the candidate set", outside.len());
            self.stats.record_out_of_candidates(outside.len());
        }
        kept
    }

    /// Preempt: hand the proposed victims to the preemption policy
    pub fn preempt(&self, args: &ExtenderPreemptionArgs) -> ExtenderPreemptionResult {
        self.stats.record_preempt();
        let nodes = args
            .node_name_to_meta_victims
            .as_ref()
            .map(|m| m.len())
            .or_else(|| args.node_name_to_victims.as_ref().map(|m| m.len()))
            .unwrap_or(0);
        info!(
            pod = %args.pod_name(),
            nodes,
            policy = self.preemption.name(),
            "Preemption requested"
        );

        self.preemption.select_victims(args)
    }

    /// Bind: commit the pod to the chosen node, once
    pub async fn bind(&self, args: &ExtenderBindingArgs) -> ExtenderBindingResult {
        self.stats.record_bind();

        match self.try_bind(args).await {
            Ok(decision) => {
                info!("Bound {}", decision);
                ExtenderBindingResult::success()
            }
            Err(e) => {
                self.stats.record_bind_failure();
                error!(
                    pod = %args.pod_name,
                    namespace = %args.pod_namespace,
                    node = %args.node,
                    error = %e,
                    "Bind failed"
                );
                ExtenderBindingResult::from_error(e.to_string())
            }
        }
    }

    async fn try_bind(&self, args: &ExtenderBindingArgs) -> Result<BindingDecision> {
        let decision = BindingDecision::from_args(args)?;

        self.with_deadline("pod binding", self.client.create_binding(&decision))
            .await
            .map_err(|e| match e {
                ExtenderError::Cluster(inner) => ExtenderError::bind_commit_failure(
                    format!("{}/{}", decision.pod_namespace, decision.pod_name),
                    &decision.node_name,
                    inner.to_string(),
                ),
                other => other,
            })?;

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_extender_client::MockClusterClient;
    use metrics_extender_core::{HostPriority, MetaPod, MetaVictims, NodeList, NodeMetricsSample};

    fn labelled_node(name: &str, labels: &[(&str, &str)]) -> Node {
        let mut node = Node::default();
        node.metadata.name = Some(name.to_string());
        if !labels.is_empty() {
            node.metadata.labels = Some(
                labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            );
        }
        node
    }

    fn node_args(nodes: Vec<Node>) -> ExtenderArgs {
        ExtenderArgs {
            pod: None,
            nodes: Some(NodeList::new(nodes)),
            node_names: None,
        }
    }

    fn name_args(names: &[&str]) -> ExtenderArgs {
        ExtenderArgs {
            pod: None,
            nodes: None,
            node_names: Some(names.iter().map(|n| n.to_string()).collect()),
        }
    }

    fn bind_args(pod: &str, node: &str) -> ExtenderBindingArgs {
        ExtenderBindingArgs {
            pod_name: pod.to_string(),
            pod_namespace: "default".to_string(),
            pod_uid: "uid-1".to_string(),
            node: node.to_string(),
        }
    }

    fn extender(client: Arc<MockClusterClient>) -> Extender {
        Extender::new(client, ExtenderConfig::default())
    }

    #[tokio::test]
    async fn test_filter_admits_labelled_nodes() {
        let client = Arc::new(MockClusterClient::new());
        let extender = extender(client.clone());

        let result = extender
            .filter(node_args(vec![
                labelled_node("n1", &[(DEFAULT_ADMISSION_LABEL, "x")]),
                labelled_node("n2", &[]),
            ]))
            .await;

        assert!(result.error.is_none());
        assert_eq!(result.node_names, Some(vec!["n1".to_string()]));
        assert_eq!(result.nodes.unwrap().items.len(), 1);
        assert!(result.failed_nodes.unwrap().contains_key("n2"));
        assert_eq!(client.list_nodes_calls(), 0);
    }

    #[tokio::test]
    async fn test_filter_label_value_is_ignored() {
        let extender = extender(Arc::new(MockClusterClient::new()));
        let result = extender
            .filter(node_args(vec![labelled_node(
                "n1",
                &[(DEFAULT_ADMISSION_LABEL, "")],
            )]))
            .await;
        assert_eq!(result.node_names, Some(vec!["n1".to_string()]));
    }

    #[tokio::test]
    async fn test_filter_without_labelled_nodes_is_an_error() {
        let extender = extender(Arc::new(MockClusterClient::new()));

        let result = extender
            .filter(node_args(vec![labelled_node("n1", &[])]))
            .await;

        assert_eq!(
            result.error.as_deref(),
            Some("all node do not have label filter.xy.com")
        );
        assert!(result.nodes.is_none());
        assert!(result.node_names.is_none());
        assert_eq!(extender.stats().snapshot().admission_exhausted, 1);
    }

    #[tokio::test]
    async fn test_filter_with_empty_request_is_an_error() {
        let extender = extender(Arc::new(MockClusterClient::new()));
        let result = extender.filter(ExtenderArgs::default()).await;
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_filter_uses_configured_label() {
        let config = ExtenderConfig {
            admission_label: "gpu.example.com".to_string(),
            ..Default::default()
        };
        let extender = Extender::new(Arc::new(MockClusterClient::new()), config);

        let result = extender
            .filter(node_args(vec![
                labelled_node("n1", &[(DEFAULT_ADMISSION_LABEL, "x")]),
                labelled_node("n2", &[("gpu.example.com", "a100")]),
            ]))
            .await;
        assert_eq!(result.node_names, Some(vec!["n2".to_string()]));
    }

    #[tokio::test]
    async fn test_filter_names_only_resolves_through_cluster() {
        let client = Arc::new(MockClusterClient::new());
        client
            .set_nodes(vec![
                labelled_node("n1", &[(DEFAULT_ADMISSION_LABEL, "x")]),
                labelled_node("n2", &[]),
                labelled_node("n3", &[(DEFAULT_ADMISSION_LABEL, "y")]),
            ])
            .await;
        let extender = extender(client.clone());

        let result = extender.filter(name_args(&["n3", "n2", "ghost", "n1"])).await;

        assert_eq!(
            result.node_names,
            Some(vec!["n3".to_string(), "n1".to_string()])
        );
        let failed = result.failed_nodes.unwrap();
        assert_eq!(failed["ghost"], "node not found");
        assert!(failed.contains_key("n2"));
        assert_eq!(client.list_nodes_calls(), 1);
    }

    #[tokio::test]
    async fn test_filter_names_only_ignores_repeated_names() {
        let client = Arc::new(MockClusterClient::new());
        client
            .set_nodes(vec![labelled_node("n1", &[(DEFAULT_ADMISSION_LABEL, "x")])])
            .await;
        let extender = extender(client);

        let result = extender.filter(name_args(&["n1", "n1"])).await;

        assert!(result.error.is_none());
        assert_eq!(result.node_names, Some(vec!["n1".to_string()]));
        assert!(result.failed_nodes.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_names_only_times_out() {
        let client = Arc::new(MockClusterClient::new());
        client.set_latency(Duration::from_secs(60)).await;
        let extender = extender(client);

        let result = extender.filter(name_args(&["n1"])).await;
        assert!(result.error.unwrap().contains("Timed out"));
    }

    #[tokio::test]
    async fn test_prioritize_inverse_cpu_usage() {
        let client = Arc::new(MockClusterClient::new());
        client
            .set_metrics(vec![
                NodeMetricsSample::new("n1", "100m"),
                NodeMetricsSample::new("n2", "300m"),
            ])
            .await;
        let extender = extender(client);

        let report = extender.prioritize(&ExtenderArgs::default()).await;
        assert!(!report.is_degraded());
        assert_eq!(
            report.priorities,
            vec![HostPriority::new("n1", 1), HostPriority::new("n2", -199)]
        );
    }

    #[tokio::test]
    async fn test_prioritize_is_stable_across_calls() {
        let client = Arc::new(MockClusterClient::new());
        client
            .set_metrics(vec![
                NodeMetricsSample::new("a", "250m"),
                NodeMetricsSample::new("b", "1"),
            ])
            .await;
        let extender = extender(client.clone());

        let first = extender.prioritize(&ExtenderArgs::default()).await;
        let second = extender.prioritize(&ExtenderArgs::default()).await;
        assert_eq!(first, second);
        assert_eq!(client.list_metrics_calls(), 2);
    }

    #[tokio::test]
    async fn test_prioritize_degrades_on_metrics_failure() {
        let client = Arc::new(MockClusterClient::new());
        client.fail_metrics("the server is currently unable to handle the request").await;
        let extender = extender(client);

        let report = extender.prioritize(&ExtenderArgs::default()).await;
        assert!(report.priorities.is_empty());
        assert!(matches!(
            report.degradation,
            Some(Degradation::MetricsUnavailable { .. })
        ));
        assert_eq!(extender.stats().snapshot().metrics_fetch_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prioritize_degrades_on_timeout() {
        let client = Arc::new(MockClusterClient::new());
        client.set_metrics(vec![NodeMetricsSample::new("n1", "1")]).await;
        client.set_latency(Duration::from_secs(60)).await;
        let extender = extender(client);

        let report = extender.prioritize(&ExtenderArgs::default()).await;
        assert!(report.priorities.is_empty());
        assert!(report.is_degraded());
    }

    #[tokio::test]
    async fn test_prioritize_scores_only_candidates() {
        let client = Arc::new(MockClusterClient::new());
        client
            .set_metrics(vec![
                NodeMetricsSample::new("busy", "900m"),
                NodeMetricsSample::new("idle", "10m"),
                NodeMetricsSample::new("mid", "400m"),
            ])
            .await;
        let extender = extender(client);

        let report = extender.prioritize(&name_args(&["busy", "mid"])).await;
        assert_eq!(
            report.priorities,
            vec![HostPriority::new("busy", -499), HostPriority::new("mid", 1)]
        );
        assert_eq!(extender.stats().snapshot().out_of_candidates, 1);
    }

    #[tokio::test]
    async fn test_prioritize_snapshot_scope_scores_everything() {
        let client = Arc::new(MockClusterClient::new());
        client
            .set_metrics(vec![
                NodeMetricsSample::new("busy", "900m"),
                NodeMetricsSample::new("idle", "10m"),
            ])
            .await;
        let config = ExtenderConfig {
            scoring_scope: ScoringScope::Snapshot,
            ..Default::default()
        };
        let extender = Extender::new(client, config);

        let report = extender.prioritize(&name_args(&["busy"])).await;
        assert_eq!(
            report.priorities,
            vec![HostPriority::new("busy", -889), HostPriority::new("idle", 1)]
        );
    }

    #[tokio::test]
    async fn test_prioritize_reports_malformed_samples() {
        let client = Arc::new(MockClusterClient::new());
        client
            .set_metrics(vec![
                NodeMetricsSample::new("n1", "200m"),
                NodeMetricsSample::new("n2", "garbage"),
            ])
            .await;
        let extender = extender(client);

        let report = extender.prioritize(&ExtenderArgs::default()).await;
        assert_eq!(report.priorities, vec![HostPriority::new("n1", 1)]);
        assert_eq!(
            report.degradation,
            Some(Degradation::PartialSnapshot {
                dropped: vec!["n2".to_string()]
            })
        );
    }

    #[test]
    fn test_preempt_echoes_plan() {
        let extender = extender(Arc::new(MockClusterClient::new()));
        let mut plan = BTreeMap::new();
        plan.insert(
            "n1".to_string(),
            MetaVictims {
                pods: vec![MetaPod {
                    uid: "victim".to_string(),
                }],
                num_pdb_violations: 0,
            },
        );
        let args = ExtenderPreemptionArgs {
            pod: None,
            node_name_to_victims: None,
            node_name_to_meta_victims: Some(plan.clone()),
        };

        let result = extender.preempt(&args);
        assert_eq!(result.node_name_to_meta_victims, Some(plan));
        assert_eq!(extender.stats().snapshot().preempt_requests, 1);
    }

    #[tokio::test]
    async fn test_bind_commits_once() {
        let client = Arc::new(MockClusterClient::new());
        client.set_nodes(vec![labelled_node("n1", &[])]).await;
        let extender = extender(client.clone());

        let result = extender.bind(&bind_args("web-0", "n1")).await;
        assert!(result.error.is_none());

        let bindings = client.bindings().await;
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].node_name, "n1");
        assert_eq!(bindings[0].pod_uid, "uid-1");
    }

    #[tokio::test]
    async fn test_bind_unknown_node_surfaces_error() {
        let client = Arc::new(MockClusterClient::new());
        let extender = extender(client.clone());

        let result = extender.bind(&bind_args("web-0", "ghost")).await;
        let message = result.error.unwrap();
        assert!(message.contains("ghost"));
        assert_eq!(client.binding_calls(), 1);
        assert_eq!(extender.stats().snapshot().bind_failures, 1);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_not_retried() {
        let client = Arc::new(MockClusterClient::new());
        client.set_nodes(vec![labelled_node("n1", &[])]).await;
        let extender = extender(client.clone());

        assert!(extender.bind(&bind_args("web-0", "n1")).await.error.is_none());
        let second = extender.bind(&bind_args("web-0", "n1")).await;
        assert!(second.error.unwrap().contains("already assigned"));
        assert_eq!(client.binding_calls(), 2);
    }

    #[tokio::test]
    async fn test_bind_api_failure_is_verbatim() {
        let client = Arc::new(MockClusterClient::new());
        client.fail_binding(403, "binding is forbidden").await;
        let extender = extender(client.clone());

        let result = extender.bind(&bind_args("web-0", "n1")).await;
        assert!(result.error.unwrap().contains("binding is forbidden"));
        assert_eq!(client.binding_calls(), 1);
    }

    #[tokio::test]
    async fn test_bind_missing_fields_skips_cluster() {
        let client = Arc::new(MockClusterClient::new());
        let extender = extender(client.clone());

        let result = extender.bind(&ExtenderBindingArgs::default()).await;
        assert!(result.error.is_some());
        assert_eq!(client.binding_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bind_times_out() {
        let client = Arc::new(MockClusterClient::new());
        client.set_nodes(vec![labelled_node("n1", &[])]).await;
        client.set_latency(Duration::from_secs(60)).await;
        let extender = extender(client.clone());

        let result = extender.bind(&bind_args("web-0", "n1")).await;
        assert!(result.error.unwrap().contains("Timed out"));
        assert_eq!(client.binding_calls(), 1);
    }
}
