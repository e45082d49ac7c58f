use crate::error::{ExtenderError, Result};
use metrics_extender_client::ClusterClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// CPU usage of one node, in millicores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSample {
    pub node_name: String,
    pub cpu_millicores: i64,
}

impl UsageSample {
    pub fn new(node_name: impl Into<String>, cpu_millicores: i64) -> Self {
        Self {
            node_name: node_name.into(),
            cpu_millicores,
        }
    }
}

/// Usable samples of one fetch, in the order the metrics API returned them
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub samples: Vec<UsageSample>,
    /// Nodes whose sample had no parseable CPU usage
    pub malformed: Vec<String>,
}

/// Fetches a fresh node utilization snapshot for every prioritize call
pub struct MetricsFetcher {
    client: Arc<dyn ClusterClient>,
    timeout: Duration,
}

impl MetricsFetcher {
    pub fn new(client: Arc<dyn ClusterClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetch and parse the current snapshot. Never cached.
    pub async fn fetch(&self) -> Result<MetricsSnapshot> {
        let raw = tokio::time::timeout(self.timeout, self.client.list_node_metrics())
            .await
            .map_err(|_| ExtenderError::timeout("node metrics", self.timeout))?
            .map_err(|e| ExtenderError::metrics_unavailable(e.to_string()))?;

        let mut snapshot = MetricsSnapshot::default();

        for sample in raw {
            match sample.cpu_millicores() {
                Ok(cpu) => {
                    debug!("Node {} CPU usage: {}m", sample.node_name, cpu);
                    snapshot
                        .samples
                        .push(UsageSample::new(sample.node_name, cpu));
                }
                Err(e) => {
                    warn!(
                        node = %sample.node_name,
                        error = %e,
                        "Dropping node metrics sample with unusable CPU usage"
                    );
                    snapshot.malformed.push(sample.node_name);
                }
            }
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_extender_client::MockClusterClient;
    use metrics_extender_core::NodeMetricsSample;

    #[tokio::test]
    async fn test_fetch_parses_samples_in_order() {
        let client = Arc::new(MockClusterClient::new());
        client
            .set_metrics(vec![
                NodeMetricsSample::new("n2", "300m"),
                NodeMetricsSample::new("n1", "100000000n"),
            ])
            .await;

        let fetcher = MetricsFetcher::new(client.clone(), Duration::from_secs(1));
        let snapshot = fetcher.fetch().await.unwrap();

        assert_eq!(
            snapshot.samples,
            vec![UsageSample::new("n2", 300), UsageSample::new("n1", 100)]
        );
        assert!(snapshot.malformed.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_is_never_cached() {
        let client = Arc::new(MockClusterClient::new());
        let fetcher = MetricsFetcher::new(client.clone(), Duration::from_secs(1));

        fetcher.fetch().await.unwrap();
        fetcher.fetch().await.unwrap();
        assert_eq!(client.list_metrics_calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_drops_malformed_samples() {
        let client = Arc::new(MockClusterClient::new());
        client
            .set_metrics(vec![
                NodeMetricsSample::new("good", "250m"),
                NodeMetricsSample::new("bad", "lots"),
                NodeMetricsSample {
                    node_name: "empty".to_string(),
                    cpu: None,
                    timestamp: None,
                },
            ])
            .await;

        let fetcher = MetricsFetcher::new(client, Duration::from_secs(1));
        let snapshot = fetcher.fetch().await.unwrap();

        assert_eq!(snapshot.samples, vec![UsageSample::new("good", 250)]);
        assert_eq!(snapshot.malformed, vec!["bad", "empty"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_metrics_unavailable() {
        let client = Arc::new(MockClusterClient::new());
        client.fail_metrics("service unavailable").await;

        let fetcher = MetricsFetcher::new(client, Duration::from_secs(1));
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, ExtenderError::MetricsUnavailable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_honors_deadline() {
        let client = Arc::new(MockClusterClient::new());
        client.set_latency(Duration::from_secs(30)).await;

        let fetcher = MetricsFetcher::new(client, Duration::from_secs(2));
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, ExtenderError::Timeout { .. }));
    }
}
