use crate::metrics::UsageSample;
use metrics_extender_core::{HostPriority, HostPriorityList};
use tracing::debug;

/// Score nodes by inverse CPU usage relative to the least-loaded node.
///
/// `score = min_usage - usage + 1`: the least-loaded node (and any node tied
/// with it) scores 1, busier nodes score lower, possibly negative. The range
/// is unbounded; kube-scheduler normalizes extender scores when combining
/// them with its own plugins. Entries keep the order of `samples`.
pub fn score_by_cpu_usage(samples: &[UsageSample]) -> HostPriorityList {
    let Some(min_usage) = samples.iter().map(|s| s.cpu_millicores).min() else {
        return Vec::new();
    };

    samples
        .iter()
        .map(|sample| {
            let score = min_usage
                .saturating_sub(sample.cpu_millicores)
                .saturating_add(1);
            debug!(
                "Node {} CPU usage: {}m, score: {}",
                sample.node_name, sample.cpu_millicores, score
            );
            HostPriority::new(sample.node_name.clone(), score)
        })
        .collect()
}
