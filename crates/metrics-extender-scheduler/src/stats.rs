use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-lifetime counters of extender activity
///
/// Relaxed atomics: each counter is independent and only read for
/// diagnostics.
#[derive(Debug, Default)]
pub struct ExtenderStats {
    filter_requests: AtomicU64,
    admission_exhausted: AtomicU64,
    prioritize_requests: AtomicU64,
    metrics_fetch_failures: AtomicU64,
    malformed_samples: AtomicU64,
    out_of_candidates: AtomicU64,
    preempt_requests: AtomicU64,
    bind_requests: AtomicU64,
    bind_failures: AtomicU64,
    decode_failures: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub filter_requests: u64,
    pub admission_exhausted: u64,
    pub prioritize_requests: u64,
    pub metrics_fetch_failures: u64,
    pub malformed_samples: u64,
    pub out_of_candidates: u64,
    pub preempt_requests: u64,
    pub bind_requests: u64,
    pub bind_failures: u64,
    pub decode_failures: u64,
}

fn bump(counter: &AtomicU64, by: u64) {
    counter.fetch_add(by, Ordering::Relaxed);
}

impl ExtenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_filter(&self) {
        bump(&self.filter_requests, 1);
    }

    pub fn record_admission_exhausted(&self) {
        bump(&self.admission_exhausted, 1);
    }

    pub fn record_prioritize(&self) {
        bump(&self.prioritize_requests, 1);
    }

    pub fn record_metrics_failure(&self) {
        bump(&self.metrics_fetch_failures, 1);
    }

    pub fn record_malformed_samples(&self, count: usize) {
        bump(&self.malformed_samples, count as u64);
    }

    pub fn record_out_of_candidates(&self, count: usize) {
        bump(&self.out_of_candidates, count as u64);
    }

    pub fn record_preempt(&self) {
        bump(&self.preempt_requests, 1);
    }

    pub fn record_bind(&self) {
        bump(&self.bind_requests, 1);
    }

    pub fn record_bind_failure(&self) {
        bump(&self.bind_failures, 1);
    }

    pub fn record_decode_failure(&self) {
        bump(&self.decode_failures, 1);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            filter_requests: load(&self.filter_requests),
            admission_exhausted: load(&self.admission_exhausted),
            prioritize_requests: load(&self.prioritize_requests),
            metrics_fetch_failures: load(&self.metrics_fetch_failures),
            malformed_samples: load(&self.malformed_samples),
            out_of_candidates: load(&self.out_of_candidates),
            preempt_requests: load(&self.preempt_requests),
            bind_requests: load(&self.bind_requests),
            bind_failures: load(&self.bind_failures),
            decode_failures: load(&self.decode_failures),
        }
    }
}
