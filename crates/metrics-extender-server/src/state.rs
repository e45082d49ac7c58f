use metrics_extender_scheduler::Extender;
use std::sync::Arc;

/// Largest request body read by default (64 MiB)
///
/// Filter and prioritize bodies carry full Node objects for the whole
/// candidate set, which exceeds axum's 2 MB default on large clusters.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Extender verbs
    pub extender: Arc<Extender>,

    /// Upper bound on a request body
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(extender: Arc<Extender>) -> Self {
        Self {
            extender,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
