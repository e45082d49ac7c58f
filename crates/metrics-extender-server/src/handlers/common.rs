use crate::AppState;
use axum::body::Body;
use metrics_extender_scheduler::ExtenderError;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Read and decode a JSON request body
///
/// Failures are counted and logged; the caller turns them into a
/// well-formed extender response instead of an HTTP error.
pub async fn decode_body<T: DeserializeOwned>(
    state: &AppState,
    endpoint: &str,
    body: Body,
) -> Result<T, ExtenderError> {
    let result = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => serde_json::from_slice::<T>(&bytes)
            .map_err(|e| ExtenderError::decode_failure(endpoint, e.to_string())),
        Err(e) => Err(ExtenderError::decode_failure(endpoint, e.to_string())),
    };

    if let Err(e) = &result {
        state.extender.stats().record_decode_failure();
        warn!("{}", e);
    }
    result
}
