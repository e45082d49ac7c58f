use crate::AppState;
use axum::extract::State;
use axum::Json;
use metrics_extender_scheduler::StatsSnapshot;
use std::sync::Arc;

/// GET /stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsSnapshot> {
    Json(state.extender.stats().snapshot())
}
