use crate::handlers::common::decode_body;
use crate::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::Json;
use metrics_extender_core::{
    ExtenderArgs, ExtenderBindingArgs, ExtenderBindingResult, ExtenderFilterResult,
    ExtenderPreemptionArgs, ExtenderPreemptionResult, HostPriorityList,
};
use std::sync::Arc;

/// POST /scheduler/filter
pub async fn filter(State(state): State<Arc<AppState>>, body: Body) -> Json<ExtenderFilterResult> {
    match decode_body::<ExtenderArgs>(&state, "filter", body).await {
        Ok(args) => Json(state.extender.filter(args).await),
        Err(e) => Json(ExtenderFilterResult::from_error(e.to_string())),
    }
}

/// POST /scheduler/prioritize
///
/// An undecodable request scores nothing.
pub async fn prioritize(State(state): State<Arc<AppState>>, body: Body) -> Json<HostPriorityList> {
    match decode_body::<ExtenderArgs>(&state, "prioritize", body).await {
        Ok(args) => Json(state.extender.prioritize(&args).await.priorities),
        Err(_) => Json(Vec::new()),
    }
}

/// POST /scheduler/preemption
pub async fn preempt(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Json<ExtenderPreemptionResult> {
    match decode_body::<ExtenderPreemptionArgs>(&state, "preemption", body).await {
        Ok(args) => Json(state.extender.preempt(&args)),
        Err(_) => Json(ExtenderPreemptionResult::default()),
    }
}

/// POST /scheduler/bind
pub async fn bind(State(state): State<Arc<AppState>>, body: Body) -> Json<ExtenderBindingResult> {
    match decode_body::<ExtenderBindingArgs>(&state, "bind", body).await {
        Ok(args) => Json(state.extender.bind(&args).await),
        Err(e) => Json(ExtenderBindingResult::from_error(e.to_string())),
    }
}
