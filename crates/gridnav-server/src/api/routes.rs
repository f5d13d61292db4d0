use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::route_planner::{plan_route, RoutePlanRequest};
use crate::state::{AppState, PlannerStats};

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/plan", post(plan_route_handler))
        .route("/v1/stats", get(get_stats))
}

async fn plan_route_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RoutePlanRequest>,
) -> impl IntoResponse {
    let response = match plan_route(state.config(), request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "planner task failed");
            state.record_rejected();
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "ok": false, "errors": ["planner task failed"] })),
            );
        }
    };

    let status = if response.ok {
        state.record_served();
        StatusCode::OK
    } else if response.is_route_failure() {
        state.record_without_route();
        StatusCode::OK
    } else {
        state.record_rejected();
        StatusCode::BAD_REQUEST
    };

    match serde_json::to_value(&response) {
        Ok(body) => (status, Json(body)),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode plan response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "ok": false, "errors": ["response encoding failed"] })),
            )
        }
    }
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<PlannerStats> {
    Json(state.stats())
}
