//! Planning service: an axum front end over `gridnav-core`.

pub mod api;
pub mod config;
pub mod route_planner;
pub mod state;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Full application router with health check and middleware.
pub fn build_app(state: Arc<AppState>) -> Router {
    api::routes()
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(api::request_id::ensure_request_id))
        .layer(CorsLayer::permissive())
}
