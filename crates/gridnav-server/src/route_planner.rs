//! Request-level route planning on top of the core planner.

use chrono::{DateTime, Utc};
use gridnav_core::{
    GridBounds, LocalPosition, Obstacle, PlanError, PlannerConfig, RoutePlan, RoutePlanner,
    SearchAbort, SearchConfig, SearchMode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinError;

use crate::config::Config;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlanRequest {
    pub obstacles: Vec<Obstacle>,
    pub start: LocalPosition,
    pub goal: LocalPosition,
    /// Flight altitude; the server default applies when absent.
    pub altitude: Option<f64>,
    pub safety_distance: Option<f64>,
    pub mode: Option<SearchMode>,
    pub prune: Option<bool>,
    pub bounds: Option<GridBounds>,
}

impl RoutePlanRequest {
    pub fn new(obstacles: Vec<Obstacle>, start: LocalPosition, goal: LocalPosition) -> Self {
        Self {
            obstacles,
            start,
            goal,
            altitude: None,
            safety_distance: None,
            mode: None,
            prune: None,
            bounds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlanResponse {
    pub ok: bool,
    pub plan: Option<RoutePlan>,
    /// Set when the request was valid but no route could be produced.
    pub failure: Option<PlanFailure>,
    pub errors: Vec<String>,
    pub planned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanFailure {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<SearchAbort>,
}

impl RoutePlanResponse {
    fn planned(plan: RoutePlan) -> Self {
        Self {
            ok: true,
            plan: Some(plan),
            failure: None,
            errors: Vec::new(),
            planned_at: Utc::now(),
        }
    }

    fn failed(err: &PlanError) -> Self {
        let failure = err.is_recoverable().then(|| PlanFailure {
            kind: err.kind().to_string(),
            reason: match err {
                PlanError::NoPathFound { reason } => Some(*reason),
                _ => None,
            },
        });
        Self {
            ok: false,
            plan: None,
            failure,
            errors: vec![err.to_string()],
            planned_at: Utc::now(),
        }
    }

    fn rejected(err: &RequestError) -> Self {
        Self {
            ok: false,
            plan: None,
            failure: None,
            errors: vec![err.to_string()],
            planned_at: Utc::now(),
        }
    }

    /// Valid request that produced no route.
    pub fn is_route_failure(&self) -> bool {
        !self.ok && self.failure.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("safety_distance must not be negative")]
    NegativeSafetyDistance,
}

/// Resolve request overrides against the server defaults.
pub fn planner_config(config: &Config, request: &RoutePlanRequest) -> Result<PlannerConfig, RequestError> {
    let altitude = request.altitude.unwrap_or(config.default_altitude);
    let safety_distance = request
        .safety_distance
        .unwrap_or(config.default_safety_distance);

    for (field, value) in [
        ("altitude", altitude),
        ("safety_distance", safety_distance),
        ("start.north", request.start.north),
        ("start.east", request.start.east),
        ("goal.north", request.goal.north),
        ("goal.east", request.goal.east),
    ] {
        if !value.is_finite() {
            return Err(RequestError::NotFinite { field });
        }
    }
    if safety_distance < 0.0 {
        return Err(RequestError::NegativeSafetyDistance);
    }

    Ok(PlannerConfig {
        vehicle_altitude: altitude,
        safety_distance,
        bounds: request.bounds,
        max_grid_cells: config.max_grid_cells,
        search: SearchConfig {
            mode: request.mode.unwrap_or_default(),
            max_expansions: config.max_expansions,
            time_limit_ms: config.time_limit_ms,
        },
        prune: request.prune.unwrap_or(true),
        ..PlannerConfig::default()
    })
}

/// Plan one request on a blocking worker.
///
/// Errors only when the worker itself dies; planning failures are reported in
/// the response.
pub async fn plan_route(
    config: &Config,
    request: RoutePlanRequest,
) -> Result<RoutePlanResponse, JoinError> {
    let planner_config = match planner_config(config, &request) {
        Ok(planner_config) => planner_config,
        Err(err) => {
            tracing::warn!(error = %err, "rejected route request");
            return Ok(RoutePlanResponse::rejected(&err));
        }
    };

    tokio::task::spawn_blocking(move || {
        let planner = RoutePlanner::new(planner_config);
        match planner.plan(&request.obstacles, request.start, request.goal) {
            Ok(plan) => {
                tracing::info!(
                    obstacles = request.obstacles.len(),
                    waypoints = plan.waypoints.len(),
                    nodes_expanded = plan.nodes_expanded,
                    cost = plan.cost,
                    "route planned"
                );
                RoutePlanResponse::planned(plan)
            }
            Err(err) if err.is_recoverable() => {
                tracing::info!(kind = err.kind(), error = %err, "no route");
                RoutePlanResponse::failed(&err)
            }
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "route request failed");
                RoutePlanResponse::failed(&err)
            }
        }
    })
    .await
}
