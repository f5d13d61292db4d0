//! End-to-end planning: obstacles in, world waypoints out.

use crate::actions::Action;
use crate::astar::{find_path, Heuristic, SearchConfig};
use crate::error::PlanError;
use crate::grid::{build_grid, GridConfig, OccupancyGrid};
use crate::mapping::nearest_free;
use crate::models::{Cell, GridBounds, GridOrigin, LocalPosition, Obstacle, WorldPoint};
use crate::prune::{path_length, prune_path};
use crate::viz::VisualizationSink;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Flight altitude, positive up.
    pub vehicle_altitude: f64,
    pub safety_distance: f64,
    #[serde(default)]
    pub bounds: Option<GridBounds>,
    #[serde(default)]
    pub max_grid_cells: Option<usize>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub heuristic: Heuristic,
    #[serde(default = "default_true")]
    pub prune: bool,
    /// Move an occupied start or goal to the closest free cell.
    #[serde(default = "default_true")]
    pub resolve_free_cells: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            vehicle_altitude: 5.0,
            safety_distance: 5.0,
            bounds: None,
            max_grid_cells: None,
            search: SearchConfig::default(),
            heuristic: Heuristic::default(),
            prune: true,
            resolve_free_cells: true,
        }
    }
}

impl PlannerConfig {
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            vehicle_altitude: self.vehicle_altitude,
            safety_distance: self.safety_distance,
            bounds: self.bounds,
            max_cells: self.max_grid_cells,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub start_cell: Cell,
    pub goal_cell: Cell,
    /// Start or goal was occupied and moved to the nearest free cell.
    pub start_resolved: bool,
    pub goal_resolved: bool,
    /// Search output before pruning.
    pub raw_path: Vec<Cell>,
    /// Path flown; equal to `raw_path` when pruning is disabled.
    pub path: Vec<Cell>,
    pub waypoints: Vec<WorldPoint>,
    /// Summed action cost of `raw_path`.
    pub cost: f64,
    /// Straight-line length of `path`, in metres.
    pub length_m: f64,
    pub nodes_expanded: usize,
    pub north_size: usize,
    pub east_size: usize,
    pub origin: GridOrigin,
}

/// Runs grid construction, search and pruning for one request.
pub struct RoutePlanner<'a> {
    config: PlannerConfig,
    sink: Option<&'a dyn VisualizationSink>,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config, sink: None }
    }

    pub fn with_sink(mut self, sink: &'a dyn VisualizationSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan(
        &self,
        obstacles: &[Obstacle],
        start: LocalPosition,
        goal: LocalPosition,
    ) -> Result<RoutePlan, PlanError> {
        let grid = build_grid(obstacles, &self.config.grid_config())?;
        self.plan_on_grid(&grid, start, goal)
    }

    /// Plan on an already built grid.
    pub fn plan_on_grid(
        &self,
        grid: &OccupancyGrid,
        start: LocalPosition,
        goal: LocalPosition,
    ) -> Result<RoutePlan, PlanError> {
        if let Some(sink) = self.sink {
            sink.grid_built(grid);
        }

        let (start_cell, start_resolved) = self.resolve_endpoint(grid, start, "start")?;
        let (goal_cell, goal_resolved) = self.resolve_endpoint(grid, goal, "goal")?;

        let heuristic = self.config.heuristic;
        let searched = find_path(
            grid,
            |cell, target| heuristic.evaluate(cell, target),
            start_cell,
            goal_cell,
            &self.config.search,
        );
        if let Some(sink) = self.sink {
            let path = searched.as_ref().ok().map(|outcome| outcome.path.as_slice());
            sink.search_finished(grid, start_cell, goal_cell, path);
        }
        let outcome = searched?;

        let path = if self.config.prune {
            prune_path(&outcome.path, grid)
        } else {
            outcome.path.clone()
        };
        if let Some(sink) = self.sink {
            sink.path_pruned(grid, &outcome.path, &path);
        }

        let waypoints = path
            .iter()
            .map(|cell| grid.cell_to_world(*cell, self.config.vehicle_altitude))
            .collect();

        tracing::debug!(
            %start_cell,
            %goal_cell,
            cost = outcome.cost,
            raw_len = outcome.path.len(),
            len = path.len(),
            "route planned"
        );

        Ok(RoutePlan {
            start_cell,
            goal_cell,
            start_resolved,
            goal_resolved,
            length_m: path_length(&path),
            raw_path: outcome.path,
            path,
            waypoints,
            cost: outcome.cost,
            nodes_expanded: outcome.nodes_expanded,
            north_size: grid.north_size(),
            east_size: grid.east_size(),
            origin: grid.origin(),
        })
    }

    fn resolve_endpoint(
        &self,
        grid: &OccupancyGrid,
        position: LocalPosition,
        label: &'static str,
    ) -> Result<(Cell, bool), PlanError> {
        let cell = grid.world_to_cell(position);
        if grid.is_free(cell) || !self.config.resolve_free_cells {
            return Ok((cell, false));
        }
        let free = nearest_free(grid, cell)?;
        tracing::info!(
            endpoint = label,
            from = %cell,
            to = %free,
            "endpoint occupied, using nearest free cell"
        );
        Ok((free, true))
    }
}

/// Summed action cost of `path`, or `None` if it is empty, takes a step that
/// is not a single move, or enters an occupied cell.
pub fn validate_path(grid: &OccupancyGrid, path: &[Cell]) -> Option<f64> {
    if path.is_empty() || !grid.contains(path[0]) {
        return None;
    }
    let mut cost = 0.0;
    for pair in path.windows(2) {
        let action = Action::between(pair[0], pair[1])?;
        if grid.is_occupied(pair[1]) {
            return None;
        }
        cost += action.cost;
    }
    Some(cost)
}
