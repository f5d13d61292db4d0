//! 2.5D grid route planning.
//!
//! Obstacles are rasterized at a flight altitude into an [`OccupancyGrid`],
//! searched with 8-connected A* and the result is pruned to the waypoints
//! that need line of sight. [`RoutePlanner`] runs the whole pipeline.

pub mod actions;
pub mod astar;
pub mod error;
pub mod grid;
pub mod line;
pub mod mapping;
pub mod models;
pub mod planner;
pub mod prune;
pub mod viz;

pub use actions::{valid_actions, Action, Direction, ACTIONS};
pub use astar::{
    euclidean, find_path, octile, Heuristic, SearchConfig, SearchMode, SearchOutcome,
};
pub use error::{PlanError, SearchAbort};
pub use grid::{build_grid, GridConfig, OccupancyGrid};
pub use line::{blocked, has_line_of_sight, rasterize, LineCells};
pub use mapping::{nearest_free, to_grid, to_world};
pub use models::{Cell, GridBounds, GridOrigin, LocalPosition, Obstacle, WorldPoint};
pub use planner::{validate_path, PlannerConfig, RoutePlan, RoutePlanner};
pub use prune::{path_length, prune_path};
pub use viz::{NullSink, VisualizationSink};
