//! Optional observer for planning artefacts.
//!
//! Renderers implement [`VisualizationSink`] and are handed to
//! [`RoutePlanner::with_sink`](crate::planner::RoutePlanner::with_sink).
//! Hooks cannot fail the plan; planning behaves the same with or without a sink.

use crate::grid::OccupancyGrid;
use crate::models::Cell;

pub trait VisualizationSink {
    fn grid_built(&self, _grid: &OccupancyGrid) {}

    /// Called once per search; `path` is `None` when no path was found.
    fn search_finished(
        &self,
        _grid: &OccupancyGrid,
        _start: Cell,
        _goal: Cell,
        _path: Option<&[Cell]>,
    ) {
    }

    fn path_pruned(&self, _grid: &OccupancyGrid, _raw: &[Cell], _pruned: &[Cell]) {}
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl VisualizationSink for NullSink {}
