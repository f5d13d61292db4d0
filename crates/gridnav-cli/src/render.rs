//! ASCII rendering of grids and paths, north up.
//!
//! `#` occupied, `.` free, `o` raw path, `*` kept waypoint, `S`/`G` endpoints.

use gridnav_core::{Cell, OccupancyGrid, VisualizationSink};
use std::cell::RefCell;
use std::fmt::Write;

/// Render `grid` with the given overlays. The top line is the highest north
/// row; east grows to the right.
pub fn render_plan(
    grid: &OccupancyGrid,
    endpoints: Option<(Cell, Cell)>,
    raw: &[Cell],
    pruned: &[Cell],
) -> String {
    let (north_size, east_size) = grid.shape();
    let mut canvas: Vec<Vec<char>> = grid
        .rows()
        .map(|row| row.iter().map(|occupied| if *occupied { '#' } else { '.' }).collect())
        .collect();

    let mut mark = |cell: Cell, symbol: char| {
        if grid.contains(cell) {
            canvas[cell.north][cell.east] = symbol;
        }
    };
    raw.iter().for_each(|cell| mark(*cell, 'o'));
    pruned.iter().for_each(|cell| mark(*cell, '*'));
    if let Some((start, goal)) = endpoints {
        mark(start, 'S');
        mark(goal, 'G');
    }

    let origin = grid.origin();
    let mut out = String::with_capacity((east_size + 1) * (north_size + 1));
    let _ = writeln!(
        out,
        "grid {}x{} origin ({}, {})",
        north_size, east_size, origin.north_min, origin.east_min
    );
    for row in canvas.iter().rev() {
        out.extend(row.iter());
        out.push('\n');
    }
    out
}

/// Sink that keeps the latest rendering in memory.
#[derive(Debug, Default)]
pub struct AsciiSink {
    endpoints: RefCell<Option<(Cell, Cell)>>,
    output: RefCell<String>,
}

impl AsciiSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest rendering; empty until the planner has reported a grid.
    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }

    pub fn into_output(self) -> String {
        self.output.into_inner()
    }
}

impl VisualizationSink for AsciiSink {
    fn grid_built(&self, grid: &OccupancyGrid) {
        *self.output.borrow_mut() = render_plan(grid, None, &[], &[]);
    }

    fn search_finished(
        &self,
        grid: &OccupancyGrid,
        start: Cell,
        goal: Cell,
        path: Option<&[Cell]>,
    ) {
        *self.endpoints.borrow_mut() = Some((start, goal));
        *self.output.borrow_mut() = render_plan(grid, Some((start, goal)), path.unwrap_or(&[]), &[]);
    }

    fn path_pruned(&self, grid: &OccupancyGrid, raw: &[Cell], pruned: &[Cell]) {
        let endpoints = *self.endpoints.borrow();
        *self.output.borrow_mut() = render_plan(grid, endpoints, raw, pruned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridnav_core::{GridBounds, GridOrigin, LocalPosition, Obstacle, PlannerConfig, RoutePlanner};

    fn grid(rows: &[&str]) -> OccupancyGrid {
        OccupancyGrid::from_rows(
            rows.iter()
                .map(|row| row.chars().map(|c| c == '#').collect())
                .collect(),
            GridOrigin::new(-2, 5),
        )
    }

    #[test]
    fn renders_north_up() {
        // row 0 is the southern edge
        let g = grid(&["#..", "...", "..#"]);
        assert_eq!(render_plan(&g, None, &[], &[]), "grid 3x3 origin (-2, 5)\n..#\n...\n#..\n");
    }

    #[test]
    fn overlays_take_precedence() {
        let g = grid(&["....", "....", "...."]);
        let raw = vec![Cell::new(0, 0), Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 3)];
        let pruned = vec![Cell::new(0, 0), Cell::new(1, 2), Cell::new(2, 3)];
        let out = render_plan(&g, Some((Cell::new(0, 0), Cell::new(2, 3))), &raw, &pruned);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1..], ["...G", ".o*.", "S..."]);
    }

    #[test]
    fn sink_renders_planned_route() {
        let sink = AsciiSink::new();
        let planner = RoutePlanner::new(PlannerConfig {
            vehicle_altitude: 5.0,
            safety_distance: 0.0,
            bounds: Some(GridBounds::new(0.0, 4.0, 0.0, 5.0)),
            ..PlannerConfig::default()
        })
        .with_sink(&sink);
        let obstacles = vec![Obstacle::new(1.0, 2.0, 5.0, 0.5, 0.4, 5.0)];
        let plan = planner
            .plan(&obstacles, LocalPosition::new(0.0, 0.0), LocalPosition::new(0.0, 4.0))
            .unwrap();

        let out = sink.into_output();
        assert!(out.starts_with("grid 4x5 origin (0, 0)\n"));
        assert_eq!(out.matches('S').count(), 1);
        assert_eq!(out.matches('G').count(), 1);
        assert!(out.contains('*'));
        assert!(out.contains('#'));
        assert_eq!(plan.goal_cell, Cell::new(0, 4));
    }
}
