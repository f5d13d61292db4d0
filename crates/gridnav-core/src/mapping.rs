//! Conversions between the local world frame and grid indices.

use crate::error::PlanError;
use crate::grid::OccupancyGrid;
use crate::models::{Cell, GridOrigin, LocalPosition, WorldPoint};

/// Map a world position to grid indices, clamping to the grid edge.
///
/// Never fails: positions off the grid land on the nearest boundary cell.
pub fn to_grid(position: LocalPosition, origin: GridOrigin, shape: (usize, usize)) -> Cell {
    let (north_size, east_size) = shape;
    Cell::new(
        clamp_axis(position.north - origin.north_min as f64, north_size),
        clamp_axis(position.east - origin.east_min as f64, east_size),
    )
}

/// Map a cell back to the world frame at `altitude`. The vertical component is
/// returned as `down`, i.e. negated.
pub fn to_world(cell: Cell, altitude: f64, origin: GridOrigin) -> WorldPoint {
    WorldPoint {
        north: cell.north as f64 + origin.north_min as f64,
        east: cell.east as f64 + origin.east_min as f64,
        down: -altitude,
    }
}

/// Closest free cell to `cell` by Euclidean distance.
///
/// Scans every free cell in row-major order; the first cell at the minimum
/// distance wins. A free `cell` is its own answer.
pub fn nearest_free(grid: &OccupancyGrid, cell: Cell) -> Result<Cell, PlanError> {
    let mut best: Option<(Cell, f64)> = None;
    for candidate in grid.free_cells() {
        let distance = candidate.distance(&cell);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
        if distance == 0.0 {
            break;
        }
    }
    best.map(|(found, _)| found).ok_or(PlanError::NoFreeCell)
}

fn clamp_axis(offset: f64, size: usize) -> usize {
    let max = size.saturating_sub(1) as f64;
    offset.clamp(0.0, max) as usize
}
