//! Integer line rasterization and line-of-sight checks.

use crate::grid::OccupancyGrid;
use crate::models::Cell;

/// Cells visited by a Bresenham line from one cell to another, both ends
/// included. Emits exactly one cell per step along the dominant axis.
///
/// The walk direction matters for ties; use [`rasterize`] when the result must
/// not depend on endpoint order.
#[derive(Debug, Clone)]
pub struct LineCells {
    north: i64,
    east: i64,
    end_north: i64,
    end_east: i64,
    /// Absolute north span.
    d_north: i64,
    /// Negated absolute east span.
    d_east: i64,
    step_north: i64,
    step_east: i64,
    error: i64,
    done: bool,
}

impl LineCells {
    pub fn new(from: Cell, to: Cell) -> Self {
        let (north, east) = (from.north as i64, from.east as i64);
        let (end_north, end_east) = (to.north as i64, to.east as i64);
        let d_north = (end_north - north).abs();
        let d_east = -(end_east - east).abs();
        Self {
            north,
            east,
            end_north,
            end_east,
            d_north,
            d_east,
            step_north: if north < end_north { 1 } else { -1 },
            step_east: if east < end_east { 1 } else { -1 },
            error: d_north + d_east,
            done: false,
        }
    }
}

impl Iterator for LineCells {
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Coordinates never leave the box spanned by the two endpoints.
        let cell = Cell::new(self.north as usize, self.east as usize);
        if self.north == self.end_north && self.east == self.end_east {
            self.done = true;
            return Some(cell);
        }

        let doubled = 2 * self.error;
        if doubled >= self.d_east {
            self.error += self.d_east;
            self.north += self.step_north;
        }
        if doubled <= self.d_north {
            self.error += self.d_north;
            self.east += self.step_east;
        }
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = (self.end_north - self.north)
            .abs()
            .max((self.end_east - self.east).abs()) as usize
            + 1;
        (remaining, Some(remaining))
    }
}

/// Cells on the segment `a`–`b`, ordered from `a` to `b`.
///
/// Always walks from the lexicographically smaller endpoint, so
/// `rasterize(b, a)` is exactly `rasterize(a, b)` reversed.
pub fn rasterize(a: Cell, b: Cell) -> Vec<Cell> {
    if a <= b {
        LineCells::new(a, b).collect()
    } else {
        let mut cells: Vec<Cell> = LineCells::new(b, a).collect();
        cells.reverse();
        cells
    }
}

/// True when any cell on the segment `a`–`b` is occupied or off the grid.
pub fn blocked(grid: &OccupancyGrid, a: Cell, b: Cell) -> bool {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    LineCells::new(lo, hi).any(|cell| grid.is_occupied(cell))
}

pub fn has_line_of_sight(grid: &OccupancyGrid, a: Cell, b: Cell) -> bool {
    !blocked(grid, a, b)
}
