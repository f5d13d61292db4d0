//! Occupancy grid built from 2.5-D box obstacles.
//!
//! The grid covers the horizontal footprint of every obstacle at one metre per
//! cell. An obstacle is rasterized only when its top, raised by the safety
//! distance, reaches above the vehicle altitude.

use crate::error::PlanError;
use crate::models::{Cell, GridBounds, GridOrigin, LocalPosition, Obstacle, WorldPoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Flight altitude the grid is sliced at (positive up).
    pub vehicle_altitude: f64,
    /// Margin added around every obstacle footprint and to its height.
    pub safety_distance: f64,
    /// Region to cover instead of the obstacle bounding box.
    #[serde(default)]
    pub bounds: Option<GridBounds>,
    /// Refuse to allocate grids larger than this many cells.
    #[serde(default)]
    pub max_cells: Option<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            vehicle_altitude: 5.0,
            safety_distance: 5.0,
            bounds: None,
            max_cells: None,
        }
    }
}

/// Boolean occupancy grid, stored row-major (north-major).
///
/// Deserialized grids are checked to hold exactly `north_size * east_size`
/// cells with both sizes non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct OccupancyGrid {
    north_size: usize,
    east_size: usize,
    origin: GridOrigin,
    cells: Vec<bool>,
}

/// Unchecked wire form of [`OccupancyGrid`].
#[derive(Deserialize)]
struct GridData {
    north_size: usize,
    east_size: usize,
    origin: GridOrigin,
    cells: Vec<bool>,
}

impl TryFrom<GridData> for OccupancyGrid {
    type Error = String;

    fn try_from(data: GridData) -> Result<Self, Self::Error> {
        if data.north_size == 0 || data.east_size == 0 {
            return Err(format!(
                "occupancy grid {}x{} has no cells",
                data.north_size, data.east_size
            ));
        }
        let expected = data.north_size.checked_mul(data.east_size);
        if expected != Some(data.cells.len()) {
            return Err(format!(
                "occupancy grid {}x{} carries {} cells",
                data.north_size,
                data.east_size,
                data.cells.len()
            ));
        }
        Ok(Self {
            north_size: data.north_size,
            east_size: data.east_size,
            origin: data.origin,
            cells: data.cells,
        })
    }
}

impl OccupancyGrid {
    /// All-free grid of `north_size * east_size` cells.
    ///
    /// Fails with [`PlanError::GridTooLarge`] when the count overflows, passes
    /// `limit`, or cannot be allocated.
    fn empty(
        north_size: usize,
        east_size: usize,
        origin: GridOrigin,
        limit: Option<usize>,
    ) -> Result<Self, PlanError> {
        let limit_or_max = limit.unwrap_or(usize::MAX);
        let too_large = |cells: usize| PlanError::GridTooLarge {
            cells,
            limit: limit_or_max,
        };
        let len = north_size
            .checked_mul(east_size)
            .ok_or_else(|| too_large(usize::MAX))?;
        if len > limit_or_max {
            return Err(too_large(len));
        }

        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| too_large(len))?;
        cells.resize(len, false);
        Ok(Self {
            north_size,
            east_size,
            origin,
            cells,
        })
    }

    /// Build a grid from explicit rows (`true` = occupied).
    ///
    /// # Panics
    ///
    /// Panics if `rows` is empty or the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<bool>>, origin: GridOrigin) -> Self {
        let north_size = rows.len();
        let east_size = rows.first().map(|row| row.len()).unwrap_or(0);
        assert!(
            north_size > 0 && east_size > 0,
            "occupancy grid must have at least one cell"
        );
        assert!(
            rows.iter().all(|row| row.len() == east_size),
            "occupancy grid rows must all have {} cells",
            east_size
        );
        Self {
            north_size,
            east_size,
            origin,
            cells: rows.into_iter().flatten().collect(),
        }
    }

    pub fn north_size(&self) -> usize {
        self.north_size
    }

    pub fn east_size(&self) -> usize {
        self.east_size
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.north_size, self.east_size)
    }

    pub fn origin(&self) -> GridOrigin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.north < self.north_size && cell.east < self.east_size
    }

    /// Occupancy of `cell`, or `None` when it lies outside the grid.
    pub fn get(&self, cell: Cell) -> Option<bool> {
        if self.contains(cell) {
            Some(self.cells[self.index(cell)])
        } else {
            None
        }
    }

    /// Cells outside the grid count as occupied.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.get(cell).unwrap_or(true)
    }

    pub fn is_free(&self, cell: Cell) -> bool {
        self.get(cell) == Some(false)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|occupied| **occupied).count()
    }

    /// Free cells in row-major order.
    pub fn free_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupied)| !**occupied)
            .map(|(idx, _)| Cell::new(idx / self.east_size, idx % self.east_size))
    }

    /// Rows from north index 0 upwards.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells.chunks(self.east_size)
    }

    /// World position to the nearest in-bounds cell.
    pub fn world_to_cell(&self, position: LocalPosition) -> Cell {
        crate::mapping::to_grid(position, self.origin, self.shape())
    }

    pub fn cell_to_world(&self, cell: Cell, altitude: f64) -> WorldPoint {
        crate::mapping::to_world(cell, altitude, self.origin)
    }

    fn index(&self, cell: Cell) -> usize {
        cell.north * self.east_size + cell.east
    }

    fn fill(&mut self, north: (usize, usize), east: (usize, usize)) {
        for n in north.0..=north.1 {
            let row = n * self.east_size;
            self.cells[row + east.0..=row + east.1].fill(true);
        }
    }
}

/// Rasterize `obstacles` into an occupancy grid sliced at the vehicle altitude.
pub fn build_grid(obstacles: &[Obstacle], config: &GridConfig) -> Result<OccupancyGrid, PlanError> {
    for (index, obstacle) in obstacles.iter().enumerate() {
        if !obstacle.is_finite() {
            return Err(PlanError::InvalidObstacle {
                index,
                reason: "non-finite coordinate or extent".to_string(),
            });
        }
        if obstacle.d_north < 0.0 || obstacle.d_east < 0.0 || obstacle.d_altitude < 0.0 {
            return Err(PlanError::InvalidObstacle {
                index,
                reason: "negative half-extent".to_string(),
            });
        }
    }

    let bounds = match config.bounds {
        Some(bounds) => {
            check_bounds(&bounds)?;
            bounds
        }
        None => obstacle_bounds(obstacles).ok_or(PlanError::DegenerateObstacleSet)?,
    };

    let north_min = bounds.north_min.floor();
    let east_min = bounds.east_min.floor();
    let north_size = axis_size(north_min, bounds.north_max.ceil());
    let east_size = axis_size(east_min, bounds.east_max.ceil());

    let origin = GridOrigin::new(north_min as i64, east_min as i64);
    let mut grid = OccupancyGrid::empty(north_size, east_size, origin, config.max_cells)?;
    let margin = config.safety_distance;

    let mut rasterized = 0usize;
    for obstacle in obstacles {
        if obstacle.inflated_top(margin) <= config.vehicle_altitude {
            continue;
        }
        let north = (
            clip_index(obstacle.north - obstacle.d_north - margin - north_min, north_size),
            clip_index(obstacle.north + obstacle.d_north + margin - north_min, north_size),
        );
        let east = (
            clip_index(obstacle.east - obstacle.d_east - margin - east_min, east_size),
            clip_index(obstacle.east + obstacle.d_east + margin - east_min, east_size),
        );
        grid.fill(north, east);
        rasterized += 1;
    }

    tracing::debug!(
        north_size,
        east_size,
        north_min = origin.north_min,
        east_min = origin.east_min,
        obstacles = obstacles.len(),
        rasterized,
        occupied = grid.occupied_count(),
        "built occupancy grid"
    );

    Ok(grid)
}

fn check_bounds(bounds: &GridBounds) -> Result<(), PlanError> {
    let axes = [
        ("north", bounds.north_min, bounds.north_max),
        ("east", bounds.east_min, bounds.east_max),
    ];
    for (axis, min, max) in axes {
        if !min.is_finite() || !max.is_finite() {
            return Err(PlanError::InvalidBounds {
                reason: format!("{} range {}..{} is not finite", axis, min, max),
            });
        }
        if max < min {
            return Err(PlanError::InvalidBounds {
                reason: format!("{} range {}..{} is inverted", axis, min, max),
            });
        }
    }
    Ok(())
}

fn obstacle_bounds(obstacles: &[Obstacle]) -> Option<GridBounds> {
    let first = obstacles.first()?;
    let mut bounds = GridBounds::new(
        first.north - first.d_north,
        first.north + first.d_north,
        first.east - first.d_east,
        first.east + first.d_east,
    );
    for obstacle in &obstacles[1..] {
        bounds.north_min = bounds.north_min.min(obstacle.north - obstacle.d_north);
        bounds.north_max = bounds.north_max.max(obstacle.north + obstacle.d_north);
        bounds.east_min = bounds.east_min.min(obstacle.east - obstacle.d_east);
        bounds.east_max = bounds.east_max.max(obstacle.east + obstacle.d_east);
    }
    Some(bounds)
}

fn axis_size(min: f64, max: f64) -> usize {
    let span = (max - min).ceil();
    if span.is_finite() && span >= 1.0 {
        span as usize
    } else {
        1
    }
}

/// Clamp an offset to `[0, size - 1]` and truncate it to an index.
fn clip_index(offset: f64, size: usize) -> usize {
    offset.clamp(0.0, (size - 1) as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(altitude: f64, safety: f64) -> GridConfig {
        GridConfig {
            vehicle_altitude: altitude,
            safety_distance: safety,
            ..GridConfig::default()
        }
    }

    #[test]
    fn grid_covers_obstacle_union() {
        let obstacles = vec![
            Obstacle::new(10.0, 10.0, 5.0, 2.0, 2.0, 5.0),
            Obstacle::new(20.5, 30.0, 5.0, 1.0, 3.0, 5.0),
        ];
        let grid = build_grid(&obstacles, &config(5.0, 0.0)).unwrap();
        // north: floor(8) .. ceil(21.5) = 22, east: floor(8) .. ceil(33)
        assert_eq!(grid.origin(), GridOrigin::new(8, 8));
        assert_eq!(grid.shape(), (14, 25));
    }

    #[test]
    fn short_obstacles_are_skipped() {
        let obstacles = vec![
            Obstacle::new(0.0, 0.0, 1.0, 5.0, 5.0, 1.0),
            Obstacle::new(20.0, 20.0, 1.0, 5.0, 5.0, 1.0),
        ];
        // top = 2 + margin 1 = 3, below the 5m flight level
        let grid = build_grid(&obstacles, &config(5.0, 1.0)).unwrap();
        assert_eq!(grid.occupied_count(), 0);

        // raising the margin puts the tops above the flight level
        let grid = build_grid(&obstacles, &config(5.0, 3.5)).unwrap();
        assert!(grid.occupied_count() > 0);
    }

    #[test]
    fn footprint_is_inflated_and_clipped() {
        let obstacles = vec![
            Obstacle::new(0.0, 0.0, 10.0, 1.0, 1.0, 10.0),
            Obstacle::new(10.0, 10.0, 1.0, 0.0, 0.0, 0.0),
        ];
        let grid = build_grid(&obstacles, &config(5.0, 2.0)).unwrap();
        assert_eq!(grid.origin(), GridOrigin::new(-1, -1));
        assert_eq!(grid.shape(), (11, 11));

        // inflated footprint [-3, 3] offsets to [-2, 4], clipped to [0, 4]
        for n in 0..11 {
            for e in 0..11 {
                let expected = n <= 4 && e <= 4;
                assert_eq!(grid.is_occupied(Cell::new(n, e)), expected, "cell ({}, {})", n, e);
            }
        }
    }

    #[test]
    fn obstacle_outside_explicit_bounds_marks_the_edge() {
        let obstacles = vec![Obstacle::new(50.0, 5.0, 10.0, 1.0, 1.0, 10.0)];
        let cfg = GridConfig {
            bounds: Some(GridBounds::new(0.0, 10.0, 0.0, 10.0)),
            ..config(5.0, 0.0)
        };
        let grid = build_grid(&obstacles, &cfg).unwrap();
        assert_eq!(grid.shape(), (10, 10));
        for e in 0..10 {
            let expected = (4..=6).contains(&e);
            assert_eq!(grid.is_occupied(Cell::new(9, e)), expected);
            assert!(!grid.is_occupied(Cell::new(8, e)));
        }
    }

    #[test]
    fn empty_obstacles_need_bounds() {
        assert_eq!(
            build_grid(&[], &GridConfig::default()),
            Err(PlanError::DegenerateObstacleSet)
        );

        let cfg = GridConfig {
            bounds: Some(GridBounds::new(-5.0, 5.0, 0.0, 3.0)),
            ..GridConfig::default()
        };
        let grid = build_grid(&[], &cfg).unwrap();
        assert_eq!(grid.shape(), (10, 3));
        assert_eq!(grid.origin(), GridOrigin::new(-5, 0));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn invalid_obstacles_are_rejected() {
        let obstacles = vec![
            Obstacle::new(0.0, 0.0, 1.0, 1.0, 1.0, 1.0),
            Obstacle::new(f64::INFINITY, 0.0, 1.0, 1.0, 1.0, 1.0),
        ];
        let err = build_grid(&obstacles, &GridConfig::default()).unwrap_err();
        assert!(matches!(err, PlanError::InvalidObstacle { index: 1, .. }));

        let obstacles = vec![Obstacle::new(0.0, 0.0, 1.0, -1.0, 1.0, 1.0)];
        let err = build_grid(&obstacles, &GridConfig::default()).unwrap_err();
        assert!(matches!(err, PlanError::InvalidObstacle { index: 0, .. }));
    }

    #[test]
    fn cell_budget_is_enforced() {
        let obstacles = vec![Obstacle::new(50.0, 50.0, 1.0, 50.0, 50.0, 1.0)];
        let cfg = GridConfig {
            max_cells: Some(1_000),
            ..GridConfig::default()
        };
        assert_eq!(
            build_grid(&obstacles, &cfg),
            Err(PlanError::GridTooLarge {
                cells: 10_000,
                limit: 1_000
            })
        );
    }

    #[test]
    fn overflowing_cell_count_is_rejected() {
        let obstacles = vec![Obstacle::new(0.0, 0.0, 10.0, 1e30, 1e30, 10.0)];
        assert_eq!(
            build_grid(&obstacles, &GridConfig::default()),
            Err(PlanError::GridTooLarge {
                cells: usize::MAX,
                limit: usize::MAX
            })
        );

        let cfg = GridConfig {
            max_cells: Some(1_000),
            ..GridConfig::default()
        };
        assert_eq!(
            build_grid(&obstacles, &cfg),
            Err(PlanError::GridTooLarge {
                cells: usize::MAX,
                limit: 1_000
            })
        );
    }

    #[test]
    fn unallocatable_grid_is_rejected() {
        // 1e9 x 1e9 fits in usize but not in memory
        let cfg = GridConfig {
            bounds: Some(GridBounds::new(0.0, 1e9, 0.0, 1e9)),
            ..GridConfig::default()
        };
        assert_eq!(
            build_grid(&[], &cfg),
            Err(PlanError::GridTooLarge {
                cells: 1_000_000_000_000_000_000,
                limit: usize::MAX
            })
        );
    }

    #[test]
    fn explicit_bounds_must_be_ordered_and_finite() {
        let obstacles = vec![Obstacle::new(5.0, 5.0, 10.0, 1.0, 1.0, 10.0)];
        let cases = [
            GridBounds::new(10.0, 0.0, 0.0, 10.0),
            GridBounds::new(0.0, 10.0, 10.0, 0.0),
            GridBounds::new(f64::NAN, 10.0, 0.0, 10.0),
            GridBounds::new(0.0, f64::INFINITY, 0.0, 10.0),
            GridBounds::new(0.0, 10.0, f64::NEG_INFINITY, 10.0),
        ];
        for bounds in cases {
            let cfg = GridConfig {
                bounds: Some(bounds),
                ..GridConfig::default()
            };
            let err = build_grid(&obstacles, &cfg).unwrap_err();
            assert!(matches!(err, PlanError::InvalidBounds { .. }), "{:?}: {:?}", bounds, err);
        }

        // a zero-width range is still one cell wide
        let cfg = GridConfig {
            bounds: Some(GridBounds::new(3.0, 3.0, 0.0, 4.0)),
            ..GridConfig::default()
        };
        assert_eq!(build_grid(&obstacles, &cfg).unwrap().shape(), (1, 4));
    }

    #[test]
    fn serialized_grid_round_trips() {
        let grid = OccupancyGrid::from_rows(
            vec![vec![true, false, false], vec![false, false, true]],
            GridOrigin::new(-3, 7),
        );
        let json = serde_json::to_string(&grid).unwrap();
        let back: OccupancyGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn malformed_grid_json_is_rejected() {
        let origin = r#""origin":{"north_min":0,"east_min":0}"#;
        let cases = [
            format!(r#"{{"north_size":2,"east_size":2,{},"cells":[]}}"#, origin),
            format!(r#"{{"north_size":1,"east_size":2,{},"cells":[false,false,true]}}"#, origin),
            format!(r#"{{"north_size":0,"east_size":0,{},"cells":[]}}"#, origin),
            format!(
                r#"{{"north_size":{},"east_size":2,{},"cells":[false]}}"#,
                usize::MAX,
                origin
            ),
        ];
        for json in &cases {
            let err = serde_json::from_str::<OccupancyGrid>(json).unwrap_err();
            assert!(err.to_string().contains("occupancy grid"), "{}", err);
        }
    }

    #[test]
    fn degenerate_extent_still_yields_a_cell() {
        let obstacles = vec![Obstacle::new(3.0, 4.0, 10.0, 0.0, 0.0, 1.0)];
        let grid = build_grid(&obstacles, &config(5.0, 0.0)).unwrap();
        assert_eq!(grid.shape(), (1, 1));
        assert!(grid.is_occupied(Cell::new(0, 0)));
    }

    #[test]
    fn free_cells_are_row_major() {
        let grid = OccupancyGrid::from_rows(
            vec![vec![true, false], vec![false, true]],
            GridOrigin::default(),
        );
        let free: Vec<Cell> = grid.free_cells().collect();
        assert_eq!(free, vec![Cell::new(0, 1), Cell::new(1, 0)]);
        assert!(grid.is_occupied(Cell::new(5, 0)));
        assert_eq!(grid.get(Cell::new(5, 0)), None);
    }

    #[test]
    #[should_panic]
    fn ragged_rows_panic() {
        OccupancyGrid::from_rows(vec![vec![true, false], vec![false]], GridOrigin::default());
    }
}
