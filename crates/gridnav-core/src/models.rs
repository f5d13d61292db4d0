//! Core data models for the planner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A box obstacle described by its center and half-extents, in local NED metres.
///
/// Altitude is positive up; `d_altitude` is the half-height of the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub north: f64,
    pub east: f64,
    pub altitude: f64,
    pub d_north: f64,
    pub d_east: f64,
    pub d_altitude: f64,
}

impl Obstacle {
    pub fn new(
        north: f64,
        east: f64,
        altitude: f64,
        d_north: f64,
        d_east: f64,
        d_altitude: f64,
    ) -> Self {
        Self {
            north,
            east,
            altitude,
            d_north,
            d_east,
            d_altitude,
        }
    }

    /// Top of the obstacle once the safety margin is added.
    pub fn inflated_top(&self, safety_distance: f64) -> f64 {
        self.altitude + self.d_altitude + safety_distance
    }

    pub(crate) fn is_finite(&self) -> bool {
        [
            self.north,
            self.east,
            self.altitude,
            self.d_north,
            self.d_east,
            self.d_altitude,
        ]
        .iter()
        .all(|value| value.is_finite())
    }
}

/// Integer grid indices. `north` selects the row, `east` the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub north: usize,
    pub east: usize,
}

impl Cell {
    pub const fn new(north: usize, east: usize) -> Self {
        Self { north, east }
    }

    /// Straight-line distance to another cell, in cells.
    pub fn distance(&self, other: &Cell) -> f64 {
        let dn = self.north as f64 - other.north as f64;
        let de = self.east as f64 - other.east as f64;
        (dn * dn + de * de).sqrt()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.north, self.east)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((north, east): (usize, usize)) -> Self {
        Self { north, east }
    }
}

/// Horizontal world position (north, east) in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPosition {
    pub north: f64,
    pub east: f64,
}

impl LocalPosition {
    pub const fn new(north: f64, east: f64) -> Self {
        Self { north, east }
    }
}

/// World-frame point in NED convention: `down` is the negated altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

impl WorldPoint {
    pub fn altitude(&self) -> f64 {
        -self.down
    }

    pub fn horizontal(&self) -> LocalPosition {
        LocalPosition::new(self.north, self.east)
    }
}

/// Explicit world region for the grid when obstacles should not define it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub north_min: f64,
    pub north_max: f64,
    pub east_min: f64,
    pub east_max: f64,
}

impl GridBounds {
    pub fn new(north_min: f64, north_max: f64, east_min: f64, east_max: f64) -> Self {
        Self {
            north_min,
            north_max,
            east_min,
            east_max,
        }
    }
}

/// World coordinates of grid cell (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridOrigin {
    pub north_min: i64,
    pub east_min: i64,
}

impl GridOrigin {
    pub const fn new(north_min: i64, east_min: i64) -> Self {
        Self {
            north_min,
            east_min,
        }
    }
}
