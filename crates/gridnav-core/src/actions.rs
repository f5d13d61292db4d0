//! Eight-connected move set with unit and diagonal costs.

use crate::grid::OccupancyGrid;
use crate::models::Cell;
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpRight,
    DownRight,
    DownLeft,
    UpLeft,
}

/// One move: grid delta and traversal cost.
///
/// "Up" decreases the north index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub direction: Direction,
    pub delta_north: i64,
    pub delta_east: i64,
    pub cost: f64,
}

pub const ACTIONS: [Action; 8] = [
    Action::new(Direction::Up, -1, 0, 1.0),
    Action::new(Direction::Down, 1, 0, 1.0),
    Action::new(Direction::Left, 0, -1, 1.0),
    Action::new(Direction::Right, 0, 1, 1.0),
    Action::new(Direction::UpRight, -1, 1, SQRT_2),
    Action::new(Direction::DownRight, 1, 1, SQRT_2),
    Action::new(Direction::DownLeft, 1, -1, SQRT_2),
    Action::new(Direction::UpLeft, -1, -1, SQRT_2),
];

impl Action {
    const fn new(direction: Direction, delta_north: i64, delta_east: i64, cost: f64) -> Self {
        Self {
            direction,
            delta_north,
            delta_east,
            cost,
        }
    }

    pub fn is_diagonal(&self) -> bool {
        self.delta_north != 0 && self.delta_east != 0
    }

    /// Destination of this move from `cell`, if it stays inside `shape`.
    pub fn apply(&self, cell: Cell, shape: (usize, usize)) -> Option<Cell> {
        let north = offset(cell.north, self.delta_north, shape.0)?;
        let east = offset(cell.east, self.delta_east, shape.1)?;
        Some(Cell::new(north, east))
    }

    /// The action that moves `from` onto `to`, if they are neighbours.
    pub fn between(from: Cell, to: Cell) -> Option<&'static Action> {
        let dn = to.north as i64 - from.north as i64;
        let de = to.east as i64 - from.east as i64;
        ACTIONS
            .iter()
            .find(|action| action.delta_north == dn && action.delta_east == de)
    }

    pub fn for_direction(direction: Direction) -> &'static Action {
        match direction {
            Direction::Up => &ACTIONS[0],
            Direction::Down => &ACTIONS[1],
            Direction::Left => &ACTIONS[2],
            Direction::Right => &ACTIONS[3],
            Direction::UpRight => &ACTIONS[4],
            Direction::DownRight => &ACTIONS[5],
            Direction::DownLeft => &ACTIONS[6],
            Direction::UpLeft => &ACTIONS[7],
        }
    }
}

fn offset(index: usize, delta: i64, size: usize) -> Option<usize> {
    let next = index as i64 + delta;
    if next < 0 || next >= size as i64 {
        None
    } else {
        Some(next as usize)
    }
}

/// Moves from `cell` that land on a free, in-bounds cell, paired with the
/// destination.
///
/// Only the destination is checked, so a diagonal move may pass between two
/// occupied orthogonal neighbours.
pub fn valid_actions(
    grid: &OccupancyGrid,
    cell: Cell,
) -> impl Iterator<Item = (&'static Action, Cell)> + '_ {
    let shape = grid.shape();
    ACTIONS.iter().filter_map(move |action| {
        let next = action.apply(cell, shape)?;
        if grid.is_occupied(next) {
            None
        } else {
            Some((action, next))
        }
    })
}
