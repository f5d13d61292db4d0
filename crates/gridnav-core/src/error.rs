//! Error types for grid construction and planning.

use crate::models::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a search stopped without reaching the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SearchAbort {
    /// Frontier emptied; the goal is unreachable.
    Exhausted,
    /// The configured expansion budget ran out.
    ExpansionLimit { limit: usize },
    /// The configured wall-clock budget ran out.
    TimeLimit { limit_ms: u64 },
}

impl fmt::Display for SearchAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchAbort::Exhausted => write!(f, "frontier exhausted"),
            SearchAbort::ExpansionLimit { limit } => {
                write!(f, "expansion limit of {} reached", limit)
            }
            SearchAbort::TimeLimit { limit_ms } => write!(f, "time limit of {}ms reached", limit_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("no path found: {reason}")]
    NoPathFound { reason: SearchAbort },
    #[error("grid has no free cell")]
    NoFreeCell,
    #[error("no obstacles supplied and no grid bounds configured")]
    DegenerateObstacleSet,
    #[error("grid bounds are invalid: {reason}")]
    InvalidBounds { reason: String },
    #[error("obstacle {index} is invalid: {reason}")]
    InvalidObstacle { index: usize, reason: String },
    #[error("cell {cell} is outside the {north_size}x{east_size} grid")]
    CellOutOfBounds {
        cell: Cell,
        north_size: usize,
        east_size: usize,
    },
    #[error("grid of {cells} cells exceeds the limit of {limit}")]
    GridTooLarge { cells: usize, limit: usize },
}

impl PlanError {
    /// Outcomes the caller is expected to handle as part of normal operation,
    /// as opposed to bad input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PlanError::NoPathFound { .. } | PlanError::NoFreeCell)
    }

    /// Short machine-readable name, used by the service responses.
    pub fn kind(&self) -> &'static str {
        match self {
            PlanError::NoPathFound { .. } => "no_path_found",
            PlanError::NoFreeCell => "no_free_cell",
            PlanError::DegenerateObstacleSet => "degenerate_obstacle_set",
            PlanError::InvalidBounds { .. } => "invalid_bounds",
            PlanError::InvalidObstacle { .. } => "invalid_obstacle",
            PlanError::CellOutOfBounds { .. } => "cell_out_of_bounds",
            PlanError::GridTooLarge { .. } => "grid_too_large",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_split() {
        assert!(PlanError::NoFreeCell.is_recoverable());
        assert!(PlanError::NoPathFound {
            reason: SearchAbort::Exhausted
        }
        .is_recoverable());
        assert!(!PlanError::DegenerateObstacleSet.is_recoverable());
        assert!(!PlanError::GridTooLarge { cells: 10, limit: 5 }.is_recoverable());
        let bounds = PlanError::InvalidBounds {
            reason: "north range 5..1 is inverted".to_string(),
        };
        assert!(!bounds.is_recoverable());
        assert_eq!(bounds.kind(), "invalid_bounds");
        assert_eq!(
            bounds.to_string(),
            "grid bounds are invalid: north range 5..1 is inverted"
        );
    }

    #[test]
    fn messages_name_the_reason() {
        let err = PlanError::NoPathFound {
            reason: SearchAbort::ExpansionLimit { limit: 50 },
        };
        assert_eq!(err.to_string(), "no path found: expansion limit of 50 reached");
        let err = PlanError::CellOutOfBounds {
            cell: Cell::new(9, 1),
            north_size: 4,
            east_size: 4,
        };
        assert_eq!(err.to_string(), "cell (9, 1) is outside the 4x4 grid");
    }
}
