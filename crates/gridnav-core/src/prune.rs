//! Waypoint reduction by line-of-sight.

use crate::grid::OccupancyGrid;
use crate::line::blocked;
use crate::models::Cell;

/// Cursor over the path being pruned.
#[derive(Debug, Clone, Copy)]
struct PruneState {
    last_retained: Cell,
    /// Latest candidate visible from `last_retained`, not yet kept.
    last_clear: Option<Cell>,
}

/// Drop intermediate cells that can be skipped with a straight, unobstructed
/// segment.
///
/// Paths shorter than three cells are returned as they are. The first and last
/// cells of `path` are always kept.
pub fn prune_path(path: &[Cell], grid: &OccupancyGrid) -> Vec<Cell> {
    if path.len() < 3 {
        return path.to_vec();
    }

    let mut pruned = vec![path[0]];
    let mut state = PruneState {
        last_retained: path[0],
        last_clear: None,
    };

    let mut idx = 1;
    while idx < path.len() {
        let candidate = path[idx];
        if !blocked(grid, state.last_retained, candidate) {
            state.last_clear = Some(candidate);
            idx += 1;
            continue;
        }

        match state.last_clear.take() {
            Some(clear) => {
                // Keep the last visible point and test the candidate again from it.
                pruned.push(clear);
                state.last_retained = clear;
            }
            None => {
                tracing::trace!(%candidate, "no visible predecessor, keeping blocked cell");
                pruned.push(candidate);
                state.last_retained = candidate;
                idx += 1;
            }
        }
    }

    let goal = path[path.len() - 1];
    if pruned.last() != Some(&goal) {
        pruned.push(goal);
    }

    tracing::debug!(raw = path.len(), pruned = pruned.len(), "pruned path");
    pruned
}

/// Total straight-line length of a cell polyline, in cells.
pub fn path_length(path: &[Cell]) -> f64 {
    path.windows(2).map(|pair| pair[0].distance(&pair[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::has_line_of_sight;
    use crate::models::GridOrigin;

    fn grid(rows: &[&str]) -> OccupancyGrid {
        OccupancyGrid::from_rows(
            rows.iter()
                .map(|row| row.chars().map(|c| c == '#').collect())
                .collect(),
            GridOrigin::default(),
        )
    }

    fn cells(points: &[(usize, usize)]) -> Vec<Cell> {
        points.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn short_paths_are_unchanged() {
        let g = grid(&["...", "..."]);
        assert!(prune_path(&[], &g).is_empty());
        let two = cells(&[(0, 0), (1, 1)]);
        assert_eq!(prune_path(&two, &g), two);
    }

    #[test]
    fn straight_path_collapses_to_endpoints() {
        let g = grid(&["......", "......"]);
        let path = cells(&[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (0, 5)]);
        assert_eq!(prune_path(&path, &g), cells(&[(0, 0), (0, 5)]));
    }

    #[test]
    fn corner_is_kept() {
        let g = grid(&[
            "....", //
            "###.", //
            "###.", //
            "###.",
        ]);
        let path = cells(&[(0, 0), (0, 1), (0, 2), (0, 3), (1, 3), (2, 3), (3, 3)]);
        assert_eq!(prune_path(&path, &g), cells(&[(0, 0), (0, 3), (3, 3)]));
    }

    #[test]
    fn pruned_segments_stay_clear() {
        let g = grid(&[
            "........", //
            "..##....", //
            "..##..#.", //
            "......#.", //
            "........",
        ]);
        let path = cells(&[
            (0, 0),
            (1, 1),
            (2, 1),
            (3, 2),
            (3, 3),
            (3, 4),
            (2, 5),
            (1, 6),
            (1, 7),
            (2, 7),
            (3, 7),
            (4, 7),
        ]);
        let pruned = prune_path(&path, &g);
        assert_eq!(pruned.first(), Some(&Cell::new(0, 0)));
        assert_eq!(pruned.last(), Some(&Cell::new(4, 7)));
        assert!(pruned.len() < path.len());
        for pair in pruned.windows(2) {
            assert!(has_line_of_sight(&g, pair[0], pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn blocked_first_step_is_kept() {
        // the start sits in an occupied cell, so nothing is visible from it
        let g = grid(&["#...", "...."]);
        let path = cells(&[(0, 0), (0, 1), (0, 2), (0, 3)]);
        assert_eq!(prune_path(&path, &g), cells(&[(0, 0), (0, 1), (0, 3)]));
    }

    #[test]
    fn path_length_sums_segments() {
        let path = cells(&[(0, 0), (3, 4), (3, 6)]);
        assert_eq!(path_length(&path), 7.0);
        assert_eq!(path_length(&path[..1]), 0.0);
    }
}
