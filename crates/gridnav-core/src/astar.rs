//! A* search over the occupancy grid.
//!
//! Two cost policies are available. [`SearchMode::FirstDiscovery`] fixes a
//! cell's cost the first time it is reached and never revisits it; it always
//! terminates and is deterministic, but may return a longer path than
//! necessary when a cheaper route to an already-discovered cell turns up
//! later. [`SearchMode::Relaxing`] is textbook A*: cheaper routes replace the
//! recorded cost and re-enter the frontier, so the returned cost is optimal
//! for the admissible heuristics below.

use crate::actions::{valid_actions, Direction};
use crate::error::{PlanError, SearchAbort};
use crate::grid::OccupancyGrid;
use crate::models::Cell;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::f64::consts::SQRT_2;
use std::time::{Duration, Instant};

/// Expansions between wall-clock checks.
const CLOCK_CHECK_INTERVAL: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    FirstDiscovery,
    Relaxing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    #[default]
    Euclidean,
    Octile,
}

impl Heuristic {
    pub fn evaluate(self, cell: Cell, goal: Cell) -> f64 {
        match self {
            Heuristic::Euclidean => euclidean(cell, goal),
            Heuristic::Octile => octile(cell, goal),
        }
    }
}

pub fn euclidean(cell: Cell, goal: Cell) -> f64 {
    cell.distance(&goal)
}

/// Shortest 8-connected distance with unit and sqrt(2) step costs.
pub fn octile(cell: Cell, goal: Cell) -> f64 {
    let dn = cell.north.abs_diff(goal.north) as f64;
    let de = cell.east.abs_diff(goal.east) as f64;
    let (low, high) = if dn < de { (dn, de) } else { (de, dn) };
    (high - low) + SQRT_2 * low
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub mode: SearchMode,
    /// Give up after expanding this many cells.
    #[serde(default)]
    pub max_expansions: Option<usize>,
    /// Give up after this many milliseconds.
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Cells from start to goal, inclusive.
    pub path: Vec<Cell>,
    /// Move taken to enter each cell after the start.
    pub moves: Vec<Direction>,
    pub cost: f64,
    pub nodes_expanded: usize,
}

/// Best known way of reaching a cell.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    cost: f64,
    parent: Cell,
    action: Direction,
}

/// Open-set entry, ordered by `f_score` under `total_cmp`, then by insertion.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f_score: f64,
    /// Insertion counter; earlier entries win ties on `f_score`.
    sequence: u64,
    g_score: f64,
    cell: Cell,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .total_cmp(&other.f_score)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

struct Frontier {
    heap: BinaryHeap<Reverse<OpenNode>>,
    sequence: u64,
}

impl Frontier {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            sequence: 0,
        }
    }

    fn push(&mut self, cell: Cell, g_score: f64, f_score: f64) {
        self.heap.push(Reverse(OpenNode {
            f_score,
            sequence: self.sequence,
            g_score,
            cell,
        }));
        self.sequence += 1;
    }

    fn pop(&mut self) -> Option<OpenNode> {
        self.heap.pop().map(|Reverse(node)| node)
    }
}

/// Search for a path from `start` to `goal`.
///
/// Returns [`PlanError::NoPathFound`] when the goal cannot be reached or a
/// configured budget runs out; the `reason` tells the two apart.
pub fn find_path<H>(
    grid: &OccupancyGrid,
    heuristic: H,
    start: Cell,
    goal: Cell,
    config: &SearchConfig,
) -> Result<SearchOutcome, PlanError>
where
    H: Fn(Cell, Cell) -> f64,
{
    for cell in [start, goal] {
        if !grid.contains(cell) {
            return Err(PlanError::CellOutOfBounds {
                cell,
                north_size: grid.north_size(),
                east_size: grid.east_size(),
            });
        }
    }

    let started = Instant::now();
    let time_limit = config.time_limit_ms.map(Duration::from_millis);
    let relaxing = config.mode == SearchMode::Relaxing;

    let mut frontier = Frontier::new();
    let mut records: HashMap<Cell, SearchNode> = HashMap::new();
    // First-discovery: every cell ever enqueued. Relaxing: expanded cells.
    let mut visited: HashSet<Cell> = HashSet::new();
    let cost_of = |records: &HashMap<Cell, SearchNode>, cell: Cell| -> Option<f64> {
        if cell == start {
            Some(0.0)
        } else {
            records.get(&cell).map(|node| node.cost)
        }
    };

    frontier.push(start, 0.0, heuristic(start, goal));
    if !relaxing {
        visited.insert(start);
    }

    let mut nodes_expanded = 0usize;
    while let Some(current) = frontier.pop() {
        let cell = current.cell;
        let g_score = cost_of(&records, cell).unwrap_or(f64::INFINITY);
        if relaxing && (visited.contains(&cell) || current.g_score > g_score + 1e-9) {
            continue;
        }

        if cell == goal {
            let outcome = reconstruct(&records, start, goal, g_score, nodes_expanded);
            tracing::debug!(
                mode = ?config.mode,
                nodes_expanded,
                cost = outcome.cost,
                steps = outcome.moves.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "path found"
            );
            return Ok(outcome);
        }

        if let Some(limit) = config.max_expansions {
            if nodes_expanded >= limit {
                return Err(abort(SearchAbort::ExpansionLimit { limit }, nodes_expanded));
            }
        }
        if let (Some(limit), Some(limit_ms)) = (time_limit, config.time_limit_ms) {
            if nodes_expanded % CLOCK_CHECK_INTERVAL == 0 && started.elapsed() >= limit {
                return Err(abort(SearchAbort::TimeLimit { limit_ms }, nodes_expanded));
            }
        }

        nodes_expanded += 1;
        if relaxing {
            visited.insert(cell);
        }

        for (action, next) in valid_actions(grid, cell) {
            let tentative = g_score + action.cost;
            let improves = if relaxing {
                !visited.contains(&next)
                    && tentative < cost_of(&records, next).unwrap_or(f64::INFINITY)
            } else {
                visited.insert(next)
            };
            if !improves {
                continue;
            }
            records.insert(
                next,
                SearchNode {
                    cost: tentative,
                    parent: cell,
                    action: action.direction,
                },
            );
            frontier.push(next, tentative, tentative + heuristic(next, goal));
        }
    }

    Err(abort(SearchAbort::Exhausted, nodes_expanded))
}

fn abort(reason: SearchAbort, nodes_expanded: usize) -> PlanError {
    tracing::debug!(%reason, nodes_expanded, "search stopped without a path");
    PlanError::NoPathFound { reason }
}

fn reconstruct(
    records: &HashMap<Cell, SearchNode>,
    start: Cell,
    goal: Cell,
    cost: f64,
    nodes_expanded: usize,
) -> SearchOutcome {
    let mut path = vec![goal];
    let mut moves = Vec::new();
    let mut cell = goal;
    while cell != start {
        let Some(node) = records.get(&cell) else {
            break;
        };
        moves.push(node.action);
        cell = node.parent;
        path.push(cell);
    }
    path.reverse();
    moves.reverse();

    SearchOutcome {
        path,
        moves,
        cost,
        nodes_expanded,
    }
}
