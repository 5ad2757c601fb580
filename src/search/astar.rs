use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use itertools::Itertools;
use pathfinding::directed::astar::astar;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::board::Board;
use crate::error::MoveError;
use crate::mover::Move;
use crate::vehicle::Direction;

use super::{Driver, Frontier, Goal, Node, Search, SearchConfig, SearchOutcome};

/// Lower-bound-ish estimates of the moves left to finish a board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Distinct vehicles between Carter and the exit.
    #[default]
    BlockingVehicles,
    /// Blocking vehicles, plus one for every direction a blocker cannot
    /// slide in at all.
    TwoBlockingVehicles,
}

impl Heuristic {
    pub fn estimate(self, board: &Board) -> usize {
        match self {
            Heuristic::BlockingVehicles => num_blocking_vehicles(board),
            Heuristic::TwoBlockingVehicles => num_two_blocking_vehicles(board),
        }
    }
}

/// Names of the vehicles in Carter's row between its front and the exit,
/// nearest first.
fn blockers(board: &Board) -> Vec<&str> {
    let Some(carter) = board.carter() else {
        return Vec::new();
    };

    let (front, row) = carter.front();
    (front as usize + 1..board.size())
        .filter_map(|col| board.cell(col, row as usize))
        .dedup()
        .collect()
}

pub fn num_blocking_vehicles(board: &Board) -> usize {
    blockers(board).len()
}

pub fn num_two_blocking_vehicles(board: &Board) -> usize {
    let mover = board.mover();
    let blockers = blockers(board);

    let pinned = blockers
        .iter()
        .cartesian_product([Direction::Forwards, Direction::Backwards])
        .filter(|(name, direction)| matches!(mover.get_vehicle_max_steps(name, *direction), Ok(0)))
        .count();

    blockers.len() + pinned
}

struct Entry {
    priority: usize,
    tag: u64,
    node: Node,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.priority, self.tag).cmp(&(other.priority, other.tag))
    }
}

/// Min-heap on `depth + estimate`, ties broken by a random tag.
struct PriorityFrontier {
    heap: BinaryHeap<Reverse<Entry>>,
    heuristic: Heuristic,
    rng: StdRng,
}

impl Frontier for PriorityFrontier {
    fn push(&mut self, node: Node) {
        let priority = node.moves.len() + self.heuristic.estimate(&node.board);
        self.heap.push(Reverse(Entry {
            priority,
            tag: self.rng.random(),
            node,
        }));
    }

    fn pop(&mut self) -> Option<Node> {
        self.heap.pop().map(|Reverse(entry)| entry.node)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Best-first search guided by a [`Heuristic`].
///
/// States are closed the first time they are generated, so the result is
/// short but not guaranteed shortest. Use [`shortest_solution`] for that.
#[derive(Clone, Debug, Default)]
pub struct AStar {
    config: SearchConfig,
    heuristic: Heuristic,
}

impl AStar {
    pub fn new(config: SearchConfig, heuristic: Heuristic) -> AStar {
        AStar { config, heuristic }
    }

    pub fn run(&self, board: &Board) -> Result<SearchOutcome, MoveError> {
        let frontier = PriorityFrontier {
            heap: BinaryHeap::new(),
            heuristic: self.heuristic,
            rng: self.config.rng(),
        };

        Driver::new("a_star", frontier, &self.config, Goal::Finished).run(board)
    }
}

impl Search for AStar {
    fn name(&self) -> &'static str {
        "a_star"
    }

    fn solve(&self, board: &Board) -> Result<SearchOutcome, MoveError> {
        self.run(board)
    }
}

/// A shortest solution, or `None` if Carter can never get out.
///
/// Exact but memory hungry on large boards.
pub fn shortest_solution(board: &Board) -> Option<Vec<Move>> {
    let (path, cost) = astar(
        board,
        |b| {
            let mut buffer = SmallVec::<[(Board, usize); 16]>::new();
            for mv in b.mover().legal_moves() {
                let mut next = b.clone();
                if next.mover_mut().move_vehicle(&mv).is_ok() {
                    buffer.push((next, 1));
                }
            }
            buffer
        },
        num_blocking_vehicles,
        Board::is_finished,
    )?;

    debug!(event = "shortest_solution", moves = cost);

    path.iter()
        .tuple_windows()
        .map(|(from, to)| from.move_between(to))
        .collect()
}
