//! State-space search over boards.
//!
//! Every graph search here is the same loop: pop a node from a frontier,
//! stop if it solves the goal, otherwise push its unseen children. The
//! engines only differ in the frontier discipline (stack, queue or priority
//! heap) and in whether the loop keeps going after the first solution.

use std::{
    collections::{hash_map::Entry, HashMap, HashSet, VecDeque},
    time::{Duration, Instant},
};

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info, trace, warn};

use crate::board::{Board, Snapshot};
use crate::error::MoveError;
use crate::mover::Move;

pub mod astar;
pub mod breadth_first;
pub mod checkpoint;
pub mod depth_first;
pub mod random;

pub use astar::{shortest_solution, AStar, Heuristic};
pub use breadth_first::BreadthFirst;
pub use checkpoint::{Checkpoint, FileCheckpoint, Progress};
pub use depth_first::DepthFirst;
pub use random::{RandomPolicy, RandomWalk};

/// Which moves are considered when expanding a board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Every vehicle, every step count.
    #[default]
    All,
    /// Only the largest slide in each direction per vehicle. Can miss the
    /// shortest solution when it needs a partial slide.
    MaxOnly,
    /// Every legal move that changes what the other vehicles can do, plus
    /// the move that finishes the game.
    Useful,
}

pub(crate) type Children = SmallVec<[(Move, Board); 16]>;

impl MovePolicy {
    /// Appends `(move, resulting board)` for every move this policy allows.
    pub(crate) fn successors(self, board: &Board, out: &mut Children) -> Result<(), MoveError> {
        let mover = board.mover();
        let candidates = match self {
            MovePolicy::All | MovePolicy::Useful => mover.legal_moves(),
            MovePolicy::MaxOnly => mover.get_max_moves(),
        };

        for mv in candidates.iter() {
            let mut child = board.clone();
            child.mover_mut().move_vehicle(mv)?;

            if self == MovePolicy::Useful
                && !child.is_finished()
                && !opens_new_moves(&candidates, &child, mv)
            {
                continue;
            }

            out.push((mv.clone(), child));
        }

        Ok(())
    }
}

/// Whether playing `mv` changed the moves available to the other vehicles.
fn opens_new_moves(before: &[Move], after: &Board, mv: &Move) -> bool {
    let after = after.mover().legal_moves();
    let others = |m: &&Move| m.vehicle != mv.vehicle;

    !before.iter().filter(others).eq(after.iter().filter(others))
}

/// What a search is looking for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Goal {
    /// Carter at the exit.
    Finished,
    /// An exact grid.
    Reach(Snapshot),
}

impl Goal {
    pub fn is_reached(&self, board: &Board) -> bool {
        match self {
            Goal::Finished => board.is_finished(),
            Goal::Reach(target) => board.snapshot() == *target,
        }
    }
}

/// Knobs shared by every search engine.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub move_policy: MovePolicy,
    /// Stop as soon as Carter can drive out in one move. Faster, but a
    /// breadth-first search is then no longer guaranteed to be shortest.
    pub free_carter: bool,
    /// Wall-clock budget, checked between expansions.
    pub time_limit: Option<Duration>,
    /// Newly seen states between two checkpoints.
    pub checkpoint_interval: Option<usize>,
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            move_policy: MovePolicy::All,
            free_carter: true,
            time_limit: None,
            checkpoint_interval: None,
            random_seed: None,
        }
    }
}

impl SearchConfig {
    /// Plain layer-by-layer search over every move, no shortcuts.
    pub fn strict() -> SearchConfig {
        SearchConfig {
            free_carter: false,
            ..SearchConfig::default()
        }
    }

    pub(crate) fn deadline(&self, started: Instant) -> Option<Instant> {
        self.time_limit.map(|limit| started + limit)
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    Solved,
    /// Every reachable state was visited without solving the goal.
    Exhausted,
    /// The time limit ran out; any solution is the best found so far.
    TimedOut,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Distinct boards recorded in the seen-state archive.
    pub seen_states: usize,
    /// Boards taken off the frontier.
    pub expanded: usize,
    /// Largest frontier size observed.
    pub max_frontier: usize,
    pub elapsed: Duration,
}

/// A move list and the board it ends on.
#[derive(Clone, Debug)]
pub struct Solution {
    pub moves: Vec<Move>,
    pub board: Board,
}

#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub solution: Option<Solution>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn moves(&self) -> Option<&[Move]> {
        self.solution.as_ref().map(|s| s.moves.as_slice())
    }
}

/// A way of solving a board.
pub trait Search {
    fn name(&self) -> &'static str;

    /// Searches from `board`, which is left untouched.
    fn solve(&self, board: &Board) -> Result<SearchOutcome, MoveError>;
}

pub(crate) struct Node {
    pub board: Board,
    pub moves: Vec<Move>,
}

/// Frontier discipline of a search.
pub(crate) trait Frontier {
    fn push(&mut self, node: Node);
    fn pop(&mut self) -> Option<Node>;
    fn len(&self) -> usize;
}

/// LIFO
impl Frontier for Vec<Node> {
    fn push(&mut self, node: Node) {
        Vec::push(self, node)
    }

    fn pop(&mut self) -> Option<Node> {
        Vec::pop(self)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// FIFO
impl Frontier for VecDeque<Node> {
    fn push(&mut self, node: Node) {
        self.push_back(node)
    }

    fn pop(&mut self) -> Option<Node> {
        self.pop_front()
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }
}

/// The shared search loop.
pub(crate) struct Driver<'a, F> {
    name: &'static str,
    frontier: F,
    config: &'a SearchConfig,
    goal: Goal,
    /// Keep searching after a solution, pruning anything that cannot beat it.
    exhaustive: bool,
    /// Seen states and the shallowest depth each was reached at.
    seen: HashMap<Snapshot, usize>,
    checkpoint: Option<&'a mut dyn Checkpoint>,
    /// Receives every seen state once the run is over.
    archive: Option<&'a mut HashSet<Snapshot>>,
    new_states: usize,
    stats: SearchStats,
}

impl<'a, F: Frontier> Driver<'a, F> {
    pub fn new(name: &'static str, frontier: F, config: &'a SearchConfig, goal: Goal) -> Self {
        Driver {
            name,
            frontier,
            config,
            goal,
            exhaustive: false,
            seen: HashMap::new(),
            checkpoint: None,
            archive: None,
            new_states: 0,
            stats: SearchStats::default(),
        }
    }

    pub fn exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    pub fn checkpoint(mut self, checkpoint: &'a mut dyn Checkpoint) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    pub fn archive(mut self, archive: &'a mut HashSet<Snapshot>) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn run(mut self, start: &Board) -> Result<SearchOutcome, MoveError> {
        let started = Instant::now();
        let deadline = self.config.deadline(started);

        info!(
            event = "search_start",
            algorithm = self.name,
            size = start.size(),
            vehicles = start.vehicles().len(),
            policy = ?self.config.move_policy,
        );

        self.seen.insert(start.snapshot(), 0);
        self.frontier.push(Node {
            board: start.clone(),
            moves: Vec::new(),
        });
        self.stats.max_frontier = 1;

        let mut best: Option<Solution> = None;
        let mut status = SearchStatus::Exhausted;

        while let Some(node) = self.frontier.pop() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                status = SearchStatus::TimedOut;
                break;
            }

            if let Some(best) = &best {
                if node.moves.len() >= best.moves.len() {
                    continue;
                }
            }

            self.stats.expanded += 1;

            if let Some(solution) = self.solution_at(&node)? {
                if !self.exhaustive {
                    best = Some(solution);
                    status = SearchStatus::Solved;
                    break;
                }

                debug!(
                    event = "improved",
                    algorithm = self.name,
                    moves = solution.moves.len(),
                    expanded = self.stats.expanded,
                );
                best = Some(solution);
                continue;
            }

            self.expand(node)?;
        }

        if status == SearchStatus::Exhausted && best.is_some() {
            status = SearchStatus::Solved;
        }

        self.stats.seen_states = self.seen.len();
        self.stats.elapsed = started.elapsed();
        if let Some(archive) = self.archive.take() {
            archive.extend(self.seen.drain().map(|(snapshot, _)| snapshot));
        }

        info!(
            event = "search_end",
            algorithm = self.name,
            status = ?status,
            moves = best.as_ref().map(|s| s.moves.len()),
            seen_states = self.stats.seen_states,
            max_frontier = self.stats.max_frontier,
            elapsed_ms = self.stats.elapsed.as_millis() as u64,
        );

        Ok(SearchOutcome {
            status,
            solution: best,
            stats: self.stats,
        })
    }

    fn solution_at(&self, node: &Node) -> Result<Option<Solution>, MoveError> {
        if self.goal.is_reached(&node.board) {
            return Ok(Some(Solution {
                moves: node.moves.clone(),
                board: node.board.clone(),
            }));
        }

        if !self.config.free_carter || self.goal != Goal::Finished {
            return Ok(None);
        }

        match node.board.mover().free_carter() {
            Some(finish) => {
                let mut board = node.board.clone();
                board.mover_mut().move_vehicle(&finish)?;

                let mut moves = node.moves.clone();
                moves.push(finish);
                Ok(Some(Solution { moves, board }))
            }
            None => Ok(None),
        }
    }

    fn expand(&mut self, node: Node) -> Result<(), MoveError> {
        let depth = node.moves.len() + 1;
        let mut children = Children::new();
        let policy = self.config.move_policy;
        policy.successors(&node.board, &mut children)?;

        for (mv, child) in children {
            if !self.admit(child.snapshot(), depth) {
                continue;
            }

            let mut moves = Vec::with_capacity(depth);
            moves.extend_from_slice(&node.moves);
            moves.push(mv);

            self.checkpoint_if_due(&moves);
            self.frontier.push(Node {
                board: child,
                moves,
            });
        }

        self.stats.max_frontier = self.stats.max_frontier.max(self.frontier.len());
        Ok(())
    }

    /// Records `snapshot` as seen at `depth`. Returns whether the state
    /// should be explored.
    fn admit(&mut self, snapshot: Snapshot, depth: usize) -> bool {
        match self.seen.entry(snapshot) {
            Entry::Vacant(entry) => {
                entry.insert(depth);
                self.new_states += 1;
                true
            }
            // a shorter route to a known state can still lead to a shorter
            // solution when searching exhaustively
            Entry::Occupied(mut entry) if self.exhaustive && depth < *entry.get() => {
                entry.insert(depth);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    fn checkpoint_if_due(&mut self, moves: &[Move]) {
        let (Some(interval), Some(sink)) =
            (self.config.checkpoint_interval, self.checkpoint.as_mut())
        else {
            return;
        };

        if interval == 0 || self.new_states % interval != 0 {
            return;
        }

        let progress = Progress {
            seen_states: self.seen.len(),
            depth: moves.len(),
            moves,
        };

        trace!(
            event = "checkpoint",
            seen_states = progress.seen_states,
            depth = progress.depth,
        );
        if let Err(err) = sink.save(&progress) {
            warn!(event = "checkpoint_failed", error = %err);
        }
    }
}
