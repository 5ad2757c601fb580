//! Post-hoc shortening of a solution.
//!
//! The move list is cut into bins from the end. Each bin is undone on the
//! board and then replaced by a shortest path between the two grids it
//! connected, found with a strict breadth-first search. Start and end
//! boards never change, only the route between them.

use std::collections::HashSet;
use std::time::Instant;

use tracing::debug;

use crate::board::{Board, Snapshot};
use crate::error::RefineError;
use crate::mover::Move;
use crate::search::{BreadthFirst, SearchConfig};

pub const DEFAULT_BIN_SIZE: usize = 20;

/// A refined move list with the cost of finding it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Refinement {
    pub moves: Vec<Move>,
    /// Seen states summed over every breadth-first pass.
    pub total_seen_states: usize,
    /// Distinct states over every breadth-first pass.
    pub unique_seen_states: usize,
    pub max_queue_size: usize,
    /// Bin size of every pass, in the order the passes ran.
    pub bin_sizes: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct StepRefiner {
    bin_size: usize,
    search: BreadthFirst,
}

impl Default for StepRefiner {
    fn default() -> Self {
        StepRefiner::new(DEFAULT_BIN_SIZE)
    }
}

impl StepRefiner {
    pub fn new(bin_size: usize) -> StepRefiner {
        StepRefiner {
            bin_size: bin_size.max(1),
            search: BreadthFirst::new(SearchConfig::strict()),
        }
    }

    pub fn bin_size(&self) -> usize {
        self.bin_size
    }

    /// One pass over `moves`, which must lead up to `board`.
    ///
    /// `board` has to be finished: it is where the solution ends.
    pub fn refine(&self, board: &Board, moves: &[Move]) -> Result<Refinement, RefineError> {
        let mut archive = HashSet::new();
        self.refine_into(board, moves, &mut archive)
    }

    fn refine_into(
        &self,
        board: &Board,
        moves: &[Move],
        archive: &mut HashSet<Snapshot>,
    ) -> Result<Refinement, RefineError> {
        if !board.is_finished() {
            return Err(RefineError::RequiresSolvedBoard);
        }

        let mut board = board.clone();
        let mut refinement = Refinement::default();
        let mut pieces = Vec::new();
        let mut end = moves.len();

        // the remainder bin, if any, is the first few moves and comes last
        for bin in moves.rchunks(self.bin_size) {
            let target = board.snapshot();
            for mv in bin.iter().rev() {
                board.mover_mut().move_vehicle(&mv.inverse())?;
            }

            let outcome = self.search.run_to_recording(&board, target, archive)?;
            let start = end - bin.len();
            let solution = outcome.solution.ok_or(RefineError::Unreachable {
                from: start,
                to: end,
            })?;

            refinement.total_seen_states += outcome.stats.seen_states;
            refinement.max_queue_size =
                refinement.max_queue_size.max(outcome.stats.max_frontier);
            pieces.push(solution.moves);
            end = start;
        }

        refinement.moves = pieces.into_iter().rev().flatten().collect();
        refinement.unique_seen_states = archive.len();
        refinement.bin_sizes.push(self.bin_size);

        debug!(
            event = "refined",
            bin_size = self.bin_size,
            before = moves.len(),
            after = refinement.moves.len(),
        );
        Ok(refinement)
    }

    /// Refines repeatedly, feeding each pass its own output. When a pass
    /// brings no improvement the bin size shrinks by one; the loop ends once
    /// a pass at `min_bin_size` stagnates or `deadline` passes.
    pub fn refine_until_stable(
        &self,
        board: &Board,
        moves: &[Move],
        min_bin_size: usize,
        deadline: Option<Instant>,
    ) -> Result<Refinement, RefineError> {
        let min_bin_size = min_bin_size.clamp(1, self.bin_size);
        let mut archive = HashSet::new();
        let mut best = Refinement {
            moves: moves.to_vec(),
            ..Refinement::default()
        };
        let mut refiner = self.clone();

        while !deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            let pass = refiner.refine_into(board, &best.moves, &mut archive)?;
            let improved = pass.moves.len() < best.moves.len();

            best.total_seen_states += pass.total_seen_states;
            best.unique_seen_states = pass.unique_seen_states;
            best.max_queue_size = best.max_queue_size.max(pass.max_queue_size);
            best.bin_sizes.extend(pass.bin_sizes);
            if improved {
                best.moves = pass.moves;
            } else if refiner.bin_size > min_bin_size {
                refiner.bin_size -= 1;
            } else {
                break;
            }
        }

        Ok(best)
    }
}
