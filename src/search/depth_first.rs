use crate::board::Board;
use crate::error::MoveError;

use super::{Driver, Goal, Node, Search, SearchConfig, SearchOutcome};

/// Depth-first search over a stack of boards.
///
/// Plain mode returns the first solution found, which is usually long. With
/// branch-and-bound the search keeps going after a solution, prunes every
/// branch that is already as deep as the best one, and re-opens states that
/// are reached by a shorter route; when it runs to completion the result is
/// a shortest solution.
#[derive(Clone, Debug, Default)]
pub struct DepthFirst {
    config: SearchConfig,
    branch_and_bound: bool,
}

impl DepthFirst {
    pub fn new(config: SearchConfig) -> DepthFirst {
        DepthFirst {
            config,
            branch_and_bound: false,
        }
    }

    pub fn branch_and_bound(mut self, enabled: bool) -> DepthFirst {
        self.branch_and_bound = enabled;
        self
    }

    pub fn run(&self, board: &Board) -> Result<SearchOutcome, MoveError> {
        let frontier: Vec<Node> = Vec::new();
        Driver::new(self.name(), frontier, &self.config, Goal::Finished)
            .exhaustive(self.branch_and_bound)
            .run(board)
    }
}

impl Search for DepthFirst {
    fn name(&self) -> &'static str {
        if self.branch_and_bound {
            "branch_and_bound"
        } else {
            "depth_first"
        }
    }

    fn solve(&self, board: &Board) -> Result<SearchOutcome, MoveError> {
        self.run(board)
    }
}
