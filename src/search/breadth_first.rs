use std::collections::{HashSet, VecDeque};

use crate::board::{Board, Snapshot};
use crate::error::MoveError;

use super::{Checkpoint, Driver, Goal, Node, Search, SearchConfig, SearchOutcome};

/// Breadth-first search over a queue of boards.
///
/// Without the free-Carter shortcut the first solution found is a shortest
/// one. With it, the search stops as soon as Carter has a clear run to the
/// exit, which saves a layer but can cost optimality.
#[derive(Clone, Debug, Default)]
pub struct BreadthFirst {
    config: SearchConfig,
}

impl BreadthFirst {
    pub fn new(config: SearchConfig) -> BreadthFirst {
        BreadthFirst { config }
    }

    fn driver(&self, goal: Goal) -> Driver<'_, VecDeque<Node>> {
        Driver::new("breadth_first", VecDeque::new(), &self.config, goal)
    }

    pub fn run(&self, board: &Board) -> Result<SearchOutcome, MoveError> {
        self.driver(Goal::Finished).run(board)
    }

    /// Shortest route from `board` to exactly the grid in `target`.
    pub fn run_to(&self, board: &Board, target: Snapshot) -> Result<SearchOutcome, MoveError> {
        self.driver(Goal::Reach(target)).run(board)
    }

    /// Like [`run_to`](Self::run_to), adding every state seen on the way to
    /// `archive`.
    pub fn run_to_recording(
        &self,
        board: &Board,
        target: Snapshot,
        archive: &mut HashSet<Snapshot>,
    ) -> Result<SearchOutcome, MoveError> {
        let goal = Goal::Reach(target);
        Driver::new("breadth_first", VecDeque::new(), &self.config, goal)
            .archive(archive)
            .run(board)
    }

    /// Like [`run`](Self::run), handing progress to `checkpoint` every
    /// `checkpoint_interval` newly seen states.
    pub fn run_with_checkpoint(
        &self,
        board: &Board,
        goal: Goal,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<SearchOutcome, MoveError> {
        Driver::new("breadth_first", VecDeque::new(), &self.config, goal)
            .checkpoint(checkpoint)
            .run(board)
    }
}

impl Search for BreadthFirst {
    fn name(&self) -> &'static str {
        "breadth_first"
    }

    fn solve(&self, board: &Board) -> Result<SearchOutcome, MoveError> {
        self.run(board)
    }
}

#[cfg(test)]
mod test {
    use std::io;
    use std::time::Duration;

    use super::*;
    use crate::mover::Move;
    use crate::search::test::board_from;
    use crate::search::{shortest_solution, MovePolicy, Progress, SearchStatus};
    use crate::Game;

    const THREE_MOVES: &str = "
......
...B..
XX.B..
...B..
......
..CC..
";

    const CARD: &str = "
AA...O
P..Q.O
PXXQ.O
P..Q..
B...CC
B.RRR.
";

    #[test]
    fn strict_search_is_shortest() {
        let board = board_from(THREE_MOVES);
        let outcome = BreadthFirst::new(SearchConfig::strict())
            .run(&board)
            .unwrap();

        assert_eq!(outcome.status, SearchStatus::Solved);
        assert_eq!(
            outcome.moves().unwrap(),
            &[Move::new("C", 2), Move::new("B", 2), Move::new("X", 4)]
        );
        assert!(outcome.solution.unwrap().board.is_finished());
    }

    #[test]
    fn strict_search_matches_exact_solver() {
        let board = board_from(CARD);
        let outcome = BreadthFirst::new(SearchConfig::strict())
            .run(&board)
            .unwrap();
        let moves = outcome.moves().unwrap();

        assert_eq!(moves.len(), 8);
        assert_eq!(moves.len(), shortest_solution(&board).unwrap().len());

        let mut game = Game::from_board(board);
        game.replay(moves).unwrap();
        assert!(game.is_finished());
    }

    #[test]
    fn free_carter_stops_early() {
        let board = board_from(CARD);
        let strict = BreadthFirst::new(SearchConfig::strict())
            .run(&board)
            .unwrap();
        let fast = BreadthFirst::new(SearchConfig::default())
            .run(&board)
            .unwrap();

        assert_eq!(fast.moves().unwrap().len(), 8);
        assert!(fast.stats.expanded < strict.stats.expanded);
        assert!(fast.stats.seen_states <= strict.stats.seen_states);
    }

    #[test]
    fn reaches_an_exact_grid() {
        let board = board_from(THREE_MOVES);
        let mut target = board.clone();
        for mv in [Move::new("C", -2), Move::new("B", 1), Move::new("C", 1)] {
            target.mover_mut().move_vehicle(&mv).unwrap();
        }

        let outcome = BreadthFirst::new(SearchConfig::default())
            .run_to(&board, target.snapshot())
            .unwrap();
        let solution = outcome.solution.unwrap();

        assert_eq!(solution.board.snapshot(), target.snapshot());
        // C-1 then B+1 is one move shorter
        assert_eq!(solution.moves.len(), 2);

        let same = BreadthFirst::default()
            .run_to(&board, board.snapshot())
            .unwrap();
        assert_eq!(same.moves(), Some(&[][..]));
    }

    #[test]
    fn useful_moves_prune_the_search() {
        let board = board_from(CARD);
        let config = SearchConfig {
            move_policy: MovePolicy::Useful,
            ..SearchConfig::default()
        };
        let useful = BreadthFirst::new(config).run(&board).unwrap();
        let all = BreadthFirst::new(SearchConfig::default())
            .run(&board)
            .unwrap();

        assert_eq!(useful.status, SearchStatus::Solved);
        assert!(useful.stats.seen_states < all.stats.seen_states);

        let mut game = Game::from_board(board);
        game.replay(useful.moves().unwrap()).unwrap();
        assert!(game.is_finished());
    }

    #[test]
    fn checkpoints_fire_at_interval() {
        let board = board_from(CARD);
        let config = SearchConfig {
            checkpoint_interval: Some(100),
            ..SearchConfig::strict()
        };

        let mut seen = Vec::new();
        let mut sink = |progress: &Progress<'_>| -> io::Result<()> {
            assert_eq!(progress.moves.len(), progress.depth);
            seen.push(progress.seen_states);
            Ok(())
        };
        let outcome = BreadthFirst::new(config)
            .run_with_checkpoint(&board, Goal::Finished, &mut sink)
            .unwrap();

        assert_eq!(seen.len(), (outcome.stats.seen_states - 1) / 100);
        assert!(seen.windows(2).all(|w| w[1] - w[0] == 100));
    }

    #[test]
    fn failing_checkpoint_does_not_stop_search() {
        let board = board_from(THREE_MOVES);
        let config = SearchConfig {
            checkpoint_interval: Some(1),
            ..SearchConfig::strict()
        };

        let mut sink = |_: &Progress<'_>| -> io::Result<()> { Err(io::Error::other("disk full")) };
        let outcome = BreadthFirst::new(config)
            .run_with_checkpoint(&board, Goal::Finished, &mut sink)
            .unwrap();
        assert_eq!(outcome.moves().unwrap().len(), 3);
    }

    #[test]
    fn zero_time_limit_times_out() {
        let board = board_from(CARD);
        let config = SearchConfig {
            time_limit: Some(Duration::ZERO),
            ..SearchConfig::default()
        };
        let outcome = BreadthFirst::new(config).run(&board).unwrap();

        assert_eq!(outcome.status, SearchStatus::TimedOut);
        assert!(outcome.solution.is_none());
    }
}
