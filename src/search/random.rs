use std::time::Instant;

use itertools::Itertools;
use rand::{seq::IndexedRandom, Rng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::Board;
use crate::error::MoveError;
use crate::game::Game;
use crate::mover::Move;

use super::{Search, SearchConfig, SearchOutcome, SearchStats, SearchStatus, Solution};

/// How a random walk picks its next move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomPolicy {
    /// Uniform over every legal move.
    AllAvailable,
    /// Uniform over vehicles that can move, then over that vehicle's moves.
    VehicleFirst,
    /// Drive Carter out when the way is clear, else like `AllAvailable`.
    AllAvailableFinishCheck,
    /// Drive Carter out when the way is clear, else uniform over the
    /// largest slide in each direction.
    #[default]
    MaxMovesFinishCheck,
}

impl RandomPolicy {
    /// The next move to play, or `None` when nothing can move.
    pub fn pick<R: Rng + ?Sized>(self, board: &Board, rng: &mut R) -> Option<Move> {
        let mover = board.mover();

        match self {
            RandomPolicy::AllAvailable => mover.legal_moves().choose(rng).cloned(),
            RandomPolicy::VehicleFirst => {
                let legal = mover.legal_moves();
                let mut per_vehicle: Vec<Vec<Move>> = Vec::new();
                for (_, moves) in &legal.into_iter().group_by(|mv| mv.vehicle.clone()) {
                    per_vehicle.push(moves.collect());
                }

                per_vehicle
                    .choose(rng)
                    .and_then(|moves| moves.choose(rng))
                    .cloned()
            }
            RandomPolicy::AllAvailableFinishCheck => mover
                .free_carter()
                .or_else(|| RandomPolicy::AllAvailable.pick(board, rng)),
            RandomPolicy::MaxMovesFinishCheck => mover
                .free_carter()
                .or_else(|| mover.get_max_moves().choose(rng).cloned()),
        }
    }
}

/// A single random trajectory through the state space.
///
/// There is no seen-state archive, so on an unsolvable board a walk only
/// stops at its deadline.
#[derive(Clone, Debug, Default)]
pub struct RandomWalk {
    policy: RandomPolicy,
    config: SearchConfig,
}

impl RandomWalk {
    pub fn new(policy: RandomPolicy, config: SearchConfig) -> RandomWalk {
        RandomWalk { policy, config }
    }

    /// Plays random moves on `game` until it is finished, nothing can move
    /// or `deadline` passes. The moves stay in the game's history.
    pub fn play<R: Rng + ?Sized>(
        &self,
        game: &mut Game,
        rng: &mut R,
        deadline: Option<Instant>,
    ) -> Result<SearchStatus, MoveError> {
        while !game.is_finished() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Ok(SearchStatus::TimedOut);
            }

            let Some(mv) = self.policy.pick(game.board(), rng) else {
                return Ok(SearchStatus::Exhausted);
            };
            game.make_move(mv)?;
        }

        Ok(SearchStatus::Solved)
    }
}

impl Search for RandomWalk {
    fn name(&self) -> &'static str {
        "random"
    }

    fn solve(&self, board: &Board) -> Result<SearchOutcome, MoveError> {
        let started = Instant::now();
        info!(
            event = "search_start",
            algorithm = self.name(),
            size = board.size(),
            vehicles = board.vehicles().len(),
            policy = ?self.policy,
        );

        let mut game = Game::from_board(board.clone());
        let mut rng = self.config.rng();
        let deadline = self.config.deadline(started);
        let status = self.play(&mut game, &mut rng, deadline)?;

        let (board, moves) = game.into_parts();
        let stats = SearchStats {
            expanded: moves.len(),
            elapsed: started.elapsed(),
            ..SearchStats::default()
        };

        info!(
            event = "search_end",
            algorithm = self.name(),
            status = ?status,
            moves = moves.len(),
            elapsed_ms = stats.elapsed.as_millis() as u64,
        );

        Ok(SearchOutcome {
            status,
            solution: (status == SearchStatus::Solved).then_some(Solution { moves, board }),
            stats,
        })
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::search::test::board_from;

    const CARD: &str = "
AA...O
P..Q.O
PXXQ.O
P..Q..
B...CC
B.RRR.
";

    const ALL_POLICIES: [RandomPolicy; 4] = [
        RandomPolicy::AllAvailable,
        RandomPolicy::VehicleFirst,
        RandomPolicy::AllAvailableFinishCheck,
        RandomPolicy::MaxMovesFinishCheck,
    ];

    fn soon() -> Option<Instant> {
        Some(Instant::now() + Duration::from_secs(30))
    }

    #[test]
    fn every_policy_finishes() {
        let board = board_from(CARD);

        for policy in ALL_POLICIES {
            let mut rng = StdRng::seed_from_u64(3);
            let mut game = Game::from_board(board.clone());
            let status = RandomWalk::new(policy, SearchConfig::default())
                .play(&mut game, &mut rng, soon())
                .unwrap();

            assert_eq!(status, SearchStatus::Solved, "{:?}", policy);
            assert!(game.is_finished());

            let mut replay = Game::from_board(board.clone());
            replay.replay(game.moves()).unwrap();
            assert_eq!(replay.board().snapshot(), game.board().snapshot());
        }
    }

    #[test]
    fn finish_check_takes_the_exit() {
        let board = board_from(
            "
            ......
            ......
            XX....
            ..AA..
            ......
            ......
            ",
        );
        let mut rng = StdRng::seed_from_u64(0);

        for policy in [RandomPolicy::AllAvailableFinishCheck, RandomPolicy::MaxMovesFinishCheck] {
            assert_eq!(policy.pick(&board, &mut rng), Some(Move::new("X", 4)));
        }
    }

    #[test]
    fn vehicle_first_picks_a_legal_move() {
        let board = board_from(CARD);
        let legal = board.mover().legal_moves();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let mv = RandomPolicy::VehicleFirst.pick(&board, &mut rng).unwrap();
            assert!(legal.contains(&mv));
        }
    }

    #[test]
    fn same_seed_same_walk() {
        let board = board_from(CARD);
        let config = SearchConfig {
            random_seed: Some(99),
            time_limit: Some(Duration::from_secs(30)),
            ..SearchConfig::default()
        };
        let walk = RandomWalk::new(RandomPolicy::VehicleFirst, config);

        let first = walk.solve(&board).unwrap();
        let second = walk.solve(&board).unwrap();
        assert_eq!(first.status, SearchStatus::Solved);
        assert_eq!(first.moves(), second.moves());
        assert_eq!(first.stats.expanded, first.moves().unwrap().len());
    }

    #[test]
    fn gridlock_is_exhausted() {
        let board = board_from(
            "
            XXA
            BBA
            CCC
            ",
        );
        let mut game = Game::from_board(board);
        let mut rng = StdRng::seed_from_u64(0);

        let status = RandomWalk::default()
            .play(&mut game, &mut rng, None)
            .unwrap();
        assert_eq!(status, SearchStatus::Exhausted);
        assert!(game.moves().is_empty());
    }

    #[test]
    fn unsolvable_walk_stops_at_deadline() {
        let board = board_from(
            "
            ......
            ......
            XX..CC
            ......
            ......
            ......
            ",
        );
        let mut game = Game::from_board(board);
        let mut rng = StdRng::seed_from_u64(0);
        let deadline = Some(Instant::now() + Duration::from_millis(20));

        let status = RandomWalk::new(RandomPolicy::AllAvailable, SearchConfig::default())
            .play(&mut game, &mut rng, deadline)
            .unwrap();
        assert_eq!(status, SearchStatus::TimedOut);
        assert!(!game.moves().is_empty());
    }
}
