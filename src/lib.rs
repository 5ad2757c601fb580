//! A Rush Hour solver.
//!
//! Vehicles slide along their own axis on a square grid; the puzzle is solved
//! once Carter, the horizontal vehicle named `X`, touches the right edge.
//!
//! ```
//! use rush_hour_solver::{parse_grid, BreadthFirst, Game, SearchConfig};
//!
//! let (size, layout) = parse_grid("
//!     ......
//!     ...B..
//!     XX.B..
//!     ...B..
//!     ......
//!     ..CC..
//! ").unwrap();
//! let game = Game::new(size, &layout).unwrap();
//!
//! let outcome = BreadthFirst::new(SearchConfig::strict()).run(game.board()).unwrap();
//! assert_eq!(outcome.moves().unwrap().len(), 3);
//! ```

mod board;
pub mod config;
mod error;
mod game;
mod mover;
pub mod record;
pub mod refiner;
pub mod search;
mod vehicle;

pub use board::{Board, Snapshot, EMPTY_SPOT};
pub use config::{Algorithm, RefinerConfig, SolverConfig};
pub use error::{
    ConfigError, Error, MoveError, PlacementError, RecordError, RefineError, Result, SetupError,
};
pub use game::Game;
pub use mover::{free_carter, Move, Mover};
pub use record::{
    board_size_from_file_name, parse_grid, parse_layout, parse_moves, read_layout, write_moves,
};
pub use refiner::{Refinement, StepRefiner};
pub use search::{
    shortest_solution, AStar, BreadthFirst, Checkpoint, DepthFirst, FileCheckpoint, Goal,
    Heuristic, MovePolicy, Progress, RandomPolicy, RandomWalk, Search, SearchConfig,
    SearchOutcome, SearchStats, SearchStatus, Solution,
};
pub use vehicle::{Cell, Direction, Orientation, Vehicle, VehicleData, CARTER_LENGTH, CARTER_NAME};
