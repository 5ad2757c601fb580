use crate::board::Board;
use crate::error::{MoveError, SetupError};
use crate::mover::Move;
use crate::vehicle::{Vehicle, VehicleData};

/// A board together with the moves played on it so far.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    moves: Vec<Move>,
}

impl Game {
    /// Creates a game on a `size`x`size` board laid out from `data`.
    pub fn new(size: usize, data: &[VehicleData]) -> Result<Game, SetupError> {
        Ok(Game {
            board: Game::setup_board(Board::new(size), data)?,
            moves: Vec::new(),
        })
    }

    /// Starts a fresh history on an already populated board.
    pub fn from_board(board: Board) -> Game {
        Game {
            board,
            moves: Vec::new(),
        }
    }

    /// Places every vehicle in `data` on `board`.
    pub fn setup_board(mut board: Board, data: &[VehicleData]) -> Result<Board, SetupError> {
        if data.is_empty() {
            return Err(SetupError::NoVehicleData);
        }

        for vehicle_data in data {
            board.add_vehicle(Vehicle::from_data(vehicle_data)?)?;
        }

        if board.carter().is_none() {
            return Err(SetupError::NoCarterOnBoard);
        }

        Ok(board)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn into_parts(self) -> (Board, Vec<Move>) {
        (self.board, self.moves)
    }

    pub fn get_all_available_moves(
        &self,
        vehicle_name: Option<&str>,
    ) -> Result<Vec<Move>, MoveError> {
        self.board.mover().get_all_available_moves(vehicle_name)
    }

    /// Plays a move and records it. Failed moves are not recorded.
    pub fn make_move(&mut self, mv: Move) -> Result<(), MoveError> {
        self.board.mover_mut().move_vehicle(&mv)?;
        self.moves.push(mv);
        Ok(())
    }

    /// Plays `moves` in order, stopping at the first illegal one.
    pub fn replay<'a>(
        &mut self,
        moves: impl IntoIterator<Item = &'a Move>,
    ) -> Result<(), MoveError> {
        for mv in moves {
            self.make_move(mv.clone())?;
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.board.is_finished()
    }

    /// Back to the original placements with an empty history.
    pub fn reset(&mut self) {
        self.board.reset();
        self.moves.clear();
    }

    /// Whether `moves`, played from the start of the layout, solve it.
    ///
    /// Any illegal move makes the whole sequence invalid.
    pub fn validate_solution(
        size: usize,
        data: &[VehicleData],
        moves: &[Move],
    ) -> Result<bool, SetupError> {
        let mut game = Game::new(size, data)?;
        Ok(game.replay(moves).is_ok() && game.is_finished())
    }
}
