//! Move rules: legal slide distances, move enumeration and execution.

use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use crate::board::Board;
use crate::error::MoveError;
use crate::vehicle::{Direction, Vehicle};

/// A slide of one vehicle. Positive steps move forwards along the vehicle's
/// axis, negative steps backwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub vehicle: Arc<str>,
    pub steps: i32,
}

impl Move {
    pub fn new(vehicle: impl Into<Arc<str>>, steps: i32) -> Move {
        Move {
            vehicle: vehicle.into(),
            steps,
        }
    }

    /// The move that undoes this one.
    pub fn inverse(&self) -> Move {
        Move {
            vehicle: self.vehicle.clone(),
            steps: -self.steps,
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::of_steps(self.steps)
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:+}", self.vehicle, self.steps)
    }
}

/// Positions along an axis strictly beyond `edge`, nearest first.
#[auto_enums::auto_enum(Iterator)]
fn beyond_edge(edge: i32, size: i32, direction: Direction) -> impl Iterator<Item = i32> {
    match direction {
        Direction::Forwards => (edge + 1)..size,
        Direction::Backwards => (0..edge).rev(),
    }
}

/// Applies the rules of the game to a board.
///
/// A `Mover` over `&Board` answers questions about legal moves; a `Mover`
/// over `&mut Board` can also execute them.
pub struct Mover<B> {
    board: B,
}

impl Board {
    pub fn mover(&self) -> Mover<&Board> {
        Mover::new(self)
    }

    pub fn mover_mut(&mut self) -> Mover<&mut Board> {
        Mover::new(self)
    }
}

impl<B: Deref<Target = Board>> Mover<B> {
    pub fn new(board: B) -> Mover<B> {
        Mover { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn index_of(&self, vehicle_name: &str) -> Result<usize, MoveError> {
        self.board
            .vehicle_index(vehicle_name)
            .ok_or_else(|| MoveError::VehicleNotExist(vehicle_name.to_string()))
    }

    /// Cells between the vehicle's edge and the board boundary.
    fn distance_to_boundary(&self, vehicle: &Vehicle, direction: Direction) -> u32 {
        let edge = vehicle.axis(vehicle.edge(direction));
        match direction {
            Direction::Forwards => (self.board.size() as i32 - 1 - edge) as u32,
            Direction::Backwards => edge as u32,
        }
    }

    fn max_steps_of(&self, vehicle: &Vehicle, direction: Direction) -> u32 {
        let edge = vehicle.edge(direction);
        let start = vehicle.axis(edge);

        beyond_edge(start, self.board.size() as i32, direction)
            .map(|pos| vehicle.along(edge, pos - start))
            .take_while(|&cell| self.board.is_free(cell))
            .count() as u32
    }

    /// The furthest the vehicle can slide in `direction`: the number of
    /// contiguous empty cells beyond its edge before an obstruction or the
    /// boundary.
    pub fn get_vehicle_max_steps(
        &self,
        vehicle_name: &str,
        direction: Direction,
    ) -> Result<u32, MoveError> {
        let index = self.index_of(vehicle_name)?;
        Ok(self.max_steps_of(&self.board.vehicles()[index], direction))
    }

    fn push_vehicle_moves(&self, vehicle: &Vehicle, out: &mut Vec<Move>) {
        for direction in [Direction::Forwards, Direction::Backwards] {
            let max_steps = self.max_steps_of(vehicle, direction) as i32;
            for steps in 1..=max_steps {
                out.push(Move::new(vehicle.name_handle().clone(), steps * direction.signum()));
            }
        }
    }

    /// Every legal move, of every step count, for one vehicle or all of them.
    pub fn get_all_available_moves(
        &self,
        vehicle_name: Option<&str>,
    ) -> Result<Vec<Move>, MoveError> {
        match vehicle_name {
            Some(name) => {
                let index = self.index_of(name)?;
                let mut moves = Vec::new();
                self.push_vehicle_moves(&self.board.vehicles()[index], &mut moves);
                Ok(moves)
            }
            None => Ok(self.legal_moves()),
        }
    }

    /// Every legal move of every vehicle, grouped by vehicle in placement
    /// order, forwards before backwards, shortest slide first.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for vehicle in self.board.vehicles() {
            self.push_vehicle_moves(vehicle, &mut moves);
        }
        moves
    }

    /// Only the largest forward and largest backward slide of each vehicle.
    pub fn get_max_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for vehicle in self.board.vehicles() {
            for direction in [Direction::Forwards, Direction::Backwards] {
                let max_steps = self.max_steps_of(vehicle, direction) as i32;
                if max_steps > 0 {
                    moves.push(Move::new(
                        vehicle.name_handle().clone(),
                        max_steps * direction.signum(),
                    ));
                }
            }
        }
        moves
    }

    /// The finishing move, if Carter's way to the exit is unobstructed and
    /// Carter is not already there.
    pub fn free_carter(&self) -> Option<Move> {
        let carter = self.board.carter()?;
        let steps = self.max_steps_of(carter, Direction::Forwards);

        if steps > 0 && steps == self.distance_to_boundary(carter, Direction::Forwards) {
            Some(Move::new(carter.name_handle().clone(), steps as i32))
        } else {
            None
        }
    }

    /// Checks a move against the current board, returning the index of the
    /// vehicle it moves.
    pub fn validate_move(&self, mv: &Move) -> Result<usize, MoveError> {
        if mv.steps == 0 {
            return Err(MoveError::StepIsZero(mv.vehicle.to_string()));
        }

        let index = self.index_of(&mv.vehicle)?;
        let vehicle = &self.board.vehicles()[index];
        let direction = mv.direction();
        let max_steps = self.max_steps_of(vehicle, direction);

        if mv.steps.unsigned_abs() > max_steps {
            // whichever limit was hit first decides the failure
            return if max_steps == self.distance_to_boundary(vehicle, direction) {
                Err(MoveError::OutOfBounds(mv.vehicle.to_string()))
            } else {
                Err(MoveError::VehicleBlocked(mv.vehicle.to_string()))
            };
        }

        Ok(index)
    }
}

impl<B: DerefMut<Target = Board>> Mover<B> {
    /// Slides a vehicle. On error the board is unchanged.
    pub fn move_vehicle(&mut self, mv: &Move) -> Result<(), MoveError> {
        let index = self.validate_move(mv)?;

        self.board.vehicle_mut(index).shift(mv.steps);
        self.board.update_state(index, false);
        Ok(())
    }
}

/// Carter's move that ends the game from `board`, if one exists.
pub fn free_carter(board: &Board) -> Option<Move> {
    board.mover().free_carter()
}
