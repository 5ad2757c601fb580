use std::{
    fmt::{Display, Write},
    ops::Index,
};

use crate::error::PlacementError;
use crate::mover::Move;
use crate::vehicle::{Cell, Orientation, Vehicle, CARTER_LENGTH};

/// Cell id of an unoccupied square. Occupied squares hold `index + 1` of the
/// owning vehicle.
pub const EMPTY_SPOT: u16 = 0;

/// Immutable copy of a board's grid, used as the key of seen-state archives.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Snapshot {
    size: usize,
    cells: Box<[u16]>,
}

impl Snapshot {
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }
}

/// An NxN grid together with the vehicles placed on it.
///
/// Vehicles keep their placement order; the grid stores for every square
/// either [`EMPTY_SPOT`] or the id of the vehicle occupying it. Cloning a
/// board yields a fully independent copy.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    vehicles: Vec<Vehicle>,
    locations: Vec<u16>,
}

impl Board {
    pub fn new(size: usize) -> Board {
        Board {
            size,
            vehicles: Vec::new(),
            locations: vec![EMPTY_SPOT; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, name: &str) -> Option<&Vehicle> {
        self.vehicle_index(name).map(|ix| &self.vehicles[ix])
    }

    pub(crate) fn vehicle_index(&self, name: &str) -> Option<usize> {
        self.vehicles.iter().position(|v| v.name() == name)
    }

    pub(crate) fn vehicle_mut(&mut self, index: usize) -> &mut Vehicle {
        &mut self.vehicles[index]
    }

    pub fn carter(&self) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.is_carter())
    }

    pub fn in_bounds(&self, (col, row): Cell) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.size && (row as usize) < self.size
    }

    /// True when `cell` is on the board and unoccupied.
    pub fn is_free(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && self[(cell.0 as usize, cell.1 as usize)] == EMPTY_SPOT
    }

    /// Name of the vehicle occupying `(col, row)`, if any.
    pub fn cell(&self, col: usize, row: usize) -> Option<&str> {
        match self[(col, row)] {
            EMPTY_SPOT => None,
            id => Some(self.vehicles[id as usize - 1].name()),
        }
    }

    /// Places a vehicle at its start position.
    ///
    /// Nothing is mutated unless every check passes.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<(), PlacementError> {
        let name = vehicle.name();

        if self.vehicle_index(name).is_some() {
            return Err(PlacementError::NameAlreadyExists(name.to_string()));
        }

        if vehicle.is_carter() && vehicle.orientation() != Orientation::Horizontal {
            return Err(PlacementError::CarterOrientationInvalid(name.to_string()));
        }

        if vehicle.is_carter() && vehicle.length() != CARTER_LENGTH {
            return Err(PlacementError::CarterLengthInvalid(name.to_string(), vehicle.length()));
        }

        if !vehicle.location().iter().all(|&cell| self.in_bounds(cell)) {
            return Err(PlacementError::OutOfBounds(name.to_string()));
        }

        if !vehicle.location().iter().all(|&cell| self.is_free(cell)) {
            return Err(PlacementError::Occupied(name.to_string()));
        }

        self.vehicles.push(vehicle);
        self.update_state(self.vehicles.len() - 1, true);
        Ok(())
    }

    /// Stamps the vehicle at `index` onto the grid at its current location.
    /// Unless `new`, the cells it previously occupied are cleared first.
    pub fn update_state(&mut self, index: usize, new: bool) {
        let id = index as u16 + 1;

        if !new {
            for cell in self.locations.iter_mut().filter(|c| **c == id) {
                *cell = EMPTY_SPOT;
            }
        }

        let size = self.size;
        for &(col, row) in self.vehicles[index].location() {
            self.locations[row as usize * size + col as usize] = id;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            size: self.size,
            cells: self.locations.clone().into_boxed_slice(),
        }
    }

    /// Carter's front is flush against the exit edge.
    pub fn is_finished(&self) -> bool {
        self.carter()
            .is_some_and(|carter| carter.front().0 as usize == self.size - 1)
    }

    /// Puts every vehicle back at its original placement.
    pub fn reset(&mut self) {
        self.locations.fill(EMPTY_SPOT);
        for index in 0..self.vehicles.len() {
            self.vehicles[index].reset();
            self.update_state(index, true);
        }
    }

    /// The single move that turns `self` into `next`, if they differ by
    /// exactly one vehicle's position.
    pub fn move_between(&self, next: &Board) -> Option<Move> {
        let mut moved = self
            .vehicles
            .iter()
            .zip(&next.vehicles)
            .filter(|(before, after)| before.back() != after.back());

        let (before, after) = moved.next()?;
        if moved.next().is_some() {
            return None;
        }

        let steps = before.axis(after.back()) - before.axis(before.back());
        Some(Move::new(before.name_handle().clone(), steps))
    }
}

/// One character per cell for single-letter names. Longer names widen every
/// cell to the longest name and cells are separated by a space.
impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .vehicles
            .iter()
            .map(|v| v.name().chars().count())
            .max()
            .unwrap_or(1);

        let mut first = true;
        for row in 0..self.size {
            if !first {
                f.write_char('\n')?;
            } else {
                first = false;
            }

            for col in 0..self.size {
                if width > 1 && col > 0 {
                    f.write_char(' ')?;
                }
                let name = self.cell(col, row).unwrap_or(".");
                write!(f, "{:<width$}", name)?;
            }
        }

        Ok(())
    }
}

/// Indexed by `(col, row)`.
impl Index<(usize, usize)> for Board {
    type Output = u16;
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.locations[index.1 * self.size + index.0]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vehicle::CARTER_NAME;
    use Orientation::{Horizontal as H, Vertical as V};

    fn vehicle(name: &str, orientation: Orientation, col: i32, row: i32, len: usize) -> Vehicle {
        Vehicle::new(name, orientation, col, row, len).unwrap()
    }

    fn cells_named(board: &Board, name: &str) -> Vec<Cell> {
        let mut cells = Vec::new();
        for row in 0..board.size() {
            for col in 0..board.size() {
                if board.cell(col, row) == Some(name) {
                    cells.push((col as i32, row as i32));
                }
            }
        }
        cells
    }

    #[test]
    fn new_board_is_empty() {
        for size in [6, 9, 12] {
            let board = Board::new(size);
            assert!(board.vehicles().is_empty());
            assert!(board.snapshot().cells().iter().all(|c| *c == EMPTY_SPOT));
            assert_eq!(board.snapshot().cells().len(), size * size);
        }
    }

    #[test]
    fn placed_cells_match_locations() {
        let mut board = Board::new(6);
        board.add_vehicle(vehicle("A", H, 1, 0, 2)).unwrap();
        board.add_vehicle(vehicle("B", V, 3, 0, 3)).unwrap();
        board.add_vehicle(vehicle(CARTER_NAME, H, 0, 2, 2)).unwrap();

        for v in board.vehicles() {
            let mut expected = v.location().to_vec();
            expected.sort_by_key(|&(col, row)| (row, col));
            assert_eq!(cells_named(&board, v.name()), expected);
        }
        assert_eq!(
            board.to_string(),
            ".AAB..\n...B..\nXX.B..\n......\n......\n......"
        );
    }

    #[test]
    fn long_names_stay_apart() {
        let mut board = Board::new(3);
        board.add_vehicle(vehicle("AA", H, 0, 0, 2)).unwrap();
        board.add_vehicle(vehicle("AB", V, 2, 0, 2)).unwrap();

        assert_eq!(board.to_string(), "AA AA AB\n.  .  AB\n.  .  . ");
    }

    #[test]
    fn placement_errors() {
        let mut board = Board::new(6);
        board.add_vehicle(vehicle("A", H, 0, 0, 2)).unwrap();

        assert_eq!(
            board.add_vehicle(vehicle("A", V, 5, 3, 2)),
            Err(PlacementError::NameAlreadyExists("A".to_string()))
        );
        assert_eq!(
            board.add_vehicle(vehicle(CARTER_NAME, V, 4, 2, 2)),
            Err(PlacementError::CarterOrientationInvalid(CARTER_NAME.to_string()))
        );
        assert_eq!(
            board.add_vehicle(vehicle(CARTER_NAME, H, 0, 2, 3)),
            Err(PlacementError::CarterLengthInvalid(CARTER_NAME.to_string(), 3))
        );
        assert_eq!(
            board.add_vehicle(vehicle("B", H, 5, 3, 2)),
            Err(PlacementError::OutOfBounds("B".to_string()))
        );
        assert_eq!(
            board.add_vehicle(vehicle("C", V, 0, 4, 3)),
            Err(PlacementError::OutOfBounds("C".to_string()))
        );
        assert_eq!(
            board.add_vehicle(vehicle("D", H, -1, 3, 2)),
            Err(PlacementError::OutOfBounds("D".to_string()))
        );
        assert_eq!(
            board.add_vehicle(vehicle("E", V, 1, 0, 3)),
            Err(PlacementError::Occupied("E".to_string()))
        );

        // failed placements leave no trace
        assert_eq!(board.vehicles().len(), 1);
        assert_eq!(cells_named(&board, "E"), vec![]);
    }

    #[test]
    fn update_state_moves_the_stamp() {
        let mut board = Board::new(6);
        board.add_vehicle(vehicle("B", V, 2, 1, 3)).unwrap();

        board.vehicle_mut(0).shift(2);
        board.update_state(0, false);
        assert_eq!(cells_named(&board, "B"), vec![(2, 3), (2, 4), (2, 5)]);

        // stamping as new keeps stale cells around
        board.vehicle_mut(0).shift(-3);
        board.update_state(0, true);
        assert_eq!(cells_named(&board, "B").len(), 6);
    }

    #[test]
    fn clones_are_independent() {
        let mut board = Board::new(6);
        board.add_vehicle(vehicle(CARTER_NAME, H, 0, 2, 2)).unwrap();
        let original = board.snapshot();

        let mut child = board.clone();
        child.vehicle_mut(0).shift(3);
        child.update_state(0, false);

        assert_eq!(board.snapshot(), original);
        assert_ne!(child.snapshot(), original);
        assert_eq!(board.move_between(&child), Some(Move::new(CARTER_NAME, 3)));
        assert_eq!(child.move_between(&board), Some(Move::new(CARTER_NAME, -3)));
        assert_eq!(board.move_between(&board), None);
    }

    #[test]
    fn finished_when_carter_touches_exit() {
        let mut board = Board::new(6);
        assert!(!board.is_finished());
        board.add_vehicle(vehicle(CARTER_NAME, H, 4, 2, 2)).unwrap();
        assert!(board.is_finished());

        board.vehicle_mut(0).shift(-1);
        board.update_state(0, false);
        assert!(!board.is_finished());

        board.reset();
        assert!(board.is_finished());
    }
}
