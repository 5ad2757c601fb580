use std::{
    fmt::{Display, Write},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::PlacementError;

/// Name of the vehicle that has to reach the exit.
pub const CARTER_NAME: &str = "X";

pub const CARTER_LENGTH: usize = 2;

/// A grid cell as `(col, row)`. Signed so that layouts placing a vehicle
/// partly off the board can be represented and rejected.
pub type Cell = (i32, i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Occupies a row, moves along columns.
    Horizontal,
    /// Occupies a column, moves along rows.
    Vertical,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H" => Ok(Orientation::Horizontal),
            "V" => Ok(Orientation::Vertical),
            other => Err(format!("unknown orientation '{}'", other)),
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char(match self {
            Orientation::Horizontal => 'H',
            Orientation::Vertical => 'V',
        })
    }
}

/// Direction of travel along a vehicle's axis. Forwards is towards
/// increasing column or row, which for Carter is towards the exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forwards,
    Backwards,
}

impl Direction {
    /// Direction implied by the sign of a step count.
    pub fn of_steps(steps: i32) -> Direction {
        if steps < 0 {
            Direction::Backwards
        } else {
            Direction::Forwards
        }
    }

    pub fn signum(self) -> i32 {
        match self {
            Direction::Forwards => 1,
            Direction::Backwards => -1,
        }
    }
}

/// One record of a board-setup layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleData {
    pub name: String,
    pub orientation: Orientation,
    pub start_col: i32,
    pub start_row: i32,
    pub length: usize,
}

impl VehicleData {
    pub fn new(
        name: impl Into<String>,
        orientation: Orientation,
        start_col: i32,
        start_row: i32,
        length: usize,
    ) -> VehicleData {
        VehicleData {
            name: name.into(),
            orientation,
            start_col,
            start_row,
            length,
        }
    }
}

/// A car (length 2) or truck (length 3) on the board.
///
/// `location` lists the occupied cells from back to front.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vehicle {
    name: Arc<str>,
    orientation: Orientation,
    start_col: i32,
    start_row: i32,
    length: usize,
    is_carter: bool,
    location: SmallVec<[Cell; 3]>,
}

impl Vehicle {
    pub fn new(
        name: &str,
        orientation: Orientation,
        start_col: i32,
        start_row: i32,
        length: usize,
    ) -> Result<Vehicle, PlacementError> {
        if !(2..=3).contains(&length) {
            return Err(PlacementError::InvalidLength(name.to_string(), length));
        }

        let start = match orientation {
            Orientation::Horizontal => start_col,
            Orientation::Vertical => start_row,
        };
        if start.checked_add(length as i32 - 1).is_none() {
            return Err(PlacementError::OutOfBounds(name.to_string()));
        }

        let mut vehicle = Vehicle {
            name: Arc::from(name),
            orientation,
            start_col,
            start_row,
            length,
            is_carter: name == CARTER_NAME,
            location: SmallVec::new(),
        };
        vehicle.update_location(start_col, start_row);
        Ok(vehicle)
    }

    pub fn from_data(data: &VehicleData) -> Result<Vehicle, PlacementError> {
        Vehicle::new(
            &data.name,
            data.orientation,
            data.start_col,
            data.start_row,
            data.length,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared handle to the name, cheap to put into moves.
    pub fn name_handle(&self) -> &Arc<str> {
        &self.name
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn start(&self) -> Cell {
        (self.start_col, self.start_row)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_carter(&self) -> bool {
        self.is_carter
    }

    pub fn location(&self) -> &[Cell] {
        &self.location
    }

    pub fn back(&self) -> Cell {
        self.location[0]
    }

    pub fn front(&self) -> Cell {
        self.location[self.length - 1]
    }

    /// The cell at the edge facing `direction`.
    pub fn edge(&self, direction: Direction) -> Cell {
        match direction {
            Direction::Forwards => self.front(),
            Direction::Backwards => self.back(),
        }
    }

    /// Position of a cell along this vehicle's axis of travel.
    pub fn axis(&self, cell: Cell) -> i32 {
        match self.orientation {
            Orientation::Horizontal => cell.0,
            Orientation::Vertical => cell.1,
        }
    }

    /// Cell at `offset` along the axis from `cell`, staying on the same line.
    pub fn along(&self, cell: Cell, offset: i32) -> Cell {
        match self.orientation {
            Orientation::Horizontal => (cell.0 + offset, cell.1),
            Orientation::Vertical => (cell.0, cell.1 + offset),
        }
    }

    /// Re-lays the vehicle with its back at `(col, row)`.
    pub fn update_location(&mut self, col: i32, row: i32) {
        self.location.clear();
        for i in 0..self.length as i32 {
            self.location.push(match self.orientation {
                Orientation::Horizontal => (col + i, row),
                Orientation::Vertical => (col, row + i),
            });
        }
    }

    /// Shifts the vehicle `steps` cells along its axis.
    pub fn shift(&mut self, steps: i32) {
        let (col, row) = self.along(self.back(), steps);
        self.update_location(col, row);
    }

    /// Puts the vehicle back where it was originally placed.
    pub fn reset(&mut self) {
        self.update_location(self.start_col, self.start_row);
    }
}
