//! Error types for board setup, moves, refinement and records.

use thiserror::Error;

/// A vehicle could not be placed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("Vehicle '{0}': placement is out of bounds")]
    OutOfBounds(String),

    #[error("Vehicle '{0}': placement is on top of another vehicle")]
    Occupied(String),

    #[error("Vehicle '{0}': a vehicle with this name already exists")]
    NameAlreadyExists(String),

    #[error("Vehicle '{0}': Carter can only be placed horizontally")]
    CarterOrientationInvalid(String),

    #[error("Vehicle '{0}': Carter must have length 2, not {1}")]
    CarterLengthInvalid(String, usize),

    #[error("Vehicle '{0}': length {1} is not 2 or 3")]
    InvalidLength(String, usize),
}

/// A move was rejected. The board is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Vehicle '{0}': move cannot have a step of 0")]
    StepIsZero(String),

    #[error("Vehicle '{0}': move would place vehicle out of bounds")]
    OutOfBounds(String),

    #[error("Vehicle '{0}': move is blocked by another vehicle")]
    VehicleBlocked(String),

    #[error("Vehicle '{0}': trying to move a vehicle that does not exist")]
    VehicleNotExist(String),
}

/// Setting up a board from vehicle data failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("No vehicle data to set up the board with")]
    NoVehicleData,

    #[error("Carter appears to not be on the board")]
    NoCarterOnBoard,

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Shortening a solution failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefineError {
    #[error("StepRefiner requires a solved board")]
    RequiresSolvedBoard,

    #[error("Rewinding the solution failed: {0}")]
    Move(#[from] MoveError),

    /// The breadth-first pass could not reconnect a rewound chunk.
    #[error("No path back to the board state before moves {from}..{to}")]
    Unreachable { from: usize, to: usize },
}

/// Malformed board-layout or move-list text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("Missing header: expected '{0}'")]
    MissingHeader(&'static str),

    #[error("Grid is not square: row {row} has {found} cells, expected {expected}")]
    NotSquare {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Vehicle '{0}' does not occupy a single straight run of cells")]
    BrokenVehicle(char),
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main error type, wrapping every failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Refine(#[from] RefineError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages_name_the_vehicle() {
        let err = PlacementError::Occupied("B".to_string());
        assert_eq!(
            err.to_string(),
            "Vehicle 'B': placement is on top of another vehicle"
        );

        let err = MoveError::VehicleBlocked("X".to_string());
        assert_eq!(
            err.to_string(),
            "Vehicle 'X': move is blocked by another vehicle"
        );
    }

    #[test]
    fn setup_wraps_placement_transparently() {
        let err: SetupError = PlacementError::OutOfBounds("A".to_string()).into();
        assert_eq!(err.to_string(), "Vehicle 'A': placement is out of bounds");

        let err: Error = err.into();
        assert!(matches!(err, Error::Setup(SetupError::Placement(_))));
    }
}
