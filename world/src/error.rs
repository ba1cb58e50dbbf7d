//! Error types reported while building boards and driving the robot.

use factory_floor_core::{CellCoord, Direction, PROGRAM_SIZE};
use thiserror::Error;

/// Device invariant violated by a single tile.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TileError {
    /// A wall device fires through a side whose opposite wall is missing.
    #[error("{device} firing {direction} needs a {mount} wall to be mounted on")]
    UnmountedDevice {
        /// Kind of wall device that failed validation.
        device: &'static str,
        /// Direction the device fires or pushes toward.
        direction: Direction,
        /// Wall side the device must be mounted on.
        mount: Direction,
    },
    /// A push panel declared no program steps on which it activates.
    #[error("push panel facing {direction} has no active program steps")]
    InactivePusher {
        /// Direction the push panel pushes toward.
        direction: Direction,
    },
    /// A checkpoint declared an order below one.
    #[error("checkpoint order must be at least 1, found {order}")]
    InvalidCheckpointOrder {
        /// Offending order value.
        order: u32,
    },
}

/// Field-level problem found while reading a textual tile definition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// A wall entry does not name a canonical side.
    #[error("wall side `{0}` is not one of north, east, south or west")]
    InvalidWallSide(String),
    /// The floor table omitted its `type` field.
    #[error("floor device is missing its type")]
    MissingFloorType,
    /// The floor `type` field names no known device.
    #[error("unknown floor device type `{0}`")]
    UnknownFloorType(String),
    /// A device direction is absent or not a canonical side.
    #[error("{device} direction {value} is not one of north, east, south or west")]
    InvalidDirection {
        /// Device carrying the direction.
        device: &'static str,
        /// Rendered offending value.
        value: String,
    },
    /// A conveyor speed is absent or not 1 or 2.
    #[error("conveyor speed {0} must be 1 or 2")]
    InvalidConveyorSpeed(String),
    /// A gear direction is absent or not `cw` or `ccw`.
    #[error("gear direction {0} must be `cw` or `ccw`")]
    InvalidGearDirection(String),
    /// A checkpoint order is absent, non-numeric or not positive.
    #[error("checkpoint order {0} must be a positive integer")]
    InvalidCheckpointOrder(String),
    /// The wall device `type` field names no known device.
    #[error("unknown wall device type `{0}`")]
    UnknownWallDeviceType(String),
    /// A push panel step lies outside the program.
    #[error("push panel step {0} must be an integer between 1 and {max}", max = PROGRAM_SIZE)]
    InvalidPusherStep(String),
}

/// Reasons a board definition is rejected as a whole.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// The definition uses an unsupported format version.
    #[error("unsupported board definition version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version declared by the definition.
        found: u32,
        /// Version understood by this build.
        expected: u32,
    },
    /// The board has no tiles.
    #[error("board definition contains no tiles")]
    Empty,
    /// A row's length differs from the first row.
    #[error("row {row} has {found} tiles but the board is {expected} columns wide")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width established by the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A tile was supplied at a position other than the one it declares.
    #[error("tile declared at {declared} was placed at {placed}")]
    MisplacedTile {
        /// Cell stored in the tile.
        declared: CellCoord,
        /// Cell the tile occupies in the grid.
        placed: CellCoord,
    },
    /// A tile definition could not be read.
    #[error("tile at {cell}: {source}")]
    Definition {
        /// Cell of the offending tile.
        cell: CellCoord,
        /// Underlying field problem.
        #[source]
        source: DefinitionError,
    },
    /// A tile violated a device invariant.
    #[error("tile at {cell}: {source}")]
    Tile {
        /// Cell of the offending tile.
        cell: CellCoord,
        /// Underlying invariant violation.
        #[source]
        source: TileError,
    },
    /// Two checkpoints share an order.
    #[error("checkpoint order {order} appears at both {first} and {second}")]
    DuplicateCheckpoint {
        /// Shared order value.
        order: u32,
        /// First cell declaring the order.
        first: CellCoord,
        /// Second cell declaring the order.
        second: CellCoord,
    },
    /// Checkpoint orders skip a value, leaving the course unwinnable.
    #[error("checkpoint order {missing} is missing from the sequence")]
    CheckpointGap {
        /// First order absent from `1..=count`.
        missing: u32,
    },
}

/// Raised when a robot must respawn but has never visited a flag.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RespawnError {
    /// No repair station or checkpoint has been recorded.
    #[error("robot has no respawn anchor")]
    NoAnchor,
}

/// Raised when a program cannot be loaded into the robot's registers.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    /// More cards were supplied than the robot has registers.
    #[error("program holds at most {max} cards, received {received}", max = PROGRAM_SIZE)]
    TooManyCards {
        /// Number of cards supplied.
        received: usize,
    },
}
