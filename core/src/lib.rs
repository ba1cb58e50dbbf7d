#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Factory Floor engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The world owns the static board and
//! the single robot; systems drive the robot through its methods, and every
//! committed state change is reported as an [`Event`] appended to a
//! caller-owned buffer. Adapters consume those event streams to present the
//! simulation and supply program cards through the [`CardSupply`] contract.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Number of cards that make up a complete program, and the number of
/// register steps resolved per turn.
pub const PROGRAM_SIZE: usize = 5;

/// Health a robot starts with and is restored to by repairs.
pub const MAX_HEALTH: u8 = 5;

/// Lives a robot starts the match with.
pub const STARTING_LIVES: u8 = 3;

/// Cardinal directions used for facings, wall sides and device directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Direction reached after a quarter turn in the provided rotation.
    #[must_use]
    pub const fn rotated(self, rotation: Rotation) -> Self {
        match (self, rotation) {
            (Self::North, Rotation::Clockwise) | (Self::South, Rotation::CounterClockwise) => {
                Self::East
            }
            (Self::East, Rotation::Clockwise) | (Self::West, Rotation::CounterClockwise) => {
                Self::South
            }
            (Self::South, Rotation::Clockwise) | (Self::North, Rotation::CounterClockwise) => {
                Self::West
            }
            (Self::West, Rotation::Clockwise) | (Self::East, Rotation::CounterClockwise) => {
                Self::North
            }
        }
    }

    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Canonical lower-case name of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "north" => Ok(Self::North),
            "east" => Ok(Self::East),
            "south" => Ok(Self::South),
            "west" => Ok(Self::West),
            other => Err(ParseDirectionError(other.to_owned())),
        }
    }
}

/// Reports a side or direction name outside the four canonical directions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDirectionError(String);

impl ParseDirectionError {
    /// Text that failed to parse.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` is not one of north, east, south or west",
            self.0
        )
    }
}

impl std::error::Error for ParseDirectionError {}

/// Sense of a quarter turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// Turn right.
    #[serde(rename = "cw")]
    Clockwise,
    /// Turn left.
    #[serde(rename = "ccw")]
    CounterClockwise,
}

/// Location of a single board tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Adjacent cell in the provided direction, bounded by the grid size.
    ///
    /// Returns `None` when the step would leave a grid of `columns` by `rows`
    /// cells.
    #[must_use]
    pub fn neighbor(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (column_delta, row_delta) = direction.offset();
        let column = self.column.checked_add_signed(column_delta)?;
        let row = self.row.checked_add_signed(row_delta)?;
        if column < columns && row < rows {
            Some(CellCoord::new(column, row))
        } else {
            None
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// One-based index of the program register currently resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramStep(u8);

impl ProgramStep {
    /// Creates a program step, returning `None` outside `1..=PROGRAM_SIZE`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value as usize <= PROGRAM_SIZE {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Iterates every program step in execution order.
    pub fn all() -> impl Iterator<Item = ProgramStep> {
        (1..=PROGRAM_SIZE as u8).map(Self)
    }

    /// One-based numeric value of the step.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Zero-based register index for addressing a program.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize - 1
    }
}

/// Movement instruction printed on a program card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// Advance one cell.
    #[serde(rename = "move1")]
    Move1,
    /// Advance two cells, one at a time.
    #[serde(rename = "move2")]
    Move2,
    /// Reverse one cell without turning.
    #[serde(rename = "back1")]
    Back1,
    /// Quarter turn to the left.
    #[serde(rename = "turnL")]
    TurnLeft,
    /// Quarter turn to the right.
    #[serde(rename = "turnR")]
    TurnRight,
    /// Half turn.
    #[serde(rename = "uturn")]
    UTurn,
}

impl CardKind {
    /// Every card kind in a stable order.
    pub const ALL: [CardKind; 6] = [
        CardKind::Move1,
        CardKind::Move2,
        CardKind::Back1,
        CardKind::TurnLeft,
        CardKind::TurnRight,
        CardKind::UTurn,
    ];

    /// Short identifier used in definitions and on the command line.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Move1 => "move1",
            Self::Move2 => "move2",
            Self::Back1 => "back1",
            Self::TurnLeft => "turnL",
            Self::TurnRight => "turnR",
            Self::UTurn => "uturn",
        }
    }

    /// Text printed on the card face.
    #[must_use]
    pub const fn display_text(self) -> &'static str {
        match self {
            Self::Move1 => "Move 1",
            Self::Move2 => "Move 2",
            Self::Back1 => "Back 1",
            Self::TurnLeft => "Turn Left",
            Self::TurnRight => "Turn Right",
            Self::UTurn => "U-Turn",
        }
    }
}

impl FromStr for CardKind {
    type Err = ParseCardKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(value))
            .ok_or_else(|| ParseCardKindError(value.to_owned()))
    }
}

/// Reports a card code that does not name any [`CardKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCardKindError(String);

impl fmt::Display for ParseCardKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown card kind `{}`", self.0)
    }
}

impl std::error::Error for ParseCardKindError {}

/// Unique identifier assigned to a physical card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(u32);

impl CardId {
    /// Creates a new card identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// A single program card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    kind: CardKind,
}

impl Card {
    /// Creates a card instance.
    #[must_use]
    pub const fn new(id: CardId, kind: CardKind) -> Self {
        Self { id, kind }
    }

    /// Identifier of the card instance.
    #[must_use]
    pub const fn id(&self) -> CardId {
        self.id
    }

    /// Instruction printed on the card.
    #[must_use]
    pub const fn kind(&self) -> CardKind {
        self.kind
    }

    /// Text printed on the card face.
    #[must_use]
    pub const fn display_text(&self) -> &'static str {
        self.kind.display_text()
    }
}

/// How a finished match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Every checkpoint was reached in order.
    Won,
    /// The robot ran out of lives.
    Lost,
}

impl GameOutcome {
    /// Reports whether the match was won.
    #[must_use]
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Won)
    }
}

/// Notifications describing each committed state change.
///
/// Exactly one event is emitted per logical change so that presentation
/// layers can key their redraws off individual events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// The robot occupies a new cell.
    RobotMoved {
        /// Cell occupied after the move.
        cell: CellCoord,
        /// Facing after the move.
        orientation: Direction,
    },
    /// The robot changed its facing without moving.
    RobotTurned {
        /// Cell occupied by the robot.
        cell: CellCoord,
        /// Facing after the turn.
        orientation: Direction,
    },
    /// The robot's health changed.
    HealthChanged {
        /// Health after the change.
        health: u8,
        /// Health restored by a full repair.
        max_health: u8,
    },
    /// The robot's remaining lives changed.
    LivesChanged {
        /// Lives remaining after the change.
        lives: u8,
    },
    /// The robot visited a repair station or checkpoint.
    FlagVisited {
        /// Cell of the visited flag, now the respawn anchor.
        flag: CellCoord,
        /// Highest checkpoint order reached in sequence.
        highest_order: u32,
    },
    /// The robot entered or left the powered-down state.
    PowerStateChanged {
        /// Whether the robot is powered down after the change.
        powered_down: bool,
    },
    /// The match finished.
    GameOver {
        /// Whether the match was won.
        won: bool,
    },
    /// A turn's program finished executing and its registers were cleared.
    ProgramFinished,
}

/// Source of program cards consumed by the program executor.
///
/// Implementations own the deck, hand and discard bookkeeping; the engine only
/// relies on each card's [`CardKind`].
pub trait CardSupply {
    /// Moves up to `count` cards into the hand and returns them.
    fn draw_cards(&mut self, count: usize) -> Vec<Card>;

    /// Moves the identified cards from the hand to the discard pile.
    ///
    /// Identifiers that are not currently in the hand are ignored.
    fn discard(&mut self, ids: &[CardId]);

    /// Looks up a card instance by identifier.
    fn card(&self, id: CardId) -> Option<Card>;
}
