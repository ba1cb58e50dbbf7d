//! Serialisable board definitions and their conversion into validated boards.
//!
//! Definitions are deliberately loose: fields are read as strings and raw
//! numbers so that a malformed board is reported with a precise
//! [`DefinitionError`] rather than a generic deserialisation failure.

use std::fmt;

use factory_floor_core::{CellCoord, Direction, ProgramStep, Rotation};
use serde::{Deserialize, Serialize};

use crate::{
    board::Board,
    error::{BoardError, DefinitionError},
    tile::{ActiveSteps, ConveyorSpeed, FloorDevice, Tile, WallDevice, Walls},
};

/// Board definition format version understood by this crate.
pub const SUPPORTED_DEFINITION_VERSION: u32 = 1;

/// Static description of a board as loaded from disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardDefinition {
    /// Definition format version.
    pub version: u32,
    /// Tile descriptions, one inner list per row from north to south.
    pub rows: Vec<Vec<TileDefinition>>,
}

/// Description of a single tile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileDefinition {
    /// Sides carrying a wall.
    #[serde(default)]
    pub walls: Vec<String>,
    /// Floor device; plain floor when omitted.
    #[serde(default, rename = "floorDevice", alias = "floor")]
    pub floor: Option<FloorDefinition>,
    /// Devices mounted on the tile's walls.
    #[serde(default, rename = "wallDevices", alias = "wall_devices")]
    pub wall_devices: Vec<WallDeviceDefinition>,
}

/// Description of a floor device.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloorDefinition {
    /// Device type: `none`, `hole`, `repair-station`, `checkpoint`,
    /// `conveyor` or `gear`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Conveyor direction, or `cw`/`ccw` for gears.
    pub direction: Option<String>,
    /// Conveyor speed.
    pub speed: Option<RawNumber>,
    /// Checkpoint order.
    pub order: Option<RawNumber>,
}

/// Description of a wall-mounted device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WallDeviceDefinition {
    /// Device type: `laser` or `pusher`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Direction the device fires or pushes toward.
    pub direction: String,
    /// Program steps on which a pusher fires.
    #[serde(default)]
    pub steps: Option<Vec<RawNumber>>,
}

/// Number-like value accepted from definitions before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// Quoted value.
    Text(String),
}

impl RawNumber {
    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Float(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "`{value}`"),
        }
    }
}

impl BoardDefinition {
    /// Wraps a bare grid of tiles as a definition of the supported version.
    #[must_use]
    pub fn from_grid(rows: Vec<Vec<TileDefinition>>) -> Self {
        Self {
            version: SUPPORTED_DEFINITION_VERSION,
            rows,
        }
    }

    /// Validates the definition and builds the board it describes.
    ///
    /// The first problem found rejects the whole board.
    pub fn build(&self) -> Result<Board, BoardError> {
        if self.version != SUPPORTED_DEFINITION_VERSION {
            return Err(BoardError::UnsupportedVersion {
                found: self.version,
                expected: SUPPORTED_DEFINITION_VERSION,
            });
        }

        let width = self.rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(BoardError::Empty);
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        for (row_index, row) in self.rows.iter().enumerate() {
            let row_u32 = u32::try_from(row_index).unwrap_or(u32::MAX);
            if row.len() != width {
                return Err(BoardError::RaggedRow {
                    row: row_u32,
                    expected: u32::try_from(width).unwrap_or(u32::MAX),
                    found: u32::try_from(row.len()).unwrap_or(u32::MAX),
                });
            }

            let mut tiles = Vec::with_capacity(width);
            for (column_index, definition) in row.iter().enumerate() {
                let cell = CellCoord::new(u32::try_from(column_index).unwrap_or(u32::MAX), row_u32);
                tiles.push(definition.build(cell)?);
            }
            rows.push(tiles);
        }

        Board::from_rows(rows)
    }
}

impl TileDefinition {
    /// Validates the definition and builds the tile located at `cell`.
    pub fn build(&self, cell: CellCoord) -> Result<Tile, BoardError> {
        let definition_error = |source| BoardError::Definition { cell, source };

        let walls = self
            .walls
            .iter()
            .map(|side| {
                side.parse::<Direction>()
                    .map_err(|_| DefinitionError::InvalidWallSide(side.clone()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(definition_error)?;

        let floor = match &self.floor {
            Some(floor) => floor.parse().map_err(definition_error)?,
            None => FloorDevice::None,
        };

        let wall_devices = self
            .wall_devices
            .iter()
            .map(WallDeviceDefinition::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(definition_error)?;

        Tile::new(cell, Walls::from_sides(walls), floor, wall_devices)
            .map_err(|source| BoardError::Tile { cell, source })
    }
}

impl FloorDefinition {
    fn parse(&self) -> Result<FloorDevice, DefinitionError> {
        let kind = self
            .kind
            .as_deref()
            .ok_or(DefinitionError::MissingFloorType)?;

        match kind {
            "none" => Ok(FloorDevice::None),
            "hole" => Ok(FloorDevice::Hole),
            "repair-station" => Ok(FloorDevice::RepairStation),
            "checkpoint" => {
                let order = self
                    .order
                    .as_ref()
                    .and_then(RawNumber::as_integer)
                    .filter(|order| *order >= 1)
                    .and_then(|order| u32::try_from(order).ok())
                    .ok_or_else(|| {
                        DefinitionError::InvalidCheckpointOrder(describe(self.order.as_ref()))
                    })?;
                Ok(FloorDevice::Checkpoint { order })
            }
            "conveyor" => {
                let direction = parse_direction("conveyor", self.direction.as_deref())?;
                let speed = self
                    .speed
                    .as_ref()
                    .and_then(RawNumber::as_integer)
                    .and_then(ConveyorSpeed::from_cells)
                    .ok_or_else(|| {
                        DefinitionError::InvalidConveyorSpeed(describe(self.speed.as_ref()))
                    })?;
                Ok(FloorDevice::Conveyor { direction, speed })
            }
            "gear" => {
                let rotation = match self.direction.as_deref() {
                    Some("cw") => Rotation::Clockwise,
                    Some("ccw") => Rotation::CounterClockwise,
                    other => {
                        return Err(DefinitionError::InvalidGearDirection(describe_text(other)))
                    }
                };
                Ok(FloorDevice::Gear { rotation })
            }
            other => Err(DefinitionError::UnknownFloorType(other.to_owned())),
        }
    }
}

impl WallDeviceDefinition {
    fn parse(&self) -> Result<WallDevice, DefinitionError> {
        match self.kind.as_str() {
            "laser" => Ok(WallDevice::Laser {
                direction: parse_direction("laser", Some(&self.direction))?,
            }),
            "pusher" => {
                let direction = parse_direction("pusher", Some(&self.direction))?;
                let steps = self
                    .steps
                    .iter()
                    .flatten()
                    .map(|raw| {
                        raw.as_integer()
                            .and_then(|value| u8::try_from(value).ok())
                            .and_then(ProgramStep::new)
                            .ok_or_else(|| DefinitionError::InvalidPusherStep(raw.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(WallDevice::Pusher {
                    direction,
                    active_steps: ActiveSteps::from_steps(steps),
                })
            }
            other => Err(DefinitionError::UnknownWallDeviceType(other.to_owned())),
        }
    }
}

fn parse_direction(device: &'static str, value: Option<&str>) -> Result<Direction, DefinitionError> {
    value
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| DefinitionError::InvalidDirection {
            device,
            value: describe_text(value),
        })
}

fn describe(value: Option<&RawNumber>) -> String {
    value.map_or_else(|| "(missing)".to_owned(), ToString::to_string)
}

fn describe_text(value: Option<&str>) -> String {
    value.map_or_else(|| "(missing)".to_owned(), |text| format!("`{text}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TileError;

    fn floor(kind: &str) -> FloorDefinition {
        FloorDefinition {
            kind: Some(kind.to_owned()),
            ..FloorDefinition::default()
        }
    }

    fn single(tile: TileDefinition) -> BoardDefinition {
        BoardDefinition::from_grid(vec![vec![tile, TileDefinition::default()]])
    }

    fn first_error(tile: TileDefinition) -> BoardError {
        single(tile).build().unwrap_err()
    }

    #[test]
    fn builds_devices_from_definitions() {
        let definition = BoardDefinition {
            version: 1,
            rows: vec![vec![
                TileDefinition {
                    walls: vec!["west".to_owned()],
                    floor: Some(FloorDefinition {
                        direction: Some("east".to_owned()),
                        speed: Some(RawNumber::Integer(2)),
                        ..floor("conveyor")
                    }),
                    wall_devices: vec![WallDeviceDefinition {
                        kind: "pusher".to_owned(),
                        direction: "east".to_owned(),
                        steps: Some(vec![RawNumber::Integer(1), RawNumber::Integer(3)]),
                    }],
                },
                TileDefinition {
                    floor: Some(FloorDefinition {
                        order: Some(RawNumber::Integer(1)),
                        ..floor("checkpoint")
                    }),
                    ..TileDefinition::default()
                },
            ]],
        };

        let board = definition.build().expect("valid board");
        let conveyor = board.tile(CellCoord::new(0, 0)).expect("tile");
        assert_eq!(
            conveyor.floor(),
            FloorDevice::Conveyor {
                direction: Direction::East,
                speed: ConveyorSpeed::Express
            }
        );
        assert_eq!(board.total_checkpoints(), 1);
        assert_eq!(board.flags(), &[CellCoord::new(1, 0)]);
    }

    #[test]
    fn rejects_ragged_rows() {
        let definition = BoardDefinition {
            version: 1,
            rows: vec![
                vec![TileDefinition::default(), TileDefinition::default()],
                vec![TileDefinition::default()],
            ],
        };

        assert_eq!(
            definition.build().unwrap_err(),
            BoardError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn rejects_unsupported_versions() {
        let definition = BoardDefinition {
            version: 7,
            rows: vec![vec![TileDefinition::default()]],
        };
        assert!(matches!(
            definition.build(),
            Err(BoardError::UnsupportedVersion { found: 7, .. })
        ));
    }

    #[test]
    fn rejects_missing_and_unknown_floor_types() {
        let missing = first_error(TileDefinition {
            floor: Some(FloorDefinition::default()),
            ..TileDefinition::default()
        });
        assert_eq!(
            missing,
            BoardError::Definition {
                cell: CellCoord::new(0, 0),
                source: DefinitionError::MissingFloorType
            }
        );

        let unknown = first_error(TileDefinition {
            floor: Some(floor("lava")),
            ..TileDefinition::default()
        });
        assert_eq!(
            unknown,
            BoardError::Definition {
                cell: CellCoord::new(0, 0),
                source: DefinitionError::UnknownFloorType("lava".to_owned())
            }
        );
    }

    #[test]
    fn rejects_invalid_gear_direction() {
        let error = first_error(TileDefinition {
            floor: Some(FloorDefinition {
                direction: Some("left".to_owned()),
                ..floor("gear")
            }),
            ..TileDefinition::default()
        });
        assert!(matches!(
            error,
            BoardError::Definition {
                source: DefinitionError::InvalidGearDirection(_),
                ..
            }
        ));
    }

    #[test]
    fn rejects_invalid_conveyor_speed_and_direction() {
        let speed = first_error(TileDefinition {
            floor: Some(FloorDefinition {
                direction: Some("north".to_owned()),
                speed: Some(RawNumber::Integer(3)),
                ..floor("conveyor")
            }),
            ..TileDefinition::default()
        });
        assert!(matches!(
            speed,
            BoardError::Definition {
                source: DefinitionError::InvalidConveyorSpeed(_),
                ..
            }
        ));

        let direction = first_error(TileDefinition {
            floor: Some(FloorDefinition {
                direction: Some("up".to_owned()),
                speed: Some(RawNumber::Integer(1)),
                ..floor("conveyor")
            }),
            ..TileDefinition::default()
        });
        assert!(matches!(
            direction,
            BoardError::Definition {
                source: DefinitionError::InvalidDirection {
                    device: "conveyor",
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_positive_and_non_numeric_checkpoint_orders() {
        for order in [
            RawNumber::Integer(0),
            RawNumber::Integer(-2),
            RawNumber::Float(1.5),
            RawNumber::Text("first".to_owned()),
        ] {
            let error = first_error(TileDefinition {
                floor: Some(FloorDefinition {
                    order: Some(order),
                    ..floor("checkpoint")
                }),
                ..TileDefinition::default()
            });
            assert!(
                matches!(
                    error,
                    BoardError::Definition {
                        source: DefinitionError::InvalidCheckpointOrder(_),
                        ..
                    }
                ),
                "unexpected error {error:?}"
            );
        }
    }

    #[test]
    fn rejects_laser_without_supporting_wall() {
        let error = first_error(TileDefinition {
            walls: vec!["east".to_owned()],
            wall_devices: vec![WallDeviceDefinition {
                kind: "laser".to_owned(),
                direction: "north".to_owned(),
                steps: None,
            }],
            ..TileDefinition::default()
        });

        assert_eq!(
            error,
            BoardError::Tile {
                cell: CellCoord::new(0, 0),
                source: TileError::UnmountedDevice {
                    device: "laser",
                    direction: Direction::North,
                    mount: Direction::South,
                }
            }
        );
    }

    #[test]
    fn rejects_pusher_with_empty_steps() {
        let error = first_error(TileDefinition {
            walls: vec!["north".to_owned()],
            wall_devices: vec![WallDeviceDefinition {
                kind: "pusher".to_owned(),
                direction: "south".to_owned(),
                steps: Some(Vec::new()),
            }],
            ..TileDefinition::default()
        });

        assert!(matches!(
            error,
            BoardError::Tile {
                source: TileError::InactivePusher { .. },
                ..
            }
        ));
    }

    #[test]
    fn rejects_pusher_steps_outside_the_program() {
        let error = first_error(TileDefinition {
            walls: vec!["north".to_owned()],
            wall_devices: vec![WallDeviceDefinition {
                kind: "pusher".to_owned(),
                direction: "south".to_owned(),
                steps: Some(vec![RawNumber::Integer(6)]),
            }],
            ..TileDefinition::default()
        });

        assert_eq!(
            error,
            BoardError::Definition {
                cell: CellCoord::new(0, 0),
                source: DefinitionError::InvalidPusherStep("6".to_owned())
            }
        );
    }

    #[test]
    fn rejects_unknown_wall_sides() {
        let error = first_error(TileDefinition {
            walls: vec!["up".to_owned()],
            ..TileDefinition::default()
        });
        assert_eq!(
            error,
            BoardError::Definition {
                cell: CellCoord::new(0, 0),
                source: DefinitionError::InvalidWallSide("up".to_owned())
            }
        );
    }
}
