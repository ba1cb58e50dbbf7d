//! Static tile model: walls, the floor device and wall-mounted devices.

use factory_floor_core::{CellCoord, Direction, ProgramStep, Rotation};

use crate::{board::Board, error::TileError};

/// Set of wall sides present on a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Walls(u8);

impl Walls {
    /// Tile without walls.
    pub const NONE: Walls = Walls(0);

    /// Collects the provided sides into a wall set.
    #[must_use]
    pub fn from_sides(sides: impl IntoIterator<Item = Direction>) -> Self {
        sides.into_iter().fold(Self::NONE, Self::with)
    }

    /// Returns a copy of the set with the provided side added.
    #[must_use]
    pub const fn with(self, side: Direction) -> Self {
        Self(self.0 | Self::bit(side))
    }

    /// Reports whether a wall stands on the provided side.
    #[must_use]
    pub const fn contains(self, side: Direction) -> bool {
        self.0 & Self::bit(side) != 0
    }

    const fn bit(side: Direction) -> u8 {
        match side {
            Direction::North => 0b0001,
            Direction::East => 0b0010,
            Direction::South => 0b0100,
            Direction::West => 0b1000,
        }
    }
}

/// Belt speed of a conveyor tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConveyorSpeed {
    /// Moves riders once per resolution.
    Standard,
    /// Moves riders up to twice per resolution.
    Express,
}

impl ConveyorSpeed {
    /// Converts a numeric speed, accepting only 1 and 2.
    #[must_use]
    pub const fn from_cells(cells: i64) -> Option<Self> {
        match cells {
            1 => Some(Self::Standard),
            2 => Some(Self::Express),
            _ => None,
        }
    }
}

/// The single environmental feature occupying a tile's surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FloorDevice {
    /// Plain floor.
    #[default]
    None,
    /// Pit that damages the robot and sends it back to its respawn anchor.
    Hole,
    /// Repairs the robot and records a respawn anchor.
    RepairStation,
    /// Ordered goal flag.
    Checkpoint {
        /// Position of the checkpoint in the course, starting at 1.
        order: u32,
    },
    /// Belt that carries the robot along `direction`.
    Conveyor {
        /// Direction of travel.
        direction: Direction,
        /// Belt speed.
        speed: ConveyorSpeed,
    },
    /// Turntable that rotates the robot in place.
    Gear {
        /// Sense of rotation.
        rotation: Rotation,
    },
}

/// Program steps on which a push panel fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActiveSteps(u8);

impl ActiveSteps {
    /// Collects the provided steps into a set.
    #[must_use]
    pub fn from_steps(steps: impl IntoIterator<Item = ProgramStep>) -> Self {
        Self(
            steps
                .into_iter()
                .fold(0, |mask, step| mask | (1 << step.index())),
        )
    }

    /// Reports whether the panel fires on the provided step.
    #[must_use]
    pub const fn contains(self, step: ProgramStep) -> bool {
        self.0 & (1 << step.index()) != 0
    }

    /// Reports whether the panel never fires.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the active steps in execution order.
    pub fn iter(self) -> impl Iterator<Item = ProgramStep> {
        ProgramStep::all().filter(move |step| self.contains(*step))
    }
}

/// Device mounted on one wall of a tile, acting through the opposite side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallDevice {
    /// Laser emitter firing along `direction`.
    Laser {
        /// Direction the beam travels.
        direction: Direction,
    },
    /// Push panel shoving robots along `direction` on its active steps.
    Pusher {
        /// Direction robots are pushed toward.
        direction: Direction,
        /// Program steps on which the panel fires.
        active_steps: ActiveSteps,
    },
}

impl WallDevice {
    /// Direction the device fires or pushes toward.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Laser { direction } | Self::Pusher { direction, .. } => *direction,
        }
    }

    /// Wall side the device must be mounted on.
    #[must_use]
    pub const fn mount(&self) -> Direction {
        self.direction().opposite()
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Laser { .. } => "laser",
            Self::Pusher { .. } => "push panel",
        }
    }
}

/// Result of asking a device to move the robot one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceMove {
    /// The device does not act in this phase.
    Idle,
    /// The device acted but a wall or the board edge stopped the robot.
    Blocked,
    /// The robot should be moved to the contained cell.
    Moved(CellCoord),
}

/// Immutable description of one board cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    cell: CellCoord,
    walls: Walls,
    floor: FloorDevice,
    wall_devices: Vec<WallDevice>,
}

impl Tile {
    /// Creates a tile, validating its device invariants.
    pub fn new(
        cell: CellCoord,
        walls: Walls,
        floor: FloorDevice,
        wall_devices: Vec<WallDevice>,
    ) -> Result<Self, TileError> {
        if let FloorDevice::Checkpoint { order } = floor {
            if order == 0 {
                return Err(TileError::InvalidCheckpointOrder { order });
            }
        }

        for device in &wall_devices {
            if !walls.contains(device.mount()) {
                return Err(TileError::UnmountedDevice {
                    device: device.name(),
                    direction: device.direction(),
                    mount: device.mount(),
                });
            }
            if let WallDevice::Pusher {
                direction,
                active_steps,
            } = device
            {
                if active_steps.is_empty() {
                    return Err(TileError::InactivePusher {
                        direction: *direction,
                    });
                }
            }
        }

        Ok(Self {
            cell,
            walls,
            floor,
            wall_devices,
        })
    }

    /// Plain floor tile without walls or devices.
    #[must_use]
    pub const fn plain(cell: CellCoord) -> Self {
        Self {
            cell,
            walls: Walls::NONE,
            floor: FloorDevice::None,
            wall_devices: Vec::new(),
        }
    }

    /// Cell the tile occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Reports whether a wall stands on the provided side.
    #[must_use]
    pub const fn has_wall(&self, side: Direction) -> bool {
        self.walls.contains(side)
    }

    /// Floor device occupying the tile.
    #[must_use]
    pub const fn floor(&self) -> FloorDevice {
        self.floor
    }

    /// Devices mounted on the tile's walls.
    #[must_use]
    pub fn wall_devices(&self) -> &[WallDevice] {
        &self.wall_devices
    }

    /// Directions of every laser mounted on the tile.
    pub fn lasers(&self) -> impl Iterator<Item = Direction> + '_ {
        self.wall_devices.iter().filter_map(|device| match device {
            WallDevice::Laser { direction } => Some(*direction),
            WallDevice::Pusher { .. } => None,
        })
    }

    /// Direction of the first push panel active on `step`, if any.
    #[must_use]
    pub fn active_pusher(&self, step: ProgramStep) -> Option<Direction> {
        self.wall_devices.iter().find_map(|device| match device {
            WallDevice::Pusher {
                direction,
                active_steps,
            } if active_steps.contains(step) => Some(*direction),
            _ => None,
        })
    }

    /// Computes one step of conveyor travel for a robot standing on the tile.
    ///
    /// Standard belts only participate when `express_only` is false; express
    /// belts participate in both passes.
    #[must_use]
    pub fn try_conveyor(&self, board: &Board, express_only: bool) -> DeviceMove {
        match self.floor {
            FloorDevice::Conveyor { direction, speed } => {
                if express_only && speed != ConveyorSpeed::Express {
                    return DeviceMove::Idle;
                }
                self.push_toward(board, direction)
            }
            _ => DeviceMove::Idle,
        }
    }

    /// Computes the push applied to a robot on the tile during `step`.
    #[must_use]
    pub fn try_pusher(&self, board: &Board, step: ProgramStep) -> DeviceMove {
        match self.active_pusher(step) {
            Some(direction) => self.push_toward(board, direction),
            None => DeviceMove::Idle,
        }
    }

    /// Rotation applied by a gear on the tile.
    #[must_use]
    pub const fn gear_rotation(&self) -> Option<Rotation> {
        match self.floor {
            FloorDevice::Gear { rotation } => Some(rotation),
            _ => None,
        }
    }

    /// Order of the checkpoint on the tile.
    #[must_use]
    pub const fn checkpoint_order(&self) -> Option<u32> {
        match self.floor {
            FloorDevice::Checkpoint { order } => Some(order),
            _ => None,
        }
    }

    /// Reports whether the tile holds a repair station.
    #[must_use]
    pub const fn is_repair_station(&self) -> bool {
        matches!(self.floor, FloorDevice::RepairStation)
    }

    /// Reports whether the tile is a pit.
    #[must_use]
    pub const fn is_hole(&self) -> bool {
        matches!(self.floor, FloorDevice::Hole)
    }

    fn push_toward(&self, board: &Board, direction: Direction) -> DeviceMove {
        let step = board.step_target(self.cell, direction);
        match step.target {
            Some(target) if step.allowed => DeviceMove::Moved(target),
            _ => DeviceMove::Blocked,
        }
    }
}
