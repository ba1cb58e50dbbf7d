#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Factory Floor.
//!
//! The [`Board`] is built once from a [`BoardDefinition`] (or a
//! [`BoardBuilder`]) and never changes afterwards. The [`Robot`] is the only
//! moving piece; systems mutate it exclusively through its methods, each of
//! which reports its change as an event.

mod board;
mod definition;
mod error;
mod robot;
mod tile;

pub use board::{Board, BoardBuilder, MoveTarget};
pub use definition::{
    BoardDefinition, FloorDefinition, RawNumber, TileDefinition, WallDeviceDefinition,
    SUPPORTED_DEFINITION_VERSION,
};
pub use error::{BoardError, DefinitionError, ProgramError, RespawnError, TileError};
pub use robot::{Damage, Heading, LifeLoss, Robot, RobotConfig, RobotState};
pub use tile::{ActiveSteps, ConveyorSpeed, DeviceMove, FloorDevice, Tile, WallDevice, Walls};
