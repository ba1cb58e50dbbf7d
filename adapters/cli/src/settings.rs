use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use factory_floor_core::{CellCoord, Direction, MAX_HEALTH, PROGRAM_SIZE, STARTING_LIVES};
use factory_floor_world::RobotConfig;
use serde::Deserialize;

/// Session parameters read from an optional TOML settings file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameSettings {
    /// Deck shuffle seed; a random seed is chosen when absent.
    pub(crate) seed: Option<u64>,
    /// Number of cards held in the hand.
    pub(crate) hand_size: usize,
    /// Turns played before the session stops undecided.
    pub(crate) max_turns: u32,
    /// Starting dock of the robot.
    pub(crate) start: StartDock,
    /// Initial facing of the robot.
    pub(crate) facing: Direction,
    /// Health restored by a full repair.
    pub(crate) max_health: u8,
    /// Lives available at the start of the match.
    pub(crate) lives: u8,
    /// Whether the starting dock doubles as the first respawn anchor.
    pub(crate) anchor_at_start: bool,
}

/// Board cell the robot starts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StartDock {
    pub(crate) column: u32,
    pub(crate) row: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            seed: None,
            hand_size: 9,
            max_turns: 20,
            start: StartDock { column: 0, row: 7 },
            facing: Direction::North,
            max_health: MAX_HEALTH,
            lives: STARTING_LIVES,
            anchor_at_start: true,
        }
    }
}

impl GameSettings {
    /// Loads settings from the TOML file at `path`.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }

    /// Parses and validates settings from TOML text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings that cannot drive a session.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.hand_size >= PROGRAM_SIZE,
            "hand_size {} cannot fill a {PROGRAM_SIZE}-card program",
            self.hand_size
        );
        ensure!(self.max_health > 0, "max_health must be at least 1");
        ensure!(self.lives > 0, "lives must be at least 1");
        Ok(())
    }

    /// Starting dock as a board cell.
    pub(crate) const fn start_cell(&self) -> CellCoord {
        CellCoord::new(self.start.column, self.start.row)
    }

    /// Robot parameters derived from the settings.
    pub(crate) const fn robot_config(&self) -> RobotConfig {
        RobotConfig {
            max_health: self.max_health,
            lives: self.lives,
        }
    }
}
