//! The single simulated robot and its movement and damage state machine.
//!
//! Every mutation goes through a method that appends the matching [`Event`]
//! to the caller's buffer, so presentation layers observe each committed
//! change exactly once.

use factory_floor_core::{
    CardId, CellCoord, Direction, Event, Rotation, MAX_HEALTH, PROGRAM_SIZE, STARTING_LIVES,
};
use tracing::info;

use crate::{
    board::{Board, MoveTarget},
    error::{ProgramError, RespawnError},
};

/// Tunable robot parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobotConfig {
    /// Health restored by a full repair.
    pub max_health: u8,
    /// Lives available at the start of the match.
    pub lives: u8,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            max_health: MAX_HEALTH,
            lives: STARTING_LIVES,
        }
    }
}

/// Lifecycle state of the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RobotState {
    /// Executing programs normally.
    Active,
    /// Skipping card actions for one turn.
    PoweredDown,
    /// Out of lives; terminal.
    Destroyed,
}

/// Whether a move follows or opposes the robot's facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    /// Move toward the facing direction.
    Forward,
    /// Move away from the facing direction without turning.
    Backward,
}

/// Result of a single point of damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub enum Damage {
    /// Health remained above zero.
    Survived,
    /// Health reached zero, a life was lost and health was restored.
    LifeLost,
    /// Health reached zero with no lives left.
    Destroyed,
}

/// Result of losing a life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub enum LifeLoss {
    /// Lives remain; the caller must relocate the robot to its anchor.
    Respawning,
    /// No lives remain; the match is lost.
    Destroyed,
}

/// Mutable state of the robot being programmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Robot {
    cell: CellCoord,
    orientation: Direction,
    health: u8,
    max_health: u8,
    lives: u8,
    respawn_anchor: Option<CellCoord>,
    highest_checkpoint: u32,
    program: Vec<CardId>,
    state: RobotState,
    power_down_requested: bool,
}

impl Robot {
    /// Places a fully repaired robot on `cell` facing `orientation`.
    ///
    /// The robot starts without a respawn anchor; see
    /// [`Robot::with_respawn_anchor`].
    #[must_use]
    pub fn new(cell: CellCoord, orientation: Direction, config: RobotConfig) -> Self {
        Self {
            cell,
            orientation,
            health: config.max_health,
            max_health: config.max_health,
            lives: config.lives,
            respawn_anchor: None,
            highest_checkpoint: 0,
            program: Vec::with_capacity(PROGRAM_SIZE),
            state: RobotState::Active,
            power_down_requested: false,
        }
    }

    /// Records an initial respawn anchor, typically the starting dock.
    #[must_use]
    pub fn with_respawn_anchor(mut self, anchor: CellCoord) -> Self {
        self.respawn_anchor = Some(anchor);
        self
    }

    /// Cell currently occupied.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Current facing.
    #[must_use]
    pub const fn orientation(&self) -> Direction {
        self.orientation
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u8 {
        self.health
    }

    /// Health restored by a full repair.
    #[must_use]
    pub const fn max_health(&self) -> u8 {
        self.max_health
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u8 {
        self.lives
    }

    /// Cell the robot returns to after losing a life or falling into a pit.
    #[must_use]
    pub const fn respawn_anchor(&self) -> Option<CellCoord> {
        self.respawn_anchor
    }

    /// Highest checkpoint order reached in sequence.
    #[must_use]
    pub const fn highest_checkpoint(&self) -> u32 {
        self.highest_checkpoint
    }

    /// Cards loaded into the program registers.
    #[must_use]
    pub fn program(&self) -> &[CardId] {
        &self.program
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RobotState {
        self.state
    }

    /// Reports whether the robot is out of lives.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        matches!(self.state, RobotState::Destroyed)
    }

    /// Reports whether the robot skips card actions this turn.
    #[must_use]
    pub const fn is_powered_down(&self) -> bool {
        matches!(self.state, RobotState::PoweredDown)
    }

    /// Reports whether the robot will power down at the end of the turn.
    #[must_use]
    pub const fn power_down_requested(&self) -> bool {
        self.power_down_requested
    }

    /// Computes where a single step would take the robot without moving it.
    #[must_use]
    pub fn calculate_move_target(&self, heading: Heading, board: &Board) -> MoveTarget {
        let direction = match heading {
            Heading::Forward => self.orientation,
            Heading::Backward => self.orientation.opposite(),
        };
        board.step_target(self.cell, direction)
    }

    /// Turns a quarter turn in place.
    pub fn turn(&mut self, rotation: Rotation, out_events: &mut Vec<Event>) {
        self.face(self.orientation.rotated(rotation), out_events);
    }

    /// Turns around in place.
    pub fn u_turn(&mut self, out_events: &mut Vec<Event>) {
        self.face(self.orientation.opposite(), out_events);
    }

    /// Moves the robot to `cell` without any wall checks.
    ///
    /// Callers are expected to have validated the destination through
    /// [`Robot::calculate_move_target`] or a device.
    pub fn move_to(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.cell = cell;
        out_events.push(Event::RobotMoved {
            cell,
            orientation: self.orientation,
        });
    }

    /// Applies one point of damage, losing a life when health runs out.
    pub fn take_damage(&mut self, out_events: &mut Vec<Event>) -> Damage {
        if self.is_destroyed() {
            return Damage::Destroyed;
        }

        self.health = self.health.saturating_sub(1);
        out_events.push(Event::HealthChanged {
            health: self.health,
            max_health: self.max_health,
        });

        if self.health > 0 {
            return Damage::Survived;
        }

        match self.lose_life(out_events) {
            LifeLoss::Respawning => Damage::LifeLost,
            LifeLoss::Destroyed => Damage::Destroyed,
        }
    }

    /// Loses one life.
    ///
    /// With lives remaining, health is restored; relocating the robot to its
    /// anchor is left to the caller.
    pub fn lose_life(&mut self, out_events: &mut Vec<Event>) -> LifeLoss {
        if self.is_destroyed() {
            return LifeLoss::Destroyed;
        }

        self.lives = self.lives.saturating_sub(1);
        out_events.push(Event::LivesChanged { lives: self.lives });
        info!(lives = self.lives, "robot lost a life");

        if self.lives == 0 {
            self.state = RobotState::Destroyed;
            return LifeLoss::Destroyed;
        }

        self.restore_health(out_events);
        LifeLoss::Respawning
    }

    /// Records a repair station visit: anchors and repairs the robot.
    pub fn visit_station(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let _ = self.visit_flag(cell, None, out_events);
    }

    /// Records a flag visit and reports whether checkpoint progress advanced.
    ///
    /// The flag always becomes the respawn anchor and the robot is always
    /// repaired; progress only advances when `order` is the next checkpoint in
    /// sequence.
    pub fn visit_flag(
        &mut self,
        cell: CellCoord,
        order: Option<u32>,
        out_events: &mut Vec<Event>,
    ) -> bool {
        self.respawn_anchor = Some(cell);
        self.restore_health(out_events);

        let advanced = order == Some(self.highest_checkpoint + 1);
        if advanced {
            self.highest_checkpoint += 1;
            info!(
                checkpoint = self.highest_checkpoint,
                column = cell.column(),
                row = cell.row(),
                "checkpoint reached"
            );
        }

        out_events.push(Event::FlagVisited {
            flag: cell,
            highest_order: self.highest_checkpoint,
        });
        advanced
    }

    /// Moves the robot to its respawn anchor.
    ///
    /// No event is emitted when the robot already stands on the anchor.
    pub fn respawn(&mut self, out_events: &mut Vec<Event>) -> Result<CellCoord, RespawnError> {
        let anchor = self.respawn_anchor.ok_or(RespawnError::NoAnchor)?;
        if anchor != self.cell {
            self.move_to(anchor, out_events);
        }
        Ok(anchor)
    }

    /// Loads cards into the program registers, replacing any previous program.
    pub fn set_program(&mut self, cards: Vec<CardId>) -> Result<(), ProgramError> {
        if cards.len() > PROGRAM_SIZE {
            return Err(ProgramError::TooManyCards {
                received: cards.len(),
            });
        }
        self.program = cards;
        Ok(())
    }

    /// Empties the program registers.
    pub fn clear_program(&mut self) {
        self.program.clear();
    }

    /// Announces that the robot will power down at the end of this turn.
    pub fn request_power_down(&mut self) {
        self.power_down_requested = true;
    }

    /// Withdraws a pending power down announcement.
    pub fn cancel_power_down(&mut self) {
        self.power_down_requested = false;
    }

    /// Resets the program registers and advances the power state.
    ///
    /// A powered-down robot always powers back up; an active robot with a
    /// pending request powers down.
    pub fn end_of_turn_cleanup(&mut self, out_events: &mut Vec<Event>) {
        self.clear_program();

        match self.state {
            RobotState::Destroyed => {}
            RobotState::PoweredDown => {
                self.state = RobotState::Active;
                out_events.push(Event::PowerStateChanged {
                    powered_down: false,
                });
            }
            RobotState::Active if self.power_down_requested => {
                self.power_down_requested = false;
                self.state = RobotState::PoweredDown;
                out_events.push(Event::PowerStateChanged { powered_down: true });
            }
            RobotState::Active => {}
        }
    }

    fn face(&mut self, orientation: Direction, out_events: &mut Vec<Event>) {
        self.orientation = orientation;
        out_events.push(Event::RobotTurned {
            cell: self.cell,
            orientation,
        });
    }

    fn restore_health(&mut self, out_events: &mut Vec<Event>) {
        if self.health == self.max_health {
            return;
        }
        self.health = self.max_health;
        out_events.push(Event::HealthChanged {
            health: self.health,
            max_health: self.max_health,
        });
    }
}
