#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Environmental effect resolution applied after every program step.
//!
//! Phases run in a fixed order and each one re-reads the robot's current
//! tile, since earlier phases may have moved it:
//!
//! 1. express conveyors,
//! 2. all conveyors,
//! 3. push panels active on the current step,
//! 4. gears,
//! 5. lasers,
//! 6. repair station and checkpoint arrival,
//! 7. holes.
//!
//! Once a phase ends the match, no later phase runs.

use factory_floor_core::{Event, GameOutcome, ProgramStep};
use factory_floor_world::{Board, Damage, DeviceMove, Robot};
use tracing::{debug, info, warn};

/// Aggregate result of one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// How the match ended, if it did.
    pub outcome: Option<GameOutcome>,
    /// Whether any phase moved or rotated the robot.
    pub any_moved: bool,
    /// Whether the robot fell into a hole.
    pub fell_in_hole: bool,
}

impl Resolution {
    /// Reports whether the match ended during this run.
    #[must_use]
    pub const fn game_ended(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Pure system that applies board devices to the robot.
#[derive(Clone, Copy, Debug, Default)]
pub struct EffectPipeline;

impl EffectPipeline {
    /// Creates the pipeline.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs every phase once for the program `step` that just executed.
    pub fn resolve(
        &self,
        board: &Board,
        robot: &mut Robot,
        step: ProgramStep,
        out_events: &mut Vec<Event>,
    ) -> Resolution {
        let mut resolution = Resolution::default();

        if robot.is_destroyed() {
            resolution.outcome = Some(GameOutcome::Lost);
            return resolution;
        }

        resolution.any_moved |= convey(board, robot, true, out_events);
        resolution.any_moved |= convey(board, robot, false, out_events);
        resolution.any_moved |= push(board, robot, step, out_events);
        resolution.any_moved |= rotate(board, robot, out_events);

        let lasers = fire_lasers(board, robot, out_events);
        resolution.any_moved |= lasers.moved;
        if let Some(outcome) = lasers.outcome {
            return end_game(resolution, outcome, out_events);
        }

        if let Some(outcome) = arrive(board, robot, out_events) {
            return end_game(resolution, outcome, out_events);
        }

        let hole = fall(board, robot, out_events);
        resolution.any_moved |= hole.moved;
        resolution.fell_in_hole = hole.fell;
        if let Some(outcome) = hole.outcome {
            return end_game(resolution, outcome, out_events);
        }

        resolution
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct PhaseResult {
    moved: bool,
    fell: bool,
    outcome: Option<GameOutcome>,
}

fn end_game(
    mut resolution: Resolution,
    outcome: GameOutcome,
    out_events: &mut Vec<Event>,
) -> Resolution {
    info!(won = outcome.is_win(), "match finished");
    resolution.outcome = Some(outcome);
    out_events.push(Event::GameOver {
        won: outcome.is_win(),
    });
    resolution
}

fn convey(board: &Board, robot: &mut Robot, express_only: bool, out_events: &mut Vec<Event>) -> bool {
    let Some(tile) = board.tile(robot.cell()) else {
        return false;
    };
    commit(tile.try_conveyor(board, express_only), robot, out_events)
}

fn push(board: &Board, robot: &mut Robot, step: ProgramStep, out_events: &mut Vec<Event>) -> bool {
    let Some(tile) = board.tile(robot.cell()) else {
        return false;
    };
    commit(tile.try_pusher(board, step), robot, out_events)
}

fn rotate(board: &Board, robot: &mut Robot, out_events: &mut Vec<Event>) -> bool {
    let Some(rotation) = board.tile(robot.cell()).and_then(|tile| tile.gear_rotation()) else {
        return false;
    };
    robot.turn(rotation, out_events);
    true
}

fn commit(device_move: DeviceMove, robot: &mut Robot, out_events: &mut Vec<Event>) -> bool {
    match device_move {
        DeviceMove::Moved(cell) => {
            robot.move_to(cell, out_events);
            true
        }
        DeviceMove::Blocked => {
            debug!(
                column = robot.cell().column(),
                row = robot.cell().row(),
                "device push blocked"
            );
            false
        }
        DeviceMove::Idle => false,
    }
}

fn fire_lasers(board: &Board, robot: &mut Robot, out_events: &mut Vec<Event>) -> PhaseResult {
    let mut result = PhaseResult::default();

    for (emitter, direction) in board.laser_emitters() {
        let position = robot.cell();
        let hit = emitter == position
            || board
                .trace_laser_path(emitter, direction, Some(position))
                .contains(&position);
        if !hit {
            continue;
        }

        debug!(
            column = emitter.column(),
            row = emitter.row(),
            %direction,
            "laser hit robot"
        );
        match robot.take_damage(out_events) {
            Damage::Survived => {}
            Damage::LifeLost => result.moved |= respawn(robot, out_events),
            Damage::Destroyed => {
                result.outcome = Some(GameOutcome::Lost);
                return result;
            }
        }
    }

    result
}

fn arrive(board: &Board, robot: &mut Robot, out_events: &mut Vec<Event>) -> Option<GameOutcome> {
    let tile = board.tile(robot.cell())?;
    if tile.is_repair_station() {
        robot.visit_station(tile.cell(), out_events);
        return None;
    }

    let order = tile.checkpoint_order()?;
    let advanced = robot.visit_flag(tile.cell(), Some(order), out_events);
    let total = board.total_checkpoints();
    (advanced && total > 0 && robot.highest_checkpoint() == total).then_some(GameOutcome::Won)
}

fn fall(board: &Board, robot: &mut Robot, out_events: &mut Vec<Event>) -> PhaseResult {
    let mut result = PhaseResult::default();
    if !board.tile(robot.cell()).is_some_and(|tile| tile.is_hole()) {
        return result;
    }

    result.fell = true;
    match robot.take_damage(out_events) {
        Damage::Destroyed => result.outcome = Some(GameOutcome::Lost),
        Damage::Survived | Damage::LifeLost => result.moved = respawn(robot, out_events),
    }
    result
}

fn respawn(robot: &mut Robot, out_events: &mut Vec<Event>) -> bool {
    let from = robot.cell();
    match robot.respawn(out_events) {
        Ok(anchor) => anchor != from,
        Err(error) => {
            warn!(
                %error,
                column = robot.cell().column(),
                row = robot.cell().row(),
                "robot left in place"
            );
            false
        }
    }
}
