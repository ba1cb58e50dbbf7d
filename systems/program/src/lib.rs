#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Executes a robot's five-register program for one turn.
//!
//! Every register is resolved even when it holds no card: the card action is
//! skipped but board effects still run. A powered-down robot skips all card
//! actions for the turn.

use factory_floor_core::{
    Card, CardId, CardKind, CardSupply, Event, GameOutcome, ProgramStep, Rotation,
};
use factory_floor_system_effects::EffectPipeline;
use factory_floor_world::{Board, Heading, Robot};
use tracing::{debug, info};

/// Summary of one executed turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// How the match ended, if it ended during the turn.
    pub outcome: Option<GameOutcome>,
    /// Number of registers whose effects were resolved.
    pub steps_resolved: usize,
    /// Cards whose actions were executed and then discarded.
    pub discarded: Vec<CardId>,
    /// Replacement cards drawn from the supply.
    pub drawn: Vec<Card>,
}

impl TurnReport {
    /// Reports whether the match ended during the turn.
    #[must_use]
    pub const fn game_ended(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Pure system that runs programs through the effect pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgramExecutor {
    pipeline: EffectPipeline,
}

impl ProgramExecutor {
    /// Creates an executor backed by the standard effect pipeline.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pipeline: EffectPipeline::new(),
        }
    }

    /// Executes the robot's loaded program.
    ///
    /// Used cards are discarded to `supply`. When the match continues, as
    /// many replacement cards as were used are drawn. End-of-turn cleanup
    /// always runs and [`Event::ProgramFinished`] is emitted last.
    pub fn execute_turn<S>(
        &self,
        board: &Board,
        robot: &mut Robot,
        supply: &mut S,
        out_events: &mut Vec<Event>,
    ) -> TurnReport
    where
        S: CardSupply + ?Sized,
    {
        let mut report = TurnReport::default();
        let program = robot.program().to_vec();
        let powered_down = robot.is_powered_down();
        if powered_down {
            info!("robot powered down, skipping card actions");
        }

        for step in ProgramStep::all() {
            let card = if powered_down {
                None
            } else {
                program.get(step.index()).and_then(|id| supply.card(*id))
            };

            if let Some(card) = card {
                debug!(step = step.get(), card = card.kind().code(), "executing card");
                perform(card.kind(), board, robot, out_events);
                report.discarded.push(card.id());
            }

            let resolution = self.pipeline.resolve(board, robot, step, out_events);
            report.steps_resolved += 1;
            if resolution.game_ended() {
                report.outcome = resolution.outcome;
                break;
            }
        }

        supply.discard(&report.discarded);
        if !report.game_ended() {
            report.drawn = supply.draw_cards(report.discarded.len());
        }

        robot.end_of_turn_cleanup(out_events);
        out_events.push(Event::ProgramFinished);
        report
    }
}

fn perform(kind: CardKind, board: &Board, robot: &mut Robot, out_events: &mut Vec<Event>) {
    match kind {
        CardKind::Move1 => {
            let _ = step(Heading::Forward, board, robot, out_events);
        }
        CardKind::Move2 => {
            if step(Heading::Forward, board, robot, out_events) {
                let _ = step(Heading::Forward, board, robot, out_events);
            }
        }
        CardKind::Back1 => {
            let _ = step(Heading::Backward, board, robot, out_events);
        }
        CardKind::TurnLeft => robot.turn(Rotation::CounterClockwise, out_events),
        CardKind::TurnRight => robot.turn(Rotation::Clockwise, out_events),
        CardKind::UTurn => robot.u_turn(out_events),
    }
}

fn step(heading: Heading, board: &Board, robot: &mut Robot, out_events: &mut Vec<Event>) -> bool {
    let target = robot.calculate_move_target(heading, board);
    match target.target {
        Some(cell) if target.allowed => {
            debug_assert!(board.contains(cell), "move target {cell} is off the board");
            robot.move_to(cell, out_events);
            true
        }
        _ => {
            debug!(
                column = robot.cell().column(),
                row = robot.cell().row(),
                blocked_by_wall = target.blocked_by_wall,
                "move blocked"
            );
            false
        }
    }
}
