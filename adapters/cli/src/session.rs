use anyhow::{ensure, Result};
use factory_floor_core::{Card, CardId, CardKind, CardSupply, Event, GameOutcome, PROGRAM_SIZE};
use factory_floor_system_cards::Deck;
use factory_floor_system_program::{ProgramExecutor, TurnReport};
use factory_floor_world::{Board, Robot};
use tracing::{debug, info};

use crate::settings::GameSettings;

/// How the session picks and paces programs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Strategy {
    /// Card kinds to place first, cycled across the five registers.
    pub(crate) preferences: Vec<CardKind>,
    /// Turn during which a power down is announced.
    pub(crate) power_down_after: Option<u32>,
}

/// Everything observed while playing one turn.
#[derive(Clone, Debug)]
pub(crate) struct TurnLog {
    pub(crate) turn: u32,
    pub(crate) program: Vec<Card>,
    pub(crate) report: TurnReport,
    pub(crate) events: Vec<Event>,
}

/// A headless match on one board with one robot.
#[derive(Debug)]
pub(crate) struct Session {
    board: Board,
    robot: Robot,
    deck: Deck,
    executor: ProgramExecutor,
    strategy: Strategy,
    max_turns: u32,
    turn: u32,
    outcome: Option<GameOutcome>,
}

impl Session {
    /// Places the robot on its dock and deals the opening hand.
    pub(crate) fn new(
        board: Board,
        settings: &GameSettings,
        seed: u64,
        strategy: Strategy,
    ) -> Result<Self> {
        settings.validate()?;
        let start = settings.start_cell();
        ensure!(
            board.contains(start),
            "starting dock {start} lies outside the {}x{} board",
            board.columns(),
            board.rows()
        );

        let mut robot = Robot::new(start, settings.facing, settings.robot_config());
        if settings.anchor_at_start {
            robot = robot.with_respawn_anchor(start);
        }

        let mut deck = Deck::standard(seed);
        let hand = deck.draw_cards(settings.hand_size);
        debug!(cards = hand.len(), seed, "opening hand dealt");

        Ok(Self {
            board,
            robot,
            deck,
            executor: ProgramExecutor::new(),
            strategy,
            max_turns: settings.max_turns,
            turn: 0,
            outcome: None,
        })
    }

    pub(crate) fn board(&self) -> &Board {
        &self.board
    }

    pub(crate) fn robot(&self) -> &Robot {
        &self.robot
    }

    pub(crate) const fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub(crate) const fn turns_played(&self) -> u32 {
        self.turn
    }

    /// Reports whether another turn may be played.
    pub(crate) const fn is_running(&self) -> bool {
        self.outcome.is_none() && self.turn < self.max_turns
    }

    /// Programs the robot from the current hand and executes one turn.
    pub(crate) fn play_turn(&mut self) -> Result<TurnLog> {
        self.turn += 1;

        let program = if self.robot.is_powered_down() {
            Vec::new()
        } else {
            let hand: Vec<Card> = self.deck.hand_cards().collect();
            choose_program(&hand, &self.strategy.preferences)
        };
        self.robot
            .set_program(program.iter().map(Card::id).collect::<Vec<CardId>>())?;

        if self.strategy.power_down_after == Some(self.turn) {
            info!(turn = self.turn, "announcing power down");
            self.robot.request_power_down();
        }

        let mut events = Vec::new();
        let report =
            self.executor
                .execute_turn(&self.board, &mut self.robot, &mut self.deck, &mut events);
        if let Some(outcome) = report.outcome {
            self.outcome = Some(outcome);
        }

        Ok(TurnLog {
            turn: self.turn,
            program,
            report,
            events,
        })
    }
}

/// Fills the five registers from `hand`.
///
/// Each register takes the next preferred kind when the hand still holds one,
/// otherwise the first remaining card.
pub(crate) fn choose_program(hand: &[Card], preferences: &[CardKind]) -> Vec<Card> {
    let mut remaining = hand.to_vec();
    let mut program = Vec::with_capacity(PROGRAM_SIZE);

    for register in 0..PROGRAM_SIZE {
        if remaining.is_empty() {
            break;
        }
        let wanted = preferences.get(register % preferences.len().max(1));
        let index = wanted
            .and_then(|kind| remaining.iter().position(|card| card.kind() == *kind))
            .unwrap_or(0);
        program.push(remaining.remove(index));
    }

    program
}

#[cfg(test)]
mod tests {
    use super::*;
    use factory_floor_core::CellCoord;
    use factory_floor_world::{BoardBuilder, FloorDevice};

    fn card(id: u32, kind: CardKind) -> Card {
        Card::new(CardId::new(id), kind)
    }

    #[test]
    fn preferred_kinds_fill_registers_first() {
        let hand = [
            card(0, CardKind::TurnLeft),
            card(1, CardKind::Move1),
            card(2, CardKind::UTurn),
            card(3, CardKind::Move2),
            card(4, CardKind::Back1),
            card(5, CardKind::Move1),
        ];

        let program = choose_program(&hand, &[CardKind::Move1, CardKind::Move2]);
        let ids: Vec<u32> = program.iter().map(|card| card.id().get()).collect();

        assert_eq!(ids, vec![1, 3, 5, 0, 2]);
    }

    #[test]
    fn short_hand_yields_short_program() {
        let hand = [card(0, CardKind::Move1), card(1, CardKind::Move1)];
        assert_eq!(choose_program(&hand, &[]).len(), 2);
    }

    fn settings_at(column: u32, row: u32) -> GameSettings {
        GameSettings {
            start: crate::settings::StartDock { column, row },
            ..GameSettings::default()
        }
    }

    #[test]
    fn dock_outside_the_board_is_rejected() {
        let board = BoardBuilder::new(2, 2).build().expect("board");
        let result = Session::new(board, &settings_at(5, 0), 1, Strategy::default());
        assert!(result.is_err(), "dock must lie on the board");
    }

    #[test]
    fn sessions_replay_identically_for_a_seed() {
        let play = || {
            let board = BoardBuilder::new(5, 5)
                .floor(CellCoord::new(2, 0), FloorDevice::Checkpoint { order: 1 })
                .floor(CellCoord::new(0, 2), FloorDevice::Hole)
                .build()
                .expect("board");
            let mut session =
                Session::new(board, &settings_at(2, 4), 17, Strategy::default()).expect("session");
            let mut events = Vec::new();
            while session.is_running() {
                events.extend(session.play_turn().expect("turn").events);
            }
            (events, session.robot().clone(), session.outcome())
        };

        assert_eq!(play(), play());
    }

    #[test]
    fn power_down_skips_the_following_turn() {
        let board = BoardBuilder::new(3, 3).build().expect("board");
        let strategy = Strategy {
            preferences: Vec::new(),
            power_down_after: Some(1),
        };
        let mut session =
            Session::new(board, &settings_at(1, 1), 3, strategy).expect("session");

        let first = session.play_turn().expect("turn");
        assert_eq!(first.program.len(), PROGRAM_SIZE);
        assert!(session.robot().is_powered_down());

        let position = session.robot().cell();
        let facing = session.robot().orientation();
        let second = session.play_turn().expect("turn");
        assert!(second.program.is_empty());
        assert_eq!(session.robot().cell(), position);
        assert_eq!(session.robot().orientation(), facing);
        assert!(!session.robot().is_powered_down());
        assert_eq!(session.robot().lives(), 3);
        assert_eq!(session.turns_played(), 2);
        assert!(session.board().contains(position));
    }
}
