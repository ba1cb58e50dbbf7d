#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless factory floor match.

mod board_file;
mod render;
mod session;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use factory_floor_core::{Card, CardKind, GameOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    render::{describe_event, describe_robot, render_board},
    session::{Session, Strategy},
    settings::GameSettings,
};

/// Plays a programmed robot across a factory floor.
#[derive(Debug, Parser)]
#[command(name = "factory-floor", author, version, about, long_about = None)]
struct CliArgs {
    /// Board definition file (.toml or .json); the built-in factory when omitted.
    #[arg(long)]
    board: Option<PathBuf>,

    /// Session settings file (.toml).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Deck shuffle seed (default: settings file, then random).
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum turns to play (default: settings file, then 20).
    #[arg(short, long)]
    turns: Option<u32>,

    /// Card kinds to prefer when programming, e.g. `move1,turnR,move2`.
    #[arg(long, value_delimiter = ',')]
    program: Vec<CardKind>,

    /// Announce a power down during this turn.
    #[arg(long)]
    power_down_after: Option<u32>,

    /// Suppress per-event output.
    #[arg(short, long)]
    quiet: bool,
}

/// Entry point for the factory floor command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let mut settings = match &args.settings {
        Some(path) => GameSettings::from_path(path)?,
        None => GameSettings::default(),
    };
    if let Some(turns) = args.turns {
        settings.max_turns = turns;
    }
    let seed = args
        .seed
        .or(settings.seed)
        .unwrap_or_else(rand::random::<u64>);
    info!(seed, "starting session");

    let board = board_file::load_board(args.board.as_deref())?;
    let strategy = Strategy {
        preferences: args.program,
        power_down_after: args.power_down_after,
    };
    let mut session = Session::new(board, &settings, seed, strategy)?;

    println!("{}", render_board(session.board(), session.robot()));
    while session.is_running() {
        let log = session.play_turn()?;
        println!(
            "turn {}: [{}] resolved {} steps, drew {} cards",
            log.turn,
            program_text(&log.program),
            log.report.steps_resolved,
            log.report.drawn.len()
        );
        if !args.quiet {
            for event in &log.events {
                println!("  {}", describe_event(event));
            }
        }
    }

    println!();
    println!("{}", render_board(session.board(), session.robot()));
    println!("{}", describe_robot(session.robot()));
    let verdict = match session.outcome() {
        Some(GameOutcome::Won) => "won",
        Some(GameOutcome::Lost) => "lost",
        None => "undecided",
    };
    println!(
        "match {verdict} after {} turns (seed {seed})",
        session.turns_played()
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn program_text(program: &[Card]) -> String {
    if program.is_empty() {
        return "powered down".to_owned();
    }
    program
        .iter()
        .map(Card::display_text)
        .collect::<Vec<_>>()
        .join(", ")
}
