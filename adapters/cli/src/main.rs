#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a CPU-versus-CPU Skirmish battle.

mod scenario;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use skirmish_core::{
    BattleOutcome, Cell, Command, Event, Group, Terrain, BOARD_COLUMNS, BOARD_ROWS,
};
use skirmish_system_cpu::{Config, CpuController};
use skirmish_world::{apply, query, World};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_TURNS: u32 = 12;
const DEFAULT_SEED: u64 = 7;

/// Command-line arguments accepted by the Skirmish binary.
#[derive(Debug, Parser)]
#[command(name = "skirmish", about = "Plays a seeded CPU-versus-CPU skirmish")]
struct Cli {
    /// Scenario file to load instead of the built-in battle.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// Maximum number of turns to play.
    #[arg(long)]
    turns: Option<u32>,
    /// Seed for both CPU controllers.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of recorded turns to undo after the battle.
    #[arg(long, default_value_t = 0)]
    rewind: u32,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let loaded = scenario::load(cli.scenario.as_deref())?;
    let turns = cli.turns.or(loaded.scenario.turns).unwrap_or(DEFAULT_TURNS);
    let seed = cli.seed.or(loaded.scenario.seed).unwrap_or(DEFAULT_SEED);

    let mut world = World::new(&loaded.scenario.setup(), &loaded.registry);
    for diagnostic in query::grid(&world).diagnostics() {
        warn!(%diagnostic, "terrain rectangle ignored");
    }
    info!(turns, seed, "battle started");
    println!("{}", render(&world));

    let outcome = play(&mut world, turns, seed);
    println!("{}", render(&world));
    println!("turn {}: {}", query::turn_number(&world), describe(outcome));

    if cli.rewind > 0 {
        rewind(&mut world, cli.rewind);
        println!("{}", render(&world));
    }

    Ok(())
}

/// Runs turns until one side is defeated or the turn limit is reached.
fn play(world: &mut World, turns: u32, seed: u64) -> BattleOutcome {
    let mut controllers = [
        CpuController::new(Config::new(Group::Ally, seed)),
        CpuController::new(Config::new(Group::Foe, seed.wrapping_add(1))),
    ];
    let mut commands = Vec::new();
    let mut events = Vec::new();

    while query::turn_number(world) <= turns && query::outcome(world) == BattleOutcome::Ongoing {
        let active = query::active_group(world);
        for controller in &mut controllers {
            if controller.group() == active {
                controller.handle(world, &mut commands);
            }
        }

        for command in commands.drain(..) {
            apply(world, command, &mut events);
        }

        if query::active_group(world) == active {
            warn!(group = %active, "side did not finish its turn; advancing");
            apply(world, Command::AdvanceTurn, &mut events);
        }

        log_events(&events);
        if events.iter().any(|event| matches!(event, Event::TurnStarted { .. })) {
            events.clear();
            apply(world, Command::RecordTurn, &mut events);
            log_events(&events);
        }
        events.clear();
    }

    query::outcome(world)
}

/// Undoes up to `steps` recorded turns, stopping at the earliest snapshot.
fn rewind(world: &mut World, steps: u32) {
    let mut events = Vec::new();
    for _ in 0..steps {
        apply(world, Command::Undo, &mut events);
        let rejected = events
            .iter()
            .any(|event| matches!(event, Event::CommandRejected { .. }));
        log_events(&events);
        events.clear();
        if rejected {
            break;
        }
    }
    info!(
        turn = query::turn_number(world),
        redo = query::redo_depth(world),
        "history rewound"
    );
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::UnitMoved { unit, from, to } => debug!(%unit, %from, %to, "moved"),
            Event::InteractionApplied {
                kind,
                actor,
                target,
                amount,
                target_hp,
            } => info!(?kind, %actor, %target, amount, target_hp, "interaction"),
            Event::UnitDefeated { unit } => info!(%unit, "defeated"),
            Event::TurnEnded { turn, group } => info!(turn, %group, "turn ended"),
            Event::TurnStarted { turn, group } => info!(turn, %group, "turn started"),
            Event::TurnRecorded { turn, depth } => debug!(turn, depth, "turn recorded"),
            Event::HistoryRewound { turn } => info!(turn, "rewound"),
            Event::HistoryReplayed { turn } => info!(turn, "replayed"),
            Event::CommandRejected { reason } => warn!(?reason, "rejected"),
            other => debug!(?other, "event"),
        }
    }
}

fn describe(outcome: BattleOutcome) -> &'static str {
    match outcome {
        BattleOutcome::Ongoing => "battle still ongoing",
        BattleOutcome::AllyVictory => "allies win",
        BattleOutcome::FoeVictory => "foes win",
    }
}

/// Draws the board as text: terrain glyphs overlaid with unit initials.
///
/// Allies are upper case, foes lower case.
fn render(world: &World) -> String {
    let mut board = String::new();
    for row in 0..BOARD_ROWS {
        for column in 0..BOARD_COLUMNS {
            let cell = Cell::new(row, column);
            let glyph = match query::occupant(world, cell) {
                Some(unit) => {
                    let initial = unit.name.chars().next().unwrap_or('?');
                    match unit.group {
                        Group::Ally => initial.to_ascii_uppercase(),
                        Group::Foe => initial.to_ascii_lowercase(),
                    }
                }
                None => terrain_glyph(query::terrain_at(world, cell).unwrap_or_default()),
            };
            board.push(glyph);
        }
        board.push('\n');
    }
    board
}

fn terrain_glyph(terrain: Terrain) -> char {
    match terrain {
        Terrain::Plain => '.',
        Terrain::Forest => '^',
        Terrain::Mountain => 'M',
        Terrain::Water => '~',
        Terrain::Wall => '#',
    }
}
