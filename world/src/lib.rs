#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state management for Skirmish.
//!
//! A [`World`] owns the terrain grid and the turn state machine for a single
//! battle session. Adapters and systems mutate it exclusively through
//! [`apply`], and read it through the [`query`] module.

mod grid;
mod history;
mod turn;

use std::collections::BTreeSet;

use skirmish_core::{Cell, Command, Event, Group, RejectionReason, Roster, TerrainRect};
use skirmish_registry::UnitRegistry;
use tracing::warn;

pub use grid::TerrainGrid;
pub use history::History;
pub use turn::TurnStateMachine;

/// Initial placement of a named unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// Template name of the unit, unique within the battle.
    pub name: String,
    /// Starting cell.
    pub position: Cell,
}

impl Deployment {
    /// Creates a deployment for `name` at `position`.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Cell) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Everything collaborators supply to start a battle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleSetup {
    /// Terrain rectangles painted in order over a plain board.
    pub terrain: Vec<TerrainRect>,
    /// Units fighting for the allies.
    pub allies: Vec<Deployment>,
    /// Units fighting for the foes.
    pub foes: Vec<Deployment>,
}

/// Represents the authoritative state of one battle session.
#[derive(Clone, Debug)]
pub struct World {
    grid: TerrainGrid,
    turns: TurnStateMachine,
}

impl World {
    /// Builds a battle from the provided setup, instantiating units from the registry.
    ///
    /// Deployments with empty or duplicate names, off-board positions, or
    /// positions already taken are skipped with a warning. The initial state
    /// is recorded as the earliest history snapshot.
    #[must_use]
    pub fn new(setup: &BattleSetup, registry: &UnitRegistry) -> Self {
        let grid = TerrainGrid::from_rects(&setup.terrain);

        let mut names: BTreeSet<String> = BTreeSet::new();
        let mut cells: BTreeSet<Cell> = BTreeSet::new();
        let mut deploy = |group: Group, deployments: &[Deployment]| -> Roster {
            let mut roster = Roster::new();
            for deployment in deployments {
                if deployment.name.is_empty() {
                    warn!(%group, "skipping deployment without a name");
                    continue;
                }
                if !deployment.position.is_on_board() {
                    warn!(unit = %deployment.name, cell = %deployment.position, "skipping off-board deployment");
                    continue;
                }
                if names.contains(&deployment.name) {
                    warn!(unit = %deployment.name, "skipping duplicate unit name");
                    continue;
                }
                if cells.contains(&deployment.position) {
                    warn!(unit = %deployment.name, cell = %deployment.position, "skipping deployment onto an occupied cell");
                    continue;
                }
                let _ = names.insert(deployment.name.clone());
                let _ = cells.insert(deployment.position);
                let unit = registry.instantiate(&deployment.name, group, deployment.position);
                let _ = roster.insert(unit);
            }
            roster
        };

        let allies = deploy(Group::Ally, &setup.allies);
        let foes = deploy(Group::Foe, &setup.foes);

        let mut turns = TurnStateMachine::new(allies, foes);
        let mut scratch = Vec::new();
        turns.record_turn(&mut scratch);

        Self { grid, turns }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MarkMoved { unit } => {
            if !world.turns.mark_moved(&unit, out_events) {
                reject(out_events, rejection_for(&world.turns, unit));
            }
        }
        Command::MarkActed { unit } => {
            if !world.turns.mark_acted(&unit, out_events) {
                reject(out_events, rejection_for(&world.turns, unit));
            }
        }
        Command::MoveUnit { unit, to } => {
            if let Err(reason) = world.turns.relocate(&unit, to, out_events) {
                reject(out_events, reason);
            }
        }
        Command::ApplyInteraction { outcome } => {
            if let Err(reason) = world.turns.apply_interaction(&outcome, out_events) {
                reject(out_events, reason);
            }
        }
        Command::AdvanceTurn => world.turns.advance_turn(out_events),
        Command::ApplyAliveState { unit } => {
            if !world.turns.apply_alive_state(&unit, out_events) {
                reject(out_events, RejectionReason::UnknownUnit(unit));
            }
        }
        Command::ApplyAliveStates => {
            let _ = world.turns.apply_alive_states(out_events);
        }
        Command::RecordTurn => world.turns.record_turn(out_events),
        Command::Undo => {
            if !world.turns.undo(out_events) {
                reject(out_events, RejectionReason::NothingToUndo);
            }
        }
        Command::Redo => {
            if !world.turns.redo(out_events) {
                reject(out_events, RejectionReason::NothingToRedo);
            }
        }
    }
}

fn rejection_for(turns: &TurnStateMachine, unit: String) -> RejectionReason {
    match turns.active_unit(&unit) {
        Err(reason) => reason,
        Ok(_) => RejectionReason::UnknownUnit(unit),
    }
}

fn reject(out_events: &mut Vec<Event>, reason: RejectionReason) {
    warn!(?reason, "command rejected");
    out_events.push(Event::CommandRejected { reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use skirmish_core::{
        BattleOutcome, Cell, CoreError, Group, Roster, Terrain, TurnRecord, UnitState,
    };

    use super::{TerrainGrid, World};

    /// Provides read-only access to the battle's terrain grid.
    #[must_use]
    pub fn grid(world: &World) -> &TerrainGrid {
        &world.grid
    }

    /// Terrain covering the provided cell.
    pub fn terrain_at(world: &World, cell: Cell) -> Result<Terrain, CoreError> {
        world.grid.terrain_at(cell)
    }

    /// State of the named unit, from whichever roster holds it.
    #[must_use]
    pub fn character_state<'world>(world: &'world World, name: &str) -> Option<&'world UnitState> {
        world.turns.character_state(name)
    }

    /// Roster of the provided group.
    #[must_use]
    pub fn roster(world: &World, group: Group) -> &Roster {
        world.turns.roster(group)
    }

    /// Living unit standing on the provided cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: Cell) -> Option<&UnitState> {
        world.turns.occupant(cell)
    }

    /// Reports whether the allies hold the current turn.
    #[must_use]
    pub fn current_active_group_is_ally(world: &World) -> bool {
        world.turns.is_ally_active()
    }

    /// Group permitted to act this turn.
    #[must_use]
    pub fn active_group(world: &World) -> Group {
        world.turns.active_group()
    }

    /// Current turn number.
    #[must_use]
    pub fn turn_number(world: &World) -> u32 {
        world.turns.turn_number()
    }

    /// Reports whether every living unit of the active group ended its turn.
    #[must_use]
    pub fn current_group_has_finished_turn(world: &World) -> bool {
        world.turns.current_group_has_finished_turn()
    }

    /// Deep copy of the current rosters and turn number.
    #[must_use]
    pub fn snapshot(world: &World) -> TurnRecord {
        world.turns.snapshot()
    }

    /// Number of snapshots held in the history.
    #[must_use]
    pub fn history_depth(world: &World) -> usize {
        world.turns.history().len()
    }

    /// Number of snapshots that can be redone.
    #[must_use]
    pub fn redo_depth(world: &World) -> usize {
        world.turns.history().redo_len()
    }

    /// Overall battle state derived from surviving units.
    #[must_use]
    pub fn outcome(world: &World) -> BattleOutcome {
        world.turns.outcome()
    }
}
