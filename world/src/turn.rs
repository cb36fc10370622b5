//! Turn ownership, per-unit action flags, liveness and history.

use skirmish_core::{
    BattleOutcome, Cell, CoreError, Event, Group, InteractionKind, InteractionOutcome,
    RejectionReason, Roster, TurnRecord, UnitState,
};
use tracing::{debug, error};

use crate::history::History;

/// Owns both rosters and decides whose turn it is.
///
/// The active group is derived from turn-number parity: odd turns belong to
/// the allies, even turns to the foes. Every mutation reports what happened
/// through the caller's event buffer.
#[derive(Clone, Debug)]
pub struct TurnStateMachine {
    turn_number: u32,
    allies: Roster,
    foes: Roster,
    history: History,
}

#[derive(Clone, Copy, Debug)]
enum ActionFlag {
    Moved,
    Acted,
}

impl TurnStateMachine {
    /// Creates a state machine at turn one with an empty history.
    #[must_use]
    pub fn new(allies: Roster, foes: Roster) -> Self {
        Self {
            turn_number: 1,
            allies,
            foes,
            history: History::new(),
        }
    }

    /// Current turn number, starting at one.
    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Group permitted to act this turn.
    #[must_use]
    pub const fn active_group(&self) -> Group {
        Group::active_on(self.turn_number)
    }

    /// Reports whether the allies hold the current turn.
    #[must_use]
    pub const fn is_ally_active(&self) -> bool {
        matches!(self.active_group(), Group::Ally)
    }

    /// Roster belonging to the provided group.
    #[must_use]
    pub const fn roster(&self, group: Group) -> &Roster {
        match group {
            Group::Ally => &self.allies,
            Group::Foe => &self.foes,
        }
    }

    fn roster_mut(&mut self, group: Group) -> &mut Roster {
        match group {
            Group::Ally => &mut self.allies,
            Group::Foe => &mut self.foes,
        }
    }

    /// Snapshot history recorded so far.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// State of the named unit from whichever roster holds it.
    #[must_use]
    pub fn character_state(&self, name: &str) -> Option<&UnitState> {
        self.allies.get(name).or_else(|| self.foes.get(name))
    }

    fn character_state_mut(&mut self, name: &str) -> Option<&mut UnitState> {
        if self.allies.contains(name) {
            self.allies.get_mut(name)
        } else {
            self.foes.get_mut(name)
        }
    }

    /// Living unit standing on the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: Cell) -> Option<&UnitState> {
        self.allies
            .living()
            .chain(self.foes.living())
            .find(|unit| unit.position == cell)
    }

    /// Returns the named unit when it belongs to the active roster.
    pub fn active_unit(&self, name: &str) -> Result<&UnitState, RejectionReason> {
        if let Some(unit) = self.roster(self.active_group()).get(name) {
            return Ok(unit);
        }
        if self.character_state(name).is_some() {
            Err(RejectionReason::InactiveGroup(name.to_owned()))
        } else {
            Err(RejectionReason::UnknownUnit(name.to_owned()))
        }
    }

    /// Raises the moved flag on an active unit.
    ///
    /// Returns `false` and logs when the unit is not in the active roster.
    pub fn mark_moved(&mut self, name: &str, out_events: &mut Vec<Event>) -> bool {
        self.mark(name, ActionFlag::Moved, out_events)
    }

    /// Raises the acted flag on an active unit.
    ///
    /// Returns `false` and logs when the unit is not in the active roster.
    pub fn mark_acted(&mut self, name: &str, out_events: &mut Vec<Event>) -> bool {
        self.mark(name, ActionFlag::Acted, out_events)
    }

    fn mark(&mut self, name: &str, flag: ActionFlag, out_events: &mut Vec<Event>) -> bool {
        let active = self.active_group();
        let Some(unit) = self.roster_mut(active).get_mut(name) else {
            let error = CoreError::NotFound(name.to_owned());
            error!(%error, group = %active, ?flag, "unit not found in active roster");
            return false;
        };

        match flag {
            ActionFlag::Moved => {
                unit.has_moved = true;
                out_events.push(Event::UnitMarkedMoved {
                    unit: name.to_owned(),
                });
            }
            ActionFlag::Acted => {
                unit.has_acted = true;
                out_events.push(Event::UnitMarkedActed {
                    unit: name.to_owned(),
                });
            }
        }

        if unit.has_finished_actions() && !unit.ended_turn {
            unit.ended_turn = true;
            out_events.push(Event::UnitEndedTurn {
                unit: name.to_owned(),
            });
        }

        self.advance_if_finished(out_events);
        true
    }

    /// Moves an active unit to `to` and raises its moved flag.
    ///
    /// Reachability is the caller's concern; only ownership, liveness, board
    /// bounds and occupancy are validated here.
    pub fn relocate(
        &mut self,
        name: &str,
        to: Cell,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        let unit = self.active_unit(name)?;
        if !unit.is_alive {
            return Err(RejectionReason::Defeated(name.to_owned()));
        }
        if unit.has_moved {
            return Err(RejectionReason::AlreadyMoved(name.to_owned()));
        }
        if !to.is_on_board() {
            return Err(RejectionReason::OutOfBounds(to));
        }
        if self
            .occupant(to)
            .is_some_and(|occupant| occupant.name != name)
        {
            return Err(RejectionReason::Occupied(to));
        }

        let active = self.active_group();
        let Some(unit) = self.roster_mut(active).get_mut(name) else {
            return Err(RejectionReason::UnknownUnit(name.to_owned()));
        };
        let from = unit.position;
        unit.position = to;
        out_events.push(Event::UnitMoved {
            unit: name.to_owned(),
            from,
            to,
        });

        let _ = self.mark_moved(name, out_events);
        Ok(())
    }

    /// Writes a resolved interaction into the rosters.
    ///
    /// The target's hit points are replaced, its liveness is re-asserted, and
    /// finally the actor is marked as having acted.
    pub fn apply_interaction(
        &mut self,
        outcome: &InteractionOutcome,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        let actor = self.active_unit(&outcome.actor)?;
        if !actor.is_alive {
            return Err(RejectionReason::Defeated(outcome.actor.clone()));
        }
        if actor.has_acted {
            return Err(RejectionReason::AlreadyActed(outcome.actor.clone()));
        }
        if outcome.kind == InteractionKind::Attack && outcome.actor == outcome.target {
            return Err(RejectionReason::SelfTarget(outcome.actor.clone()));
        }

        let Some(target) = self.character_state_mut(&outcome.target) else {
            return Err(RejectionReason::UnknownUnit(outcome.target.clone()));
        };
        if !target.is_alive {
            return Err(RejectionReason::Defeated(outcome.target.clone()));
        }
        target.hp = outcome.target_hp;
        out_events.push(Event::InteractionApplied {
            kind: outcome.kind,
            actor: outcome.actor.clone(),
            target: outcome.target.clone(),
            amount: outcome.amount,
            target_hp: outcome.target_hp,
        });

        let _ = self.apply_alive_state(&outcome.target, out_events);
        let _ = self.mark_acted(&outcome.actor, out_events);
        Ok(())
    }

    /// Reports whether every living unit of the active roster ended its turn.
    #[must_use]
    pub fn current_group_has_finished_turn(&self) -> bool {
        self.roster(self.active_group())
            .living()
            .all(|unit| unit.ended_turn)
    }

    fn advance_if_finished(&mut self, out_events: &mut Vec<Event>) {
        if self.current_group_has_finished_turn() {
            self.advance_turn(out_events);
        }
    }

    /// Hands the turn to the other group.
    ///
    /// Emits [`Event::TurnEnded`], then increments the counter and clears the
    /// action flags of every living unit in both rosters, then emits
    /// [`Event::ActiveGroupChanged`] and [`Event::TurnStarted`].
    pub fn advance_turn(&mut self, out_events: &mut Vec<Event>) {
        out_events.push(Event::TurnEnded {
            turn: self.turn_number,
            group: self.active_group(),
        });

        self.turn_number = self.turn_number.saturating_add(1);
        for unit in self.allies.iter_mut().chain(self.foes.iter_mut()) {
            if unit.is_alive {
                unit.reset_flags();
            } else {
                debug!(unit = %unit.name, "skipping flag reset for defeated unit");
            }
        }

        let group = self.active_group();
        debug!(turn = self.turn_number, %group, "turn advanced");
        out_events.push(Event::ActiveGroupChanged { group });
        out_events.push(Event::TurnStarted {
            turn: self.turn_number,
            group,
        });
    }

    /// Flips a unit to defeated when its hit points reached zero.
    ///
    /// A newly defeated unit has all of its action flags forced so it no
    /// longer holds up its side. Returns `false` and logs when the unit does
    /// not exist.
    pub fn apply_alive_state(&mut self, name: &str, out_events: &mut Vec<Event>) -> bool {
        let active = self.active_group();
        let Some(unit) = self.character_state_mut(name) else {
            let error = CoreError::NotFound(name.to_owned());
            error!(%error, "cannot update liveness of unknown unit");
            return false;
        };

        if unit.hp == 0 && unit.is_alive {
            unit.is_alive = false;
            unit.has_moved = true;
            unit.has_acted = true;
            unit.ended_turn = true;
            let group = unit.group;
            debug!(unit = name, %group, "unit defeated");
            out_events.push(Event::UnitDefeated {
                unit: name.to_owned(),
            });
            if group == active {
                self.advance_if_finished(out_events);
            }
        }
        true
    }

    /// Re-asserts liveness for every unit, returning how many were newly defeated.
    pub fn apply_alive_states(&mut self, out_events: &mut Vec<Event>) -> usize {
        let fallen: Vec<String> = self
            .allies
            .iter()
            .chain(self.foes.iter())
            .filter(|unit| unit.hp == 0 && unit.is_alive)
            .map(|unit| unit.name.clone())
            .collect();

        for name in &fallen {
            let _ = self.apply_alive_state(name, out_events);
        }
        fallen.len()
    }

    /// Deep copy of both rosters and the turn number.
    #[must_use]
    pub fn snapshot(&self) -> TurnRecord {
        TurnRecord {
            turn_number: self.turn_number,
            allies: self.allies.clone(),
            foes: self.foes.clone(),
        }
    }

    /// Pushes the current state onto the history.
    pub fn record_turn(&mut self, out_events: &mut Vec<Event>) {
        self.history.push(self.snapshot());
        out_events.push(Event::TurnRecorded {
            turn: self.turn_number,
            depth: self.history.len(),
        });
    }

    /// Restores the snapshot preceding the newest one.
    ///
    /// No-op returning `false` while fewer than two snapshots exist.
    pub fn undo(&mut self, out_events: &mut Vec<Event>) -> bool {
        let Some(record) = self.history.undo().cloned() else {
            debug!(depth = self.history.len(), "nothing to undo");
            return false;
        };
        self.restore(record);
        debug!(turn = self.turn_number, "history rewound");
        out_events.push(Event::HistoryRewound {
            turn: self.turn_number,
        });
        true
    }

    /// Re-applies the most recently undone snapshot.
    ///
    /// No-op returning `false` when nothing was undone.
    pub fn redo(&mut self, out_events: &mut Vec<Event>) -> bool {
        let Some(record) = self.history.redo().cloned() else {
            debug!("nothing to redo");
            return false;
        };
        self.restore(record);
        debug!(turn = self.turn_number, "history replayed");
        out_events.push(Event::HistoryReplayed {
            turn: self.turn_number,
        });
        true
    }

    fn restore(&mut self, record: TurnRecord) {
        self.turn_number = record.turn_number;
        self.allies = record.allies;
        self.foes = record.foes;
    }

    /// Winner of the battle, if one side has no living units left.
    #[must_use]
    pub fn outcome(&self) -> BattleOutcome {
        if self.allies.living().next().is_none() {
            BattleOutcome::FoeVictory
        } else if self.foes.living().next().is_none() {
            BattleOutcome::AllyVictory
        } else {
            BattleOutcome::Ongoing
        }
    }
}
