#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Placeholder CPU opponent that plays one side of the battle.
//!
//! The controller reads the world through its query surface and emits
//! commands; it never mutates state directly. Decisions are drawn from a
//! seeded ChaCha stream so identical seeds replay identical battles.

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{Cell, Command, Group, InteractionKind, UnitState};
use skirmish_system_combat::resolve;
use skirmish_system_movement::reachable_for;
use skirmish_world::{query, World};
use tracing::{debug, warn};

/// Configuration parameters required to construct the CPU controller.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    group: Group,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration controlling `group` with the provided seed.
    #[must_use]
    pub const fn new(group: Group, rng_seed: u64) -> Self {
        Self { group, rng_seed }
    }
}

/// Seeded controller that moves and attacks with every unit of one side.
#[derive(Debug)]
pub struct CpuController {
    group: Group,
    rng: ChaCha8Rng,
}

impl CpuController {
    /// Creates a controller using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            group: config.group,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Side this controller plays.
    #[must_use]
    pub const fn group(&self) -> Group {
        self.group
    }

    /// Emits the commands that finish the controlled side's turn.
    ///
    /// Does nothing unless the controlled side is active. Units are handled
    /// in name order; each moves to a random free reachable cell (staying
    /// put is allowed) and then attacks the first adjacent living opponent
    /// by name, or waits.
    pub fn handle(&mut self, world: &World, out: &mut Vec<Command>) {
        if query::active_group(world) != self.group {
            return;
        }

        let grid = query::grid(world);
        let mut claimed: BTreeSet<Cell> = BTreeSet::new();
        let mut projected_hp: BTreeMap<String, u32> = BTreeMap::new();

        let idle: Vec<&UnitState> = query::roster(world, self.group)
            .living()
            .filter(|unit| !unit.ended_turn)
            .collect();

        for unit in idle {
            let mut acting = unit.clone();

            if !unit.has_moved {
                let destination = match reachable_for(unit, grid) {
                    Ok(reachable) => {
                        let free: Vec<Cell> = reachable
                            .into_iter()
                            .filter(|cell| {
                                *cell == unit.position
                                    || (query::occupant(world, *cell).is_none()
                                        && !claimed.contains(cell))
                            })
                            .collect();
                        self.pick(&free).unwrap_or(unit.position)
                    }
                    Err(error) => {
                        warn!(unit = %unit.name, %error, "cpu unit cannot plan movement");
                        unit.position
                    }
                };
                let _ = claimed.insert(destination);
                debug!(unit = %unit.name, from = %unit.position, to = %destination, "cpu move");
                out.push(Command::MoveUnit {
                    unit: unit.name.clone(),
                    to: destination,
                });
                acting.position = destination;
            }

            if unit.has_acted {
                continue;
            }

            match self.adjacent_target(world, &acting, &projected_hp) {
                Some(mut target) => {
                    if let Some(hp) = projected_hp.get(&target.name) {
                        target.hp = *hp;
                    }
                    let result = resolve(&acting, &target, InteractionKind::Attack);
                    if let Some(outcome) = result.outcome() {
                        let _ = projected_hp.insert(outcome.target.clone(), outcome.target_hp);
                        debug!(
                            unit = %acting.name,
                            target = %outcome.target,
                            damage = outcome.amount,
                            "cpu attack"
                        );
                    }
                    if let Some(command) = result.command() {
                        out.push(command);
                    }
                }
                None => {
                    debug!(unit = %acting.name, "cpu waits");
                    out.push(Command::MarkActed {
                        unit: acting.name.clone(),
                    });
                }
            }
        }
    }

    fn pick(&mut self, cells: &[Cell]) -> Option<Cell> {
        if cells.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..cells.len());
        cells.get(index).copied()
    }

    fn adjacent_target(
        &self,
        world: &World,
        acting: &UnitState,
        projected_hp: &BTreeMap<String, u32>,
    ) -> Option<UnitState> {
        query::roster(world, self.group.opponent())
            .living()
            .filter(|opponent| projected_hp.get(&opponent.name).map_or(true, |hp| *hp > 0))
            .find(|opponent| opponent.position.manhattan_distance(acting.position) == 1)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_registry::UnitRegistry;
    use skirmish_world::{apply, BattleSetup, Deployment};

    fn world(allies: Vec<Deployment>, foes: Vec<Deployment>) -> World {
        let setup = BattleSetup {
            terrain: Vec::new(),
            allies,
            foes,
        };
        World::new(&setup, &UnitRegistry::builtin())
    }

    #[test]
    fn stays_silent_when_its_side_is_inactive() {
        let world = world(
            vec![Deployment::new("Rowan", Cell::new(0, 0))],
            vec![Deployment::new("Brigand", Cell::new(5, 7))],
        );
        let mut cpu = CpuController::new(Config::new(Group::Foe, 7));
        let mut commands = Vec::new();

        cpu.handle(&world, &mut commands);

        assert!(commands.is_empty());
    }

    #[test]
    fn every_unit_moves_then_acts_once() {
        let world = world(
            vec![
                Deployment::new("Rowan", Cell::new(0, 0)),
                Deployment::new("Sela", Cell::new(0, 7)),
            ],
            vec![Deployment::new("Brigand", Cell::new(5, 7))],
        );
        let mut cpu = CpuController::new(Config::new(Group::Ally, 11));
        let mut commands = Vec::new();

        cpu.handle(&world, &mut commands);

        assert_eq!(commands.len(), 4);
        assert!(matches!(&commands[0], Command::MoveUnit { unit, .. } if unit == "Rowan"));
        assert!(matches!(&commands[1], Command::MarkActed { unit } if unit == "Rowan"));
        assert!(matches!(&commands[2], Command::MoveUnit { unit, .. } if unit == "Sela"));
        assert!(matches!(&commands[3], Command::MarkActed { unit } if unit == "Sela"));
    }

    #[test]
    fn applying_the_commands_hands_the_turn_to_the_opponent() {
        let mut world = world(
            vec![
                Deployment::new("Rowan", Cell::new(0, 0)),
                Deployment::new("Garron", Cell::new(0, 1)),
            ],
            vec![Deployment::new("Brigand", Cell::new(5, 7))],
        );
        let mut cpu = CpuController::new(Config::new(Group::Ally, 3));
        let mut commands = Vec::new();
        let mut events = Vec::new();

        cpu.handle(&world, &mut commands);
        for command in commands {
            apply(&mut world, command, &mut events);
        }

        assert_eq!(query::active_group(&world), Group::Foe);
        assert_eq!(query::turn_number(&world), 2);
        let rowan = query::character_state(&world, "Rowan").expect("deployed");
        let garron = query::character_state(&world, "Garron").expect("deployed");
        assert_ne!(rowan.position, garron.position);
    }

    #[test]
    fn attacks_adjacent_opponent_after_staying_put() {
        let mut world = world(
            vec![Deployment::new("Garron", Cell::new(2, 2))],
            vec![
                Deployment::new("Brigand", Cell::new(0, 0)),
                Deployment::new("Wyvern", Cell::new(0, 1)),
            ],
        );
        // Already moved, so the controller only picks a target.
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MoveUnit {
                unit: "Garron".to_owned(),
                to: Cell::new(1, 1),
            },
            &mut events,
        );
        let mut cpu = CpuController::new(Config::new(Group::Ally, 5));
        let mut commands = Vec::new();

        cpu.handle(&world, &mut commands);

        assert_eq!(commands.len(), 1);
        let Command::ApplyInteraction { outcome } = &commands[0] else {
            panic!("expected an attack, got {:?}", commands[0]);
        };
        assert_eq!(outcome.actor, "Garron");
        assert_eq!(outcome.target, "Wyvern");
    }

    #[test]
    fn identical_seeds_produce_identical_plans() {
        let world = world(
            vec![
                Deployment::new("Rowan", Cell::new(2, 2)),
                Deployment::new("Sela", Cell::new(3, 3)),
                Deployment::new("Mira", Cell::new(4, 4)),
            ],
            vec![Deployment::new("Brigand", Cell::new(5, 7))],
        );
        let mut first = Vec::new();
        let mut second = Vec::new();

        CpuController::new(Config::new(Group::Ally, 42)).handle(&world, &mut first);
        CpuController::new(Config::new(Group::Ally, 42)).handle(&world, &mut second);

        assert_eq!(first, second);
    }
}
