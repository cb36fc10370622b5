#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat resolution between two unit snapshots.
//!
//! Resolution never touches live roster state: it receives snapshots and
//! returns updated copies. Applying the result is the world's job, through
//! the command produced by [`InteractionResult::command`].

use skirmish_core::{
    Command, InteractionKind, InteractionOutcome, UnitState, WeaponColor, WeaponType,
};

/// Marker carried by results of unrecognised interaction kinds.
pub const INVALID_INTERACTION: &str = "Invalid interaction type";

/// Result of resolving an interaction between two units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionResult {
    /// An attack was resolved.
    Attack {
        /// Attacker snapshot, unchanged.
        attacker: UnitState,
        /// Defender snapshot with hit points reduced.
        defender: UnitState,
        /// Damage computed for the strike.
        damage_dealt: u32,
    },
    /// A heal was resolved.
    Heal {
        /// Healer snapshot, unchanged.
        healer: UnitState,
        /// Target snapshot after healing.
        target: UnitState,
        /// Healing computed from the healer's attack.
        healing_done: u32,
    },
    /// The interaction kind was not recognised; nothing changed.
    Invalid {
        /// Human-readable error marker.
        error: String,
    },
}

impl InteractionResult {
    /// Error marker, when the interaction was invalid.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Invalid { error } => Some(error.as_str()),
            Self::Attack { .. } | Self::Heal { .. } => None,
        }
    }

    /// Summary the world can apply to its rosters.
    #[must_use]
    pub fn outcome(&self) -> Option<InteractionOutcome> {
        match self {
            Self::Attack {
                attacker,
                defender,
                damage_dealt,
            } => Some(InteractionOutcome {
                kind: InteractionKind::Attack,
                actor: attacker.name.clone(),
                target: defender.name.clone(),
                amount: *damage_dealt,
                target_hp: defender.hp,
            }),
            Self::Heal {
                healer,
                target,
                healing_done,
            } => Some(InteractionOutcome {
                kind: InteractionKind::Heal,
                actor: healer.name.clone(),
                target: target.name.clone(),
                amount: *healing_done,
                target_hp: target.hp,
            }),
            Self::Invalid { .. } => None,
        }
    }

    /// Command that writes this result into the world.
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        self.outcome()
            .map(|outcome| Command::ApplyInteraction { outcome })
    }
}

/// Weapon-triangle relationship between an attacker and a defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Triangle {
    /// Attacker's color beats the defender's.
    Advantage,
    /// Defender's color beats the attacker's.
    Disadvantage,
    /// Same color, or either side is colorless.
    Neutral,
}

/// Classifies the triangle relationship between two weapons.
#[must_use]
pub fn triangle(attacker: &WeaponType, defender: &WeaponType) -> Triangle {
    use WeaponColor::{Blue, Green, Red};

    match (attacker.color(), defender.color()) {
        (Some(Red), Some(Green)) | (Some(Green), Some(Blue)) | (Some(Blue), Some(Red)) => {
            Triangle::Advantage
        }
        (Some(Red), Some(Blue)) | (Some(Green), Some(Red)) | (Some(Blue), Some(Green)) => {
            Triangle::Disadvantage
        }
        _ => Triangle::Neutral,
    }
}

/// Damage `attacker` deals to `defender`, never negative.
///
/// Magic weapons strike against resistance, everything else against
/// defence. Triangle multipliers of 1.2 and 0.8 are applied with integer
/// arithmetic, which floors exactly.
#[must_use]
pub fn attack_damage(attacker: &UnitState, defender: &UnitState) -> u32 {
    let mitigation = if attacker.weapon.is_magic() {
        defender.res
    } else {
        defender.def
    };
    let base = i64::from(attacker.atk) - i64::from(mitigation);
    if base <= 0 {
        return 0;
    }

    let scaled = match triangle(&attacker.weapon, &defender.weapon) {
        Triangle::Advantage => base * 6 / 5,
        Triangle::Disadvantage => base * 4 / 5,
        Triangle::Neutral => base,
    };
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Healing produced by `healer`: half its attack, floored.
#[must_use]
pub const fn heal_amount(healer: &UnitState) -> u32 {
    healer.atk / 2
}

/// Resolves an interaction between two snapshots.
#[must_use]
pub fn resolve(actor: &UnitState, target: &UnitState, kind: InteractionKind) -> InteractionResult {
    match kind {
        InteractionKind::Attack => {
            let damage_dealt = attack_damage(actor, target);
            let mut defender = target.clone();
            defender.hp = target.hp.saturating_sub(damage_dealt);
            InteractionResult::Attack {
                attacker: actor.clone(),
                defender,
                damage_dealt,
            }
        }
        InteractionKind::Heal => {
            let healing_done = heal_amount(actor);
            let mut healed = target.clone();
            // Capped at the hit points held before the heal.
            healed.hp = target.hp.saturating_add(healing_done).min(target.hp);
            InteractionResult::Heal {
                healer: actor.clone(),
                target: healed,
                healing_done,
            }
        }
    }
}

/// Resolves an interaction named by a string such as `"attack"` or `"Heal"`.
///
/// Unknown names produce [`InteractionResult::Invalid`] rather than an error.
#[must_use]
pub fn resolve_named(actor: &UnitState, target: &UnitState, kind: &str) -> InteractionResult {
    match kind.parse::<InteractionKind>() {
        Ok(kind) => resolve(actor, target, kind),
        Err(_) => InteractionResult::Invalid {
            error: INVALID_INTERACTION.to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Cell, Group, MoveClass, WeaponTag};

    fn unit(name: &str, atk: u32, def: u32, res: u32, weapon: &[WeaponTag]) -> UnitState {
        UnitState {
            name: name.to_owned(),
            group: Group::Ally,
            move_class: MoveClass::Infantry,
            level: 1,
            weapon: WeaponType::new(weapon.iter().copied()),
            hp: 40,
            atk,
            spd: 10,
            def,
            res,
            position: Cell::new(0, 0),
            has_acted: false,
            has_moved: false,
            ended_turn: false,
            is_alive: true,
            skills: Vec::new(),
        }
    }

    #[test]
    fn red_beats_green() {
        let attacker = unit("a", 50, 0, 0, &[WeaponTag::Red]);
        let defender = unit("d", 0, 30, 30, &[WeaponTag::Green]);

        let result = resolve(&attacker, &defender, InteractionKind::Attack);

        let InteractionResult::Attack {
            defender: after,
            damage_dealt,
            ..
        } = result
        else {
            panic!("expected attack result");
        };
        assert_eq!(damage_dealt, 24);
        assert_eq!(after.hp, 16);
    }

    #[test]
    fn blue_loses_to_green_and_beats_red() {
        let attacker = unit("a", 50, 0, 0, &[WeaponTag::Blue]);
        let green = unit("g", 0, 30, 30, &[WeaponTag::Green]);
        let red = unit("r", 0, 30, 30, &[WeaponTag::Red]);

        assert_eq!(attack_damage(&attacker, &green), 16);
        assert_eq!(attack_damage(&attacker, &red), 24);
    }

    #[test]
    fn magic_targets_resistance() {
        let tome = unit("a", 40, 0, 0, &[WeaponTag::Magic, WeaponTag::Red]);
        let sword = unit("b", 40, 0, 0, &[WeaponTag::Red]);
        let defender = unit("d", 0, 10, 30, &[WeaponTag::Red]);

        assert_eq!(attack_damage(&tome, &defender), 10);
        assert_eq!(attack_damage(&sword, &defender), 30);
    }

    #[test]
    fn colorless_weapons_ignore_the_triangle() {
        let attacker = unit("a", 50, 0, 0, &[WeaponTag::Colorless]);
        let defender = unit("d", 0, 30, 30, &[WeaponTag::Green]);
        assert_eq!(attack_damage(&attacker, &defender), 20);
        assert_eq!(
            triangle(&defender.weapon, &attacker.weapon),
            Triangle::Neutral
        );
    }

    #[test]
    fn damage_never_goes_negative_and_hp_floors_at_zero() {
        let weak = unit("w", 5, 0, 0, &[WeaponTag::Red]);
        let tank = unit("t", 0, 40, 40, &[WeaponTag::Green]);
        assert_eq!(attack_damage(&weak, &tank), 0);

        let strong = unit("s", 99, 0, 0, &[]);
        let frail = unit("f", 0, 0, 0, &[]);
        let result = resolve(&strong, &frail, InteractionKind::Attack);
        assert_eq!(result.outcome().map(|outcome| outcome.target_hp), Some(0));
    }

    #[test]
    fn heal_never_raises_hp_above_pre_heal_value() {
        let healer = unit("h", 27, 0, 0, &[WeaponTag::Staff]);
        let mut target = unit("t", 0, 0, 0, &[]);
        target.hp = 12;

        let result = resolve(&healer, &target, InteractionKind::Heal);

        let InteractionResult::Heal {
            target: after,
            healing_done,
            ..
        } = result
        else {
            panic!("expected heal result");
        };
        assert_eq!(healing_done, 13);
        assert_eq!(after.hp, 12);
    }

    #[test]
    fn unknown_kind_yields_error_marker_without_changes() {
        let a = unit("a", 50, 0, 0, &[]);
        let d = unit("d", 0, 0, 0, &[]);

        let result = resolve_named(&a, &d, "dance");
        assert_eq!(result.error(), Some(INVALID_INTERACTION));
        assert!(result.outcome().is_none());
        assert!(result.command().is_none());

        assert!(resolve_named(&a, &d, "ATTACK").error().is_none());
    }

    #[test]
    fn command_carries_outcome_for_world() {
        let attacker = unit("Rowan", 32, 0, 0, &[WeaponTag::Red]);
        let defender = unit("Brigand", 0, 18, 10, &[WeaponTag::Green]);

        let command = resolve(&attacker, &defender, InteractionKind::Attack).command();

        assert_eq!(
            command,
            Some(Command::ApplyInteraction {
                outcome: InteractionOutcome {
                    kind: InteractionKind::Attack,
                    actor: "Rowan".to_owned(),
                    target: "Brigand".to_owned(),
                    amount: 16,
                    target_hp: 24,
                },
            })
        );
    }
}
