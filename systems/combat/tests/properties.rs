use proptest::prelude::*;
use skirmish_core::{Cell, Group, InteractionKind, MoveClass, UnitState, WeaponTag, WeaponType};
use skirmish_system_combat::{attack_damage, resolve, InteractionResult};

fn unit(hp: u32, atk: u32, def: u32, res: u32, weapon: Vec<WeaponTag>) -> UnitState {
    UnitState {
        name: "unit".to_owned(),
        group: Group::Foe,
        move_class: MoveClass::Infantry,
        level: 1,
        weapon: WeaponType::new(weapon),
        hp,
        atk,
        spd: 0,
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

fn tags() -> impl Strategy<Value = Vec<WeaponTag>> {
    prop::collection::vec(
        prop::sample::select(vec![
            WeaponTag::Red,
            WeaponTag::Green,
            WeaponTag::Blue,
            WeaponTag::Colorless,
            WeaponTag::Magic,
            WeaponTag::Staff,
        ]),
        0..3,
    )
}

fn snapshot() -> impl Strategy<Value = UnitState> {
    (0u32..120, 0u32..80, 0u32..60, 0u32..60, tags())
        .prop_map(|(hp, atk, def, res, weapon)| unit(hp, atk, def, res, weapon))
}

proptest! {
    #[test]
    fn attack_keeps_defender_hp_within_bounds(attacker in snapshot(), defender in snapshot()) {
        let result = resolve(&attacker, &defender, InteractionKind::Attack);
        let InteractionResult::Attack { defender: after, damage_dealt, attacker: unchanged } = result else {
            return Err(TestCaseError::fail("attack must produce an attack result"));
        };
        prop_assert!(after.hp <= defender.hp);
        prop_assert_eq!(after.hp, defender.hp.saturating_sub(damage_dealt));
        prop_assert_eq!(unchanged, attacker);
    }

    #[test]
    fn heal_never_exceeds_incoming_hp(healer in snapshot(), target in snapshot()) {
        let result = resolve(&healer, &target, InteractionKind::Heal);
        let InteractionResult::Heal { target: after, healing_done, .. } = result else {
            return Err(TestCaseError::fail("heal must produce a heal result"));
        };
        prop_assert_eq!(after.hp, target.hp);
        prop_assert_eq!(healing_done, healer.atk / 2);
    }

    #[test]
    fn advantage_and_disadvantage_shift_damage(base in 1u32..60, def in 0u32..40) {
        let defender_green = unit(100, 0, def, def, vec![WeaponTag::Green]);
        let defender_plain = unit(100, 0, def, def, vec![WeaponTag::Colorless]);
        let red = unit(100, base + def, 0, 0, vec![WeaponTag::Red]);
        let blue = unit(100, base + def, 0, 0, vec![WeaponTag::Blue]);

        let neutral = attack_damage(&red, &defender_plain);
        prop_assert_eq!(neutral, base);
        prop_assert_eq!(attack_damage(&red, &defender_green), base * 6 / 5);
        prop_assert_eq!(attack_damage(&blue, &defender_green), base * 4 / 5);
        prop_assert!(attack_damage(&blue, &defender_green) < neutral);
        if base >= 5 {
            prop_assert!(attack_damage(&red, &defender_green) > neutral);
        }
    }
}
