mod common;

use std::sync::{Arc, Mutex};

use common::{Harness, MAGE, WOLF};
use spell_core::env::{
    AuraInterruptFlags, CreatureEntry, Destination, SpellAttributesEx, WorldLocation, item_class,
};
use spell_core::state::StandState;
use spell_core::{
    AuraType, CastRequest, Character, EffectError, EffectKind, EffectTarget, GameData, GameObject,
    GameObjectKind, Guid, HitOutcome, ItemEntry, ItemId, Notification, PowerType, ScriptContext,
    ScriptRegistry, SpellEffect, SpellEntry, SpellId, SpellSchools, SpellScript, TargetSelector,
    Unit, Vec3, World,
};

fn spell(id: u32, effect: SpellEffect) -> SpellEntry {
    SpellEntry::new(SpellId(id), format!("spell {id}")).with_effect(effect)
}

fn cast(h: &mut Harness, caster: Guid, id: u32, target: TargetSelector) {
    h.world
        .start_cast(CastRequest::new(caster, SpellId(id), target))
        .expect("cast accepted");
}

fn at_wolf() -> TargetSelector {
    TargetSelector::Unit(WOLF)
}

fn set_health(h: &mut Harness, guid: Guid, health: u32) {
    if let Some(unit) = h.world.unit_mut(guid) {
        unit.health = health;
    }
}

// ============================================================================
// Damage
// ============================================================================

#[test]
fn missed_school_damage_reports_a_miss() {
    let mut bolt = spell(1, SpellEffect::new(EffectKind::SchoolDamage).with_points(50));
    bolt.school = SpellSchools::FIRE;
    let mut h = Harness::new(GameData::new().with_spell(bolt));
    h.table.push(HitOutcome::Miss);

    cast(&mut h, MAGE, 1, at_wolf());

    assert_eq!(h.health(WOLF), 300);
    let misses = h.take(|n| matches!(n, Notification::SpellMiss { .. }));
    assert_eq!(misses.len(), 1);
    assert_eq!(h.log.successes(), 1);
}

#[test]
fn critical_school_damage_doubles() {
    let mut h = Harness::new(GameData::new().with_spell(spell(
        1,
        SpellEffect::new(EffectKind::SchoolDamage).with_points(50),
    )));
    h.table.push(HitOutcome::CriticalHit);

    cast(&mut h, MAGE, 1, at_wolf());

    assert_eq!(h.health(WOLF), 200);
    let logs = h.take(|n| matches!(n, Notification::SpellDamageLog { critical: true, .. }));
    assert_eq!(logs.len(), 1);
}

#[test]
fn spell_power_scales_with_cast_time() {
    let mut h = Harness::new(GameData::new().with_spell(spell(
        1,
        SpellEffect::new(EffectKind::SchoolDamage).with_points(100),
    )));
    if let Some(mage) = h.world.unit_mut(MAGE) {
        mage.spell_bonus[0] = 140;
    }

    // 1.75 s cast: half coefficient, 100 + 70.
    h.world
        .start_cast(CastRequest::new(MAGE, SpellId(1), at_wolf()).with_cast_time(1750))
        .expect("cast accepted");
    h.world.advance(1750);
    assert_eq!(h.health(WOLF), 300 - 170);
}

#[test]
fn absorb_shield_soaks_then_falls_off() {
    let shield = spell(
        10,
        SpellEffect::new(EffectKind::ApplyAura)
            .with_aura(AuraType::SchoolAbsorb)
            .with_points(30)
            .with_target(EffectTarget::Caster),
    );
    let bolt = spell(11, SpellEffect::new(EffectKind::SchoolDamage).with_points(50));
    let mut h = Harness::new(GameData::new().with_spell(shield).with_spell(bolt));

    cast(&mut h, MAGE, 10, TargetSelector::SelfCast);
    assert_eq!(h.world.unit(MAGE).map(|u| u.auras.len()), Some(1));

    cast(&mut h, WOLF, 11, TargetSelector::Unit(MAGE));

    assert_eq!(h.health(MAGE), 480);
    assert_eq!(h.world.unit(MAGE).map(|u| u.auras.len()), Some(0));
    let logs = h.take(|n| matches!(n, Notification::SpellDamageLog { .. }));
    assert!(matches!(
        logs.as_slice(),
        [Notification::SpellDamageLog { damage: 20, absorbed: 30, .. }]
    ));
}

#[test]
fn weapon_slots_share_one_roll_and_one_strike() {
    let strike = SpellEntry::new(SpellId(20), "Mortal Strike")
        .with_effect(SpellEffect::new(EffectKind::WeaponDamage).with_points(20))
        .with_effect(SpellEffect::new(EffectKind::WeaponPercentDamage).with_points(150));
    let mut h = Harness::new(GameData::new().with_spell(strike));
    if let Some(mage) = h.world.unit_mut(MAGE) {
        mage.min_damage = 10.0;
        mage.max_damage = 10.0;
    }

    cast(&mut h, MAGE, 20, at_wolf());

    // 20 + 10 from the flat slot, 10 * 150% from the percent slot.
    assert_eq!(h.health(WOLF), 300 - 45);
    let logs = h.take(|n| matches!(n, Notification::SpellDamageLog { .. }));
    assert_eq!(logs.len(), 1);

    h.table.push(HitOutcome::Dodge);
    cast(&mut h, MAGE, 20, at_wolf());
    assert_eq!(h.health(WOLF), 300 - 45);
    assert_eq!(h.take(|n| matches!(n, Notification::SpellMiss { .. })).len(), 1);
}

#[test]
fn instant_kill_and_power_burn() {
    let kill = spell(30, SpellEffect::new(EffectKind::InstantKill));
    let mut burn_effect = SpellEffect::new(EffectKind::PowerBurn)
        .with_points(50)
        .with_misc(0);
    burn_effect.multiple_value = 2.0;
    let burn = spell(31, burn_effect);
    let mut h = Harness::new(GameData::new().with_spell(kill).with_spell(burn));
    let caster = Unit::new(Guid(30), "Priest", 60)
        .with_faction(2)
        .with_power(PowerType::Mana, 100)
        .with_position(Vec3::new(5.0, 0.0, 0.0), 0.0);
    h.world.spawn_unit(caster);

    cast(&mut h, Guid(30), 31, TargetSelector::Unit(MAGE));
    assert_eq!(h.mana(MAGE), 950);
    assert_eq!(h.health(MAGE), 400);

    cast(&mut h, MAGE, 30, at_wolf());
    assert_eq!(h.health(WOLF), 0);
    assert_eq!(h.take(|n| matches!(n, Notification::UnitDied { .. })).len(), 1);
}

// ============================================================================
// Healing & power
// ============================================================================

#[test]
fn heal_crits_and_clamps() {
    let heal = spell(
        40,
        SpellEffect::new(EffectKind::Heal)
            .with_points(100)
            .with_target(EffectTarget::Caster),
    );
    let mut h = Harness::new(GameData::new().with_spell(heal));
    set_health(&mut h, MAGE, 100);

    h.table.push(HitOutcome::CriticalHit);
    cast(&mut h, MAGE, 40, TargetSelector::SelfCast);
    assert_eq!(h.health(MAGE), 300);

    cast(&mut h, MAGE, 40, TargetSelector::SelfCast);
    cast(&mut h, MAGE, 40, TargetSelector::SelfCast);
    cast(&mut h, MAGE, 40, TargetSelector::SelfCast);
    assert_eq!(h.health(MAGE), 500);

    let crits = h.take(|n| matches!(n, Notification::HealLog { critical: true, amount: 200, .. }));
    assert_eq!(crits.len(), 1);
}

#[test]
fn heal_runs_before_damage_with_its_own_roll() {
    let mut entry = SpellEntry::new(SpellId(44), "Siphon")
        .with_effect(SpellEffect::new(EffectKind::SchoolDamage).with_points(50))
        .with_effect(
            SpellEffect::new(EffectKind::Heal)
                .with_points(25)
                .with_target(EffectTarget::Caster),
        );
    entry.school = SpellSchools::SHADOW;
    let mut h = Harness::new(GameData::new().with_spell(entry));
    set_health(&mut h, MAGE, 100);
    h.world.drain_notifications();

    h.table.push(HitOutcome::CriticalHit);
    h.table.push(HitOutcome::Miss);
    cast(&mut h, MAGE, 44, at_wolf());

    assert_eq!(h.health(MAGE), 150);
    assert_eq!(h.health(WOLF), 300);
    let order: Vec<&str> = h
        .world
        .drain_notifications()
        .iter()
        .map(|e| e.notification.kind())
        .filter(|kind| matches!(*kind, "heal_log" | "spell_miss" | "spell_damage_log"))
        .collect();
    assert_eq!(order, vec!["heal_log", "spell_miss"]);
}

#[test]
fn energize_restores_the_named_pool() {
    let energize = spell(
        41,
        SpellEffect::new(EffectKind::Energize)
            .with_points(200)
            .with_misc(0)
            .with_target(EffectTarget::Caster),
    );
    let broken = spell(
        42,
        SpellEffect::new(EffectKind::Energize)
            .with_points(200)
            .with_misc(9)
            .with_target(EffectTarget::Caster),
    );
    let mut h = Harness::new(GameData::new().with_spell(energize).with_spell(broken));
    if let Some(mage) = h.world.unit_mut(MAGE) {
        mage.set_power(PowerType::Mana, 500);
    }

    cast(&mut h, MAGE, 41, TargetSelector::SelfCast);
    assert_eq!(h.mana(MAGE), 700);

    cast(&mut h, MAGE, 42, TargetSelector::SelfCast);
    assert_eq!(h.mana(MAGE), 700);
    assert_eq!(h.log.successes(), 2);
}

#[test]
fn drained_mana_flows_to_the_caster() {
    let drain = spell(
        43,
        SpellEffect::new(EffectKind::PowerDrain)
            .with_points(60)
            .with_misc(0),
    );
    let mut h = Harness::new(GameData::new().with_spell(drain));
    if let Some(wolf) = h.world.unit_mut(WOLF) {
        *wolf = wolf.clone().with_power(PowerType::Mana, 100);
    }
    if let Some(mage) = h.world.unit_mut(MAGE) {
        mage.set_power(PowerType::Mana, 900);
    }

    cast(&mut h, MAGE, 43, at_wolf());

    assert_eq!(h.mana(WOLF), 40);
    assert_eq!(h.mana(MAGE), 960);
    let logs = h.take(|n| matches!(n, Notification::EnergizeLog { amount: 60, .. }));
    assert_eq!(logs.len(), 1);
}

// ============================================================================
// Auras
// ============================================================================

fn buff() -> SpellEntry {
    let mut entry = spell(
        50,
        SpellEffect::new(EffectKind::ApplyAura)
            .with_aura(AuraType::ModStat)
            .with_points(10)
            .with_target(EffectTarget::Caster),
    );
    entry.dispel_type = 1;
    entry
}

#[test]
fn dispel_strips_buffs_from_enemies() {
    let mut purge = spell(
        51,
        SpellEffect::new(EffectKind::Dispel).with_points(1).with_misc(1),
    );
    purge.school = SpellSchools::NATURE;
    let mut h = Harness::new(GameData::new().with_spell(buff()).with_spell(purge));

    cast(&mut h, WOLF, 50, TargetSelector::SelfCast);
    assert_eq!(h.world.unit(WOLF).map(|u| u.auras.len()), Some(1));

    cast(&mut h, MAGE, 51, at_wolf());
    assert_eq!(h.world.unit(WOLF).map(|u| u.auras.len()), Some(0));
    let logs = h.take(|n| matches!(n, Notification::DispelLog { .. }));
    assert!(matches!(
        logs.as_slice(),
        [Notification::DispelLog { removed, .. }] if removed == &vec![SpellId(50)]
    ));
}

/// Records the wolf's aura count and the queued work when it runs.
#[derive(Default)]
struct Inspect {
    seen: Mutex<Vec<(usize, usize)>>,
}

impl SpellScript for Inspect {
    fn on_script_effect(&self, world: &mut World, _ctx: &ScriptContext<'_>) -> Result<(), EffectError> {
        let auras = world.unit(WOLF).map_or(0, |u| u.auras.len());
        self.seen.lock().unwrap().push((auras, world.pending_work()));
        Ok(())
    }
}

#[test]
fn dispel_removal_waits_for_the_work_queue() {
    let purge = SpellEntry::new(SpellId(54), "Purge")
        .with_effect(SpellEffect::new(EffectKind::Dispel).with_points(1).with_misc(1))
        .with_effect(SpellEffect::new(EffectKind::ScriptEffect));
    let script = Arc::new(Inspect::default());
    let scripts = ScriptRegistry::new().with_script(SpellId(54), script.clone());
    let mut h = Harness::with_scripts(GameData::new().with_spell(buff()).with_spell(purge), scripts);

    cast(&mut h, WOLF, 50, TargetSelector::SelfCast);
    cast(&mut h, MAGE, 54, at_wolf());

    assert_eq!(script.seen.lock().unwrap().clone(), vec![(1, 1)]);
    assert_eq!(h.world.unit(WOLF).map(|u| u.auras.len()), Some(0));
    assert_eq!(h.world.pending_work(), 0);
    assert_eq!(h.take(|n| matches!(n, Notification::DispelLog { .. })).len(), 1);
}

#[test]
fn steal_moves_the_buff_to_the_caster() {
    let steal = spell(
        52,
        SpellEffect::new(EffectKind::StealBeneficialBuff)
            .with_points(1)
            .with_misc(1),
    );
    let mut h = Harness::new(GameData::new().with_spell(buff()).with_spell(steal));

    cast(&mut h, WOLF, 50, TargetSelector::SelfCast);
    cast(&mut h, MAGE, 52, at_wolf());

    assert_eq!(h.world.unit(WOLF).map(|u| u.auras.len()), Some(0));
    let mage = h.world.unit(MAGE).expect("mage");
    let stolen: Vec<_> = mage.auras.iter().map(|a| (a.spell, a.caster)).collect();
    assert_eq!(stolen, vec![(SpellId(50), MAGE)]);
    assert_eq!(h.take(|n| matches!(n, Notification::StealLog { .. })).len(), 1);
}

#[test]
fn party_aura_reaches_nearby_group_members() {
    let mut aura = SpellEffect::new(EffectKind::ApplyAreaAuraParty)
        .with_aura(AuraType::ModStat)
        .with_points(5);
    aura.radius = 30.0;
    let mut h = Harness::new(GameData::new().with_spell(spell(53, aura)));

    for (guid, x) in [(Guid(20), 5.0), (Guid(21), 100.0)] {
        let member = Unit::new(guid, "member", 60)
            .with_faction(1)
            .with_position(Vec3::new(x, 0.0, 0.0), 0.0)
            .with_character(Character::default());
        h.world.spawn_unit(member);
    }
    if let Some(character) = h.world.unit_mut(MAGE).and_then(|u| u.character.as_mut()) {
        character.group = [Guid(20), Guid(21), WOLF].into_iter().collect();
    }

    cast(&mut h, MAGE, 53, TargetSelector::SelfCast);

    let count = |g: Guid| h.world.unit(g).map_or(0, |u| u.auras.len());
    assert_eq!(count(MAGE), 1);
    assert_eq!(count(Guid(20)), 1);
    assert_eq!(count(Guid(21)), 0);
    assert_eq!(count(WOLF), 0);
}

#[test]
fn seated_auras_sit_the_caster_down() {
    let mut drink = spell(
        54,
        SpellEffect::new(EffectKind::ApplyAura)
            .with_aura(AuraType::PeriodicEnergize)
            .with_points(10)
            .with_misc(0)
            .with_target(EffectTarget::Caster),
    );
    drink.aura_interrupt_flags = AuraInterruptFlags::NOT_SEATED;
    let mut h = Harness::new(GameData::new().with_spell(drink));

    cast(&mut h, MAGE, 54, TargetSelector::SelfCast);

    assert_eq!(h.world.unit(MAGE).map(|u| u.stand_state), Some(StandState::Sit));
    assert_eq!(
        h.take(|n| matches!(n, Notification::StandStateChanged { .. })).len(),
        1
    );
}

// ============================================================================
// Characters
// ============================================================================

#[test]
fn create_item_notifies_owner_and_group() {
    let water = ItemId(5350);
    let mut conjure = SpellEffect::new(EffectKind::CreateItem)
        .with_points(3)
        .with_target(EffectTarget::Caster);
    conjure.item_type = water.0;
    let data = GameData::new()
        .with_spell(spell(60, conjure))
        .with_item(ItemEntry::new(water, "Conjured Water", 20));
    let mut h = Harness::new(data);
    if let Some(character) = h.world.unit_mut(MAGE).and_then(|u| u.character.as_mut()) {
        character.group = [MAGE, Guid(20)].into_iter().collect();
    }

    cast(&mut h, MAGE, 60, TargetSelector::SelfCast);

    let inventory = h
        .world
        .unit(MAGE)
        .and_then(|u| u.character.as_ref())
        .map(|c| c.inventory.count_of(water));
    assert_eq!(inventory, Some(3));

    let pushes: Vec<Vec<Guid>> = h
        .world
        .drain_notifications()
        .into_iter()
        .filter(|e| matches!(e.notification, Notification::ItemPushResult { .. }))
        .map(|e| e.recipients)
        .collect();
    assert_eq!(pushes, vec![vec![MAGE], vec![Guid(20)]]);
}

#[test]
fn create_item_reports_a_full_backpack() {
    let brick = ItemId(1);
    let mut conjure = SpellEffect::new(EffectKind::CreateItem)
        .with_points(17)
        .with_target(EffectTarget::Caster);
    conjure.item_type = brick.0;
    let data = GameData::new()
        .with_spell(spell(61, conjure))
        .with_item(ItemEntry::new(brick, "Brick", 1));
    let mut h = Harness::new(data);

    cast(&mut h, MAGE, 61, TargetSelector::SelfCast);

    let failures = h.take(|n| matches!(n, Notification::InventoryChangeFailure { .. }));
    assert_eq!(failures.len(), 1);
    let inventory = h
        .world
        .unit(MAGE)
        .and_then(|u| u.character.as_ref())
        .map(|c| c.inventory.count_of(brick));
    assert_eq!(inventory, Some(0));
}

#[test]
fn combo_points_build_and_finishers_spend_them() {
    let builder = spell(70, SpellEffect::new(EffectKind::AddComboPoints).with_points(2));
    let mut finisher = spell(71, SpellEffect::new(EffectKind::SchoolDamage).with_points(10));
    finisher.effects[0].points_per_combo_point = 10.0;
    finisher.attributes_ex = SpellAttributesEx::REQ_COMBO_POINTS;
    let mut h = Harness::new(GameData::new().with_spell(builder).with_spell(finisher));

    cast(&mut h, MAGE, 70, at_wolf());
    cast(&mut h, MAGE, 70, at_wolf());
    assert_eq!(h.world.unit(MAGE).map(|u| u.combo_points()), Some(4));

    cast(&mut h, MAGE, 71, at_wolf());
    assert_eq!(h.health(WOLF), 300 - 50);
    assert_eq!(h.world.unit(MAGE).map(|u| u.combo_points()), Some(0));
}

#[test]
fn quest_and_proficiency_effects_update_the_character() {
    let quest = spell(
        72,
        SpellEffect::new(EffectKind::QuestComplete)
            .with_misc(42)
            .with_target(EffectTarget::Caster),
    );
    let mut swords = spell(73, SpellEffect::new(EffectKind::Proficiency));
    swords.item_class = item_class::WEAPON;
    swords.item_subclass_mask = 0b101;
    let mut h = Harness::new(GameData::new().with_spell(quest).with_spell(swords));

    cast(&mut h, MAGE, 72, TargetSelector::SelfCast);
    cast(&mut h, MAGE, 72, TargetSelector::SelfCast);
    cast(&mut h, MAGE, 73, TargetSelector::SelfCast);

    let character = h
        .world
        .unit(MAGE)
        .and_then(|u| u.character.clone())
        .expect("character");
    assert!(character.completed_quests.contains(&42));
    assert_eq!(character.weapon_proficiency, 0b101);

    let kinds: Vec<&str> = h
        .world
        .drain_notifications()
        .iter()
        .map(|e| e.notification.kind())
        .filter(|k| *k == "quest_completed" || *k == "proficiency_changed")
        .collect();
    assert_eq!(kinds, vec!["quest_completed", "proficiency_changed"]);
}

// ============================================================================
// Movement
// ============================================================================

#[test]
fn hearthstone_teleports_home() {
    let mut hearth = spell(80, SpellEffect::new(EffectKind::TeleportUnits).with_target(EffectTarget::Caster));
    hearth.effects[0].target_b = Destination::Home;
    let bind = spell(81, SpellEffect::new(EffectKind::Bind).with_target(EffectTarget::Caster));
    let mut h = Harness::new(GameData::new().with_spell(hearth).with_spell(bind));

    cast(&mut h, MAGE, 81, TargetSelector::SelfCast);
    h.world.move_unit(MAGE, Vec3::new(300.0, 0.0, 0.0), 0.0);
    cast(&mut h, MAGE, 80, TargetSelector::SelfCast);

    assert_eq!(h.world.unit(MAGE).map(|u| u.position), Some(Vec3::ZERO));
    assert_eq!(h.take(|n| matches!(n, Notification::Teleported { .. })).len(), 1);
}

#[test]
fn teleport_across_maps_is_a_transfer() {
    let mut portal = spell(82, SpellEffect::new(EffectKind::TeleportUnits).with_target(EffectTarget::Caster));
    portal.effects[0].target_b = Destination::Database;
    portal.target_location = Some(WorldLocation {
        map: 1,
        position: Vec3::new(1.0, 2.0, 3.0),
        orientation: 0.5,
    });
    let mut h = Harness::new(GameData::new().with_spell(portal));

    cast(&mut h, MAGE, 82, TargetSelector::SelfCast);

    let mage = h.world.unit(MAGE).expect("mage");
    assert_eq!((mage.map, mage.position), (1, Vec3::new(1.0, 2.0, 3.0)));
    assert_eq!(
        h.take(|n| matches!(n, Notification::TransferPending { map: 1, .. })).len(),
        1
    );
}

#[test]
fn charge_stops_at_melee_range() {
    let mut h = Harness::new(GameData::new().with_spell(spell(83, SpellEffect::new(EffectKind::Charge))));

    cast(&mut h, MAGE, 83, at_wolf());

    let position = h.world.unit(MAGE).map(|u| u.position).expect("mage");
    assert!(position.distance(Vec3::new(7.0, 0.0, 0.0)) < 1e-4);
    assert_eq!(h.take(|n| matches!(n, Notification::ChargeStarted { .. })).len(), 1);
}

// ============================================================================
// Objects, summons, threat
// ============================================================================

#[test]
fn open_lock_toggles_doors_and_shows_chest_loot() {
    let mut h = Harness::new(GameData::new().with_spell(spell(90, SpellEffect::new(EffectKind::OpenLock))));
    let door = h
        .world
        .spawn_object(GameObject::new(Guid::NONE, GameObjectKind::Door, Vec3::new(3.0, 0.0, 0.0)));
    let mut chest = GameObject::new(Guid::NONE, GameObjectKind::Chest, Vec3::new(4.0, 0.0, 0.0));
    chest.loot = vec![(ItemId(7), 2)];
    let chest = h.world.spawn_object(chest);

    cast(&mut h, MAGE, 90, TargetSelector::GameObject(door));
    assert_eq!(h.world.object(door).map(|o| o.state), Some(0));

    cast(&mut h, MAGE, 90, TargetSelector::GameObject(chest));
    let loot = h.take(|n| matches!(n, Notification::LootOpened { .. }));
    assert!(matches!(
        loot.as_slice(),
        [Notification::LootOpened { items, .. }] if items == &vec![(ItemId(7), 2)]
    ));
}

#[test]
fn summons_join_the_casters_fight() {
    let mut summon = SpellEffect::new(EffectKind::Summon);
    summon.summon_unit = 416;
    let imp = CreatureEntry {
        id: 416,
        name: "Imp".into(),
        level: 20,
        faction: 1,
        health: 120,
        power_type: PowerType::Mana,
        power: 200,
        min_damage: 3.0,
        max_damage: 5.0,
        armor: 10,
        combat_reach: 1.0,
    };
    let mut h = Harness::new(GameData::new().with_spell(spell(91, summon)).with_creature(imp));
    if let Some(mage) = h.world.unit_mut(MAGE) {
        mage.victim = Some(WOLF);
    }

    cast(&mut h, MAGE, 91, TargetSelector::SelfCast);

    let imp = h
        .world
        .units()
        .find(|u| u.entry == 416)
        .expect("imp summoned");
    assert_eq!(imp.summoned_by, Some(MAGE));
    assert_eq!(imp.victim, Some(WOLF));
    assert_eq!(imp.max_health, 120);
}

#[test]
fn attack_me_takes_the_top_of_the_threat_list() {
    let mut h = Harness::new(GameData::new().with_spell(spell(92, SpellEffect::new(EffectKind::AttackMe))));
    if let Some(wolf) = h.world.unit_mut(WOLF) {
        wolf.add_threat(Guid(99), 500.0);
        wolf.add_threat(MAGE, 100.0);
    }

    cast(&mut h, MAGE, 92, at_wolf());

    let wolf = h.world.unit(WOLF).expect("wolf");
    assert_eq!(wolf.threat_of(MAGE), 500.0);
}

#[test]
fn duel_raises_the_flag_through_a_triggered_cast() {
    let flag = SpellEntry::new(spell_core::GameConfig::DEFAULT_DUEL_FLAG_SPELL, "Duel Flag");
    let mut h = Harness::new(
        GameData::new()
            .with_spell(spell(93, SpellEffect::new(EffectKind::Duel)))
            .with_spell(flag),
    );

    cast(&mut h, MAGE, 93, at_wolf());

    assert_eq!(h.take(|n| matches!(n, Notification::DuelRequested { .. })).len(), 1);
    let ended = h.log.all();
    assert_eq!(ended.len(), 2);
    assert!(ended.iter().any(|e| e.caster == WOLF && e.success));
}

// ============================================================================
// Triggered spells & scripts
// ============================================================================

#[test]
fn trigger_and_additional_spells_cast_as_procs() {
    let mut trigger = SpellEffect::new(EffectKind::TriggerSpell);
    trigger.trigger_spell = Some(SpellId(101));
    let mut parent = spell(100, trigger);
    parent.additional_spells = vec![SpellId(101)];
    let child = spell(101, SpellEffect::new(EffectKind::SchoolDamage).with_points(25));
    let mut h = Harness::new(GameData::new().with_spell(parent).with_spell(child));

    cast(&mut h, MAGE, 100, at_wolf());

    assert_eq!(h.health(WOLF), 250);
    assert_eq!(h.log.successes(), 3);
    let triggered = h.take(|n| matches!(n, Notification::SpellGo { triggered: true, .. }));
    assert_eq!(triggered.len(), 2);
    assert!(!h.world.is_casting(MAGE));
}

#[test]
fn missing_trigger_target_spell_skips_only_that_effect() {
    let mut trigger = SpellEffect::new(EffectKind::TriggerSpell);
    trigger.trigger_spell = Some(SpellId(404));
    let parent = SpellEntry::new(SpellId(102), "Broken")
        .with_effect(trigger)
        .with_effect(SpellEffect::new(EffectKind::SchoolDamage).with_points(10));
    let mut h = Harness::new(GameData::new().with_spell(parent));

    cast(&mut h, MAGE, 102, at_wolf());

    assert_eq!(h.health(WOLF), 290);
    assert_eq!(h.log.successes(), 1);
}

#[derive(Default)]
struct Execute {
    seen: Mutex<Vec<(usize, i32)>>,
}

impl SpellScript for Execute {
    fn on_script_effect(&self, world: &mut World, ctx: &ScriptContext<'_>) -> Result<(), EffectError> {
        self.seen
            .lock()
            .unwrap()
            .push((ctx.effect_index, ctx.base_points));
        let target = ctx.target.unit_guid(ctx.caster).ok_or(EffectError::NoTarget)?;
        let unit = world.unit_mut(target).ok_or(EffectError::NoTarget)?;
        unit.health = unit.health.saturating_sub(ctx.base_points as u32);
        Ok(())
    }
}

#[test]
fn script_effects_run_the_registered_script() {
    let entry = SpellEntry::new(SpellId(110), "Execute")
        .with_effect(SpellEffect::new(EffectKind::Dummy))
        .with_effect(SpellEffect::new(EffectKind::ScriptEffect).with_points(75));
    let unscripted = spell(111, SpellEffect::new(EffectKind::ScriptEffect).with_points(75));
    let script = Arc::new(Execute::default());
    let scripts = ScriptRegistry::new().with_script(SpellId(110), script.clone());
    let mut h = Harness::with_scripts(
        GameData::new().with_spell(entry).with_spell(unscripted),
        scripts,
    );

    cast(&mut h, MAGE, 110, at_wolf());
    cast(&mut h, MAGE, 111, at_wolf());

    assert_eq!(h.health(WOLF), 225);
    assert_eq!(script.seen.lock().unwrap().clone(), vec![(1, 75)]);
}
