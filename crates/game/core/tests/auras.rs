mod common;

use std::sync::{Arc, Mutex};

use common::{Harness, MAGE, WOLF};
use spell_core::{
    AuraType, CastRequest, EffectError, EffectKind, EffectTarget, GameData, Notification,
    PowerType, ScriptContext, ScriptRegistry, SpellEffect, SpellEntry, SpellId, SpellScript,
    TargetSelector, WorkItem, World,
};

const CORRUPTION: SpellId = SpellId(172);
const DRAIN_LIFE: SpellId = SpellId(689);
const RENEW: SpellId = SpellId(139);
const EVOCATION: SpellId = SpellId(12051);

fn periodic(id: SpellId, aura: AuraType, points: i32, duration: i32) -> SpellEntry {
    let mut effect = SpellEffect::new(EffectKind::ApplyAura)
        .with_aura(aura)
        .with_points(points);
    effect.amplitude = 1000;
    let mut spell = SpellEntry::new(id, "periodic").with_effect(effect);
    spell.duration = duration;
    spell
}

fn self_periodic(id: SpellId, aura: AuraType, points: i32, duration: i32, misc: i32) -> SpellEntry {
    let mut spell = periodic(id, aura, points, duration);
    spell.effects[0].target_a = EffectTarget::Caster;
    spell.effects[0].misc_value_a = misc;
    spell
}

fn cast(h: &mut Harness, spell: SpellId, target: TargetSelector) {
    h.world
        .start_cast(CastRequest::new(MAGE, spell, target))
        .expect("cast accepted");
}

fn aura_count(h: &Harness, guid: spell_core::Guid) -> usize {
    h.world.unit(guid).map_or(0, |u| u.auras.len())
}

fn tick_logs(h: &mut Harness) -> Vec<u32> {
    h.take(|n| matches!(n, Notification::PeriodicAuraLog { .. }))
        .into_iter()
        .filter_map(|n| match n {
            Notification::PeriodicAuraLog { amount, .. } => Some(amount),
            _ => None,
        })
        .collect()
}

#[test]
fn periodic_damage_ticks_through_its_duration() {
    let data = GameData::new().with_spell(periodic(CORRUPTION, AuraType::PeriodicDamage, 10, 3000));
    let mut h = Harness::new(data);
    cast(&mut h, CORRUPTION, TargetSelector::Unit(WOLF));

    assert_eq!(aura_count(&h, WOLF), 1);
    assert_eq!(h.health(WOLF), 300);

    h.world.advance(999);
    assert_eq!(h.health(WOLF), 300);
    h.world.advance(1);
    assert_eq!(h.health(WOLF), 290);

    // The last tick lands together with the expiry.
    h.world.advance(2000);
    assert_eq!(h.health(WOLF), 270);
    assert_eq!(aura_count(&h, WOLF), 0);
    assert_eq!(tick_logs(&mut h), vec![10, 10, 10]);
    assert_eq!(h.world.next_deadline(), None);
}

#[test]
fn leech_heals_the_caster() {
    let data = GameData::new().with_spell(periodic(DRAIN_LIFE, AuraType::PeriodicLeech, 15, 2000));
    let mut h = Harness::new(data);
    if let Some(mage) = h.world.unit_mut(MAGE) {
        mage.health = 400;
    }
    cast(&mut h, DRAIN_LIFE, TargetSelector::Unit(WOLF));

    h.world.advance(2000);
    assert_eq!(h.health(WOLF), 270);
    assert_eq!(h.health(MAGE), 430);
}

#[test]
fn permanent_heal_keeps_ticking() {
    let data = GameData::new().with_spell(self_periodic(RENEW, AuraType::PeriodicHeal, 5, 0, 0));
    let mut h = Harness::new(data);
    if let Some(mage) = h.world.unit_mut(MAGE) {
        mage.health = 100;
    }
    cast(&mut h, RENEW, TargetSelector::SelfCast);

    h.world.advance(10_000);
    assert_eq!(h.health(MAGE), 150);
    assert_eq!(aura_count(&h, MAGE), 1);
    assert_eq!(h.world.next_deadline(), Some(11_000));
}

#[test]
fn periodic_energize_restores_the_named_power() {
    let data = GameData::new().with_spell(self_periodic(
        EVOCATION,
        AuraType::PeriodicEnergize,
        100,
        3000,
        0,
    ));
    let mut h = Harness::new(data);
    if let Some(mage) = h.world.unit_mut(MAGE) {
        mage.set_power(PowerType::Mana, 500);
    }
    cast(&mut h, EVOCATION, TargetSelector::SelfCast);

    h.world.advance(3000);
    assert_eq!(h.mana(MAGE), 800);
    assert_eq!(aura_count(&h, MAGE), 0);
}

#[test]
fn death_removes_auras_and_their_timers() {
    let data = GameData::new().with_spell(periodic(CORRUPTION, AuraType::PeriodicDamage, 10, 30_000));
    let mut h = Harness::new(data);
    cast(&mut h, CORRUPTION, TargetSelector::Unit(WOLF));
    h.world.advance(1000);

    h.world.kill_unit(WOLF, Some(MAGE));
    assert_eq!(aura_count(&h, WOLF), 0);
    assert_eq!(h.world.next_deadline(), None);
    assert_eq!(
        h.take(|n| matches!(n, Notification::AuraRemoved { .. })).len(),
        1
    );
}

#[test]
fn lethal_tick_stops_the_aura() {
    let data = GameData::new().with_spell(periodic(CORRUPTION, AuraType::PeriodicDamage, 200, 10_000));
    let mut h = Harness::new(data);
    cast(&mut h, CORRUPTION, TargetSelector::Unit(WOLF));

    h.world.advance(2000);
    assert_eq!(h.health(WOLF), 0);
    assert_eq!(aura_count(&h, WOLF), 0);
    assert_eq!(h.world.next_deadline(), None);
}

#[test]
fn recasting_refreshes_the_aura() {
    let data = GameData::new().with_spell(periodic(CORRUPTION, AuraType::PeriodicDamage, 10, 3000));
    let mut h = Harness::new(data);
    cast(&mut h, CORRUPTION, TargetSelector::Unit(WOLF));
    h.world.advance(1500);
    assert_eq!(h.health(WOLF), 290);

    cast(&mut h, CORRUPTION, TargetSelector::Unit(WOLF));
    assert_eq!(aura_count(&h, WOLF), 1);
    assert_eq!(h.world.next_deadline(), Some(2500));

    h.world.advance(3000);
    assert_eq!(h.health(WOLF), 260);
    assert_eq!(aura_count(&h, WOLF), 0);
}

#[test]
fn despawn_cancels_aura_timers() {
    let data = GameData::new().with_spell(periodic(CORRUPTION, AuraType::PeriodicDamage, 10, 30_000));
    let mut h = Harness::new(data);
    cast(&mut h, CORRUPTION, TargetSelector::Unit(WOLF));

    let wolf = h.world.despawn(WOLF).expect("wolf was spawned");
    assert_eq!(wolf.auras.len(), 1);
    assert_eq!(h.world.next_deadline(), None);
    h.world.advance(5000);
    assert!(tick_logs(&mut h).is_empty());
}

// ============================================================================
// Reentrant removal
// ============================================================================

const MIGHT: SpellId = SpellId(50);
const STAMINA: SpellId = SpellId(53);
const UNRAVEL: SpellId = SpellId(60);

fn wolf_buff(id: SpellId) -> SpellEntry {
    let mut spell = SpellEntry::new(id, "buff").with_effect(
        SpellEffect::new(EffectKind::ApplyAura)
            .with_aura(AuraType::ModStat)
            .with_points(10)
            .with_target(EffectTarget::Caster),
    );
    spell.dispel_type = 1;
    spell
}

/// Queues removal of every aura on the wolf, including ones already queued.
#[derive(Default)]
struct Unravel {
    seen: Mutex<Vec<(usize, usize)>>,
}

impl SpellScript for Unravel {
    fn on_script_effect(&self, world: &mut World, _ctx: &ScriptContext<'_>) -> Result<(), EffectError> {
        let ids = world.unit(WOLF).map(|u| u.auras.ids()).unwrap_or_default();
        self.seen.lock().unwrap().push((ids.len(), world.pending_work()));
        for aura in ids {
            world.post(WorkItem::RemoveAura { unit: WOLF, aura });
        }
        Ok(())
    }
}

#[test]
fn removals_queued_during_dispatch_keep_the_list_intact() {
    let mut unravel = periodic(UNRAVEL, AuraType::PeriodicDamage, 5, 5000);
    unravel.effects.push(SpellEffect::new(EffectKind::Dispel).with_points(1).with_misc(1));
    unravel.effects.push(SpellEffect::new(EffectKind::ScriptEffect));
    let data = GameData::new()
        .with_spell(wolf_buff(MIGHT))
        .with_spell(wolf_buff(STAMINA))
        .with_spell(unravel);
    let script = Arc::new(Unravel::default());
    let scripts = ScriptRegistry::new().with_script(UNRAVEL, script.clone());
    let mut h = Harness::with_scripts(data, scripts);

    for buff in [MIGHT, STAMINA] {
        h.world
            .start_cast(CastRequest::new(WOLF, buff, TargetSelector::SelfCast))
            .expect("buff accepted");
    }
    assert_eq!(aura_count(&h, WOLF), 2);

    // Dispel queues the newest buff, the script queues both again, and the
    // debuff lands last.
    cast(&mut h, UNRAVEL, TargetSelector::Unit(WOLF));
    let spells: Vec<SpellId> = h
        .world
        .unit(WOLF)
        .map(|u| u.auras.iter().map(|a| a.spell).collect())
        .unwrap_or_default();
    assert_eq!(spells, vec![UNRAVEL]);
    assert_eq!(h.world.pending_work(), 0);
    assert_eq!(h.world.next_deadline(), Some(1000));
    let dispelled = h.take(|n| matches!(n, Notification::DispelLog { .. }));
    assert!(matches!(
        dispelled.as_slice(),
        [Notification::DispelLog { removed, .. }] if removed == &vec![STAMINA]
    ));

    // The recast refreshes the debuff while its old instance is queued out.
    h.world.advance(500);
    cast(&mut h, UNRAVEL, TargetSelector::Unit(WOLF));
    assert_eq!(aura_count(&h, WOLF), 1);
    assert_eq!(h.world.next_deadline(), Some(1500));
    assert_eq!(script.seen.lock().unwrap().clone(), vec![(2, 1), (1, 0)]);

    h.world.advance(5000);
    assert_eq!(h.health(WOLF), 275);
    assert_eq!(aura_count(&h, WOLF), 0);
    assert_eq!(h.world.next_deadline(), None);
}
