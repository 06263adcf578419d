//! Effect dispatch.
//!
//! # Architecture
//!
//! - **Dispatch Table**: [`DISPATCH_ORDER`] fixes the order in which effect
//!   kinds run. Every effect slot of the spell whose kind matches an entry is
//!   dispatched when that entry comes up; kinds missing from the table are
//!   ignored. Aura application and school damage always run last.
//! - **Context**: an [`EffectContext`] is a snapshot of the cast taken when
//!   effects start. Handlers read the snapshot rather than the registry, so a
//!   cast torn down mid-dispatch doesn't invalidate the remaining handlers.
//! - **Completion**: handlers may defer notifications and melee strikes onto
//!   the context. Both are flushed once every handler has run, before the
//!   spell's additional spells are cast.
//! - **Failures**: a handler returning [`EffectError`] is logged and skipped;
//!   the other handlers still run.

mod aura;
mod character;
mod damage;
mod interact;
mod movement;
mod restore;

use std::sync::Arc;

use rand::RngCore;
use tracing::{trace, warn};

use crate::cast::points::{calculate_effect_base_points, spell_points_total};
use crate::cast::{CastId, CastRequest, TargetSelector};
use crate::combat::{AttackContext, AttackRoll, ResolutionMode};
use crate::env::{
    Destination, EffectKind, EffectTarget, ItemId, ItemOracle, ItemSpellTrigger, SpellEffect,
    SpellEntry, SpellId, SpellOracle, SpellSchools,
};
use crate::error::{ErrorSeverity, GameError};
use crate::state::Guid;
use crate::world::{Notification, World, WorkItem};

// ============================================================================
// Errors
// ============================================================================

/// Data problems that skip one effect slot.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EffectError {
    #[error("item {0} does not exist")]
    MissingItem(ItemId),

    #[error("creature entry {0} does not exist")]
    MissingCreature(u32),

    #[error("spell {0} does not exist")]
    MissingSpell(SpellId),

    #[error("no valid target found")]
    NoTarget,

    #[error("caster {0} left the world")]
    CasterGone(Guid),

    #[error("unit {0} is not a character")]
    RequiresCharacter(Guid),

    #[error("unhandled destination {0:?}")]
    UnhandledDestination(Destination),

    #[error("invalid power type {0}")]
    InvalidPowerType(i32),
}

impl GameError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoTarget | Self::CasterGone(_) => ErrorSeverity::Recoverable,
            Self::RequiresCharacter(_) => ErrorSeverity::Validation,
            Self::MissingItem(_)
            | Self::MissingCreature(_)
            | Self::MissingSpell(_)
            | Self::UnhandledDestination(_)
            | Self::InvalidPowerType(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingItem(_) => "EFFECT_MISSING_ITEM",
            Self::MissingCreature(_) => "EFFECT_MISSING_CREATURE",
            Self::MissingSpell(_) => "EFFECT_MISSING_SPELL",
            Self::NoTarget => "EFFECT_NO_TARGET",
            Self::CasterGone(_) => "EFFECT_CASTER_GONE",
            Self::RequiresCharacter(_) => "EFFECT_REQUIRES_CHARACTER",
            Self::UnhandledDestination(_) => "EFFECT_UNHANDLED_DESTINATION",
            Self::InvalidPowerType(_) => "EFFECT_INVALID_POWER_TYPE",
        }
    }
}

// ============================================================================
// Dispatch Table
// ============================================================================

/// Order in which effect kinds are dispatched.
///
/// Binary effects run before damage so partial resists on the damage slot
/// don't leak into them.
pub const DISPATCH_ORDER: [EffectKind; 28] = [
    EffectKind::InstantKill,
    EffectKind::PowerDrain,
    EffectKind::Heal,
    EffectKind::Bind,
    EffectKind::QuestComplete,
    EffectKind::Proficiency,
    EffectKind::AddComboPoints,
    EffectKind::Duel,
    EffectKind::WeaponDamageNoSchool,
    EffectKind::CreateItem,
    EffectKind::WeaponDamage,
    EffectKind::TeleportUnits,
    EffectKind::TriggerSpell,
    EffectKind::Energize,
    EffectKind::WeaponPercentDamage,
    EffectKind::PowerBurn,
    EffectKind::Charge,
    EffectKind::OpenLock,
    EffectKind::OpenLockItem,
    EffectKind::ApplyAreaAuraParty,
    EffectKind::Dispel,
    EffectKind::Summon,
    EffectKind::ScriptEffect,
    EffectKind::AttackMe,
    EffectKind::NormalizedWeaponDmg,
    EffectKind::StealBeneficialBuff,
    EffectKind::ApplyAura,
    EffectKind::SchoolDamage,
];

/// Weapon damage accumulated for one target across the weapon effect slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeleeStrike {
    pub target: Guid,
    pub damage: u32,
    /// Roll made when the first weapon slot hit this target.
    pub roll: AttackRoll,
}

/// Cast snapshot shared by every handler of one effect application.
#[derive(Clone, Debug)]
pub struct EffectContext {
    pub cast: CastId,
    pub caster: Guid,
    pub spell: Arc<SpellEntry>,
    pub target: TargetSelector,
    pub base_points: Option<i32>,
    pub cast_time: u64,
    pub item: Option<Guid>,
    pub item_entry: Option<ItemId>,
    pub is_proc: bool,
    melee: Vec<MeleeStrike>,
    /// Notifications sent once every handler has run.
    deferred: Vec<(Guid, Notification)>,
}

impl EffectContext {
    pub fn melee_strikes(&self) -> &[MeleeStrike] {
        &self.melee
    }

    pub(crate) fn defer(&mut self, source: Guid, notification: Notification) {
        self.deferred.push((source, notification));
    }

    pub(crate) fn add_melee(&mut self, target: Guid, damage: u32, roll: AttackRoll) {
        match self.melee.iter_mut().find(|s| s.target == target) {
            Some(strike) => strike.damage = strike.damage.saturating_add(damage),
            None => self.melee.push(MeleeStrike {
                target,
                damage,
                roll,
            }),
        }
    }

    /// Roll already made for `target` by an earlier weapon slot.
    pub(crate) fn melee_roll(&self, target: Guid) -> Option<AttackRoll> {
        self.melee.iter().find(|s| s.target == target).map(|s| s.roll)
    }

    fn no_threat(&self) -> bool {
        self.spell.no_threat()
    }

    fn school(&self) -> SpellSchools {
        self.spell.school
    }
}

impl World {
    /// Runs every effect slot of the cast in dispatch order, then flushes the
    /// completion work and casts the additional spells.
    pub(crate) fn apply_all_effects(&mut self, id: CastId) {
        let Some(cast) = self.casts.get(&id) else {
            return;
        };
        let mut ctx = EffectContext {
            cast: id,
            caster: cast.caster,
            spell: cast.spell.clone(),
            target: cast.target,
            base_points: cast.base_points,
            cast_time: cast.cast_time,
            item: cast.item,
            item_entry: cast.item_entry,
            is_proc: cast.is_proc,
            melee: Vec::new(),
            deferred: Vec::new(),
        };
        if !self.units.contains_key(&ctx.caster) {
            return;
        }

        self.apply_cooldowns(&ctx);

        let spell = ctx.spell.clone();
        for kind in DISPATCH_ORDER {
            for (index, effect) in spell.effects.iter().enumerate() {
                if effect.kind != kind {
                    continue;
                }
                if let Err(error) = self.apply_effect(&mut ctx, effect, index) {
                    let kind: &'static str = kind.into();
                    warn!(
                        cast = %id,
                        caster = %ctx.caster,
                        spell = spell.id.0,
                        effect = kind,
                        %error,
                        "effect skipped"
                    );
                }
            }
        }

        self.complete_effects(&mut ctx);

        for additional in spell.additional_spells.iter().copied() {
            let request = CastRequest::new(ctx.caster, additional, ctx.target)
                .with_cast_time(0)
                .triggered();
            if let Err(error) = self.begin_cast(request) {
                warn!(caster = %ctx.caster, spell = additional.0, %error, "additional spell not cast");
            }
        }
    }

    fn apply_effect(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
        index: usize,
    ) -> Result<(), EffectError> {
        match effect.kind {
            EffectKind::InstantKill => self.effect_instant_kill(ctx, effect),
            EffectKind::PowerDrain => self.effect_power_drain(ctx, effect),
            EffectKind::Heal => self.effect_heal(ctx, effect),
            EffectKind::Bind => self.effect_bind(ctx, effect),
            EffectKind::QuestComplete => self.effect_quest_complete(ctx, effect),
            EffectKind::Proficiency => self.effect_proficiency(ctx),
            EffectKind::AddComboPoints => self.effect_add_combo_points(ctx, effect),
            EffectKind::Duel => self.effect_duel(ctx, effect),
            EffectKind::WeaponDamageNoSchool
            | EffectKind::WeaponDamage
            | EffectKind::NormalizedWeaponDmg => self.effect_weapon_damage(ctx, effect, false),
            EffectKind::WeaponPercentDamage => self.effect_weapon_damage(ctx, effect, true),
            EffectKind::CreateItem => self.effect_create_item(ctx, effect),
            EffectKind::TeleportUnits => self.effect_teleport(ctx, effect),
            EffectKind::TriggerSpell => self.effect_trigger_spell(ctx, effect),
            EffectKind::Energize => self.effect_energize(ctx, effect),
            EffectKind::PowerBurn => self.effect_power_burn(ctx, effect),
            EffectKind::Charge => self.effect_charge(ctx, effect),
            EffectKind::OpenLock | EffectKind::OpenLockItem => self.effect_open_lock(ctx),
            EffectKind::ApplyAreaAuraParty => self.effect_area_aura_party(ctx, effect, index),
            EffectKind::Dispel => self.effect_dispel(ctx, effect),
            EffectKind::Summon => self.effect_summon(ctx, effect),
            EffectKind::ScriptEffect => self.effect_script(ctx, effect, index),
            EffectKind::AttackMe => self.effect_attack_me(ctx, effect),
            EffectKind::StealBeneficialBuff => self.effect_steal(ctx, effect),
            EffectKind::ApplyAura => self.effect_apply_aura(ctx, effect, index),
            EffectKind::SchoolDamage => self.effect_school_damage(ctx, effect),
            EffectKind::None | EffectKind::Dummy => Ok(()),
        }
    }

    /// Sends the deferred logs, then lands the accumulated melee strikes.
    fn complete_effects(&mut self, ctx: &mut EffectContext) {
        for (source, notification) in core::mem::take(&mut ctx.deferred) {
            self.broadcast(source, notification);
        }
        if !ctx.melee.is_empty() {
            self.execute_melee_attack(ctx);
        }
    }

    // ===== cooldowns =====

    /// Starts the spell cooldown, or the item spell cooldown when cast from
    /// an item that overrides it, and propagates the category cooldown.
    fn apply_cooldowns(&mut self, ctx: &EffectContext) {
        let spell = &ctx.spell;
        let mut cooldown = spell.cooldown;
        let mut category_cooldown = spell.category_cooldown;

        let is_player = self.units.get(&ctx.caster).is_some_and(|u| u.is_player());
        if is_player
            && let Some(entry) = ctx.item_entry
            && let Some(item_spell) = self.data.item(entry).and_then(|item| item.spell(spell.id))
            && item_spell.trigger == ItemSpellTrigger::OnUse
            && (item_spell.cooldown.unwrap_or(0) > 0 || item_spell.category_cooldown.unwrap_or(0) > 0)
        {
            cooldown = item_spell.cooldown.unwrap_or(0);
            category_cooldown = item_spell.category_cooldown.unwrap_or(0);
        }

        let duration = if cooldown > 0 { cooldown } else { category_cooldown };
        if duration == 0 {
            return;
        }

        let now = self.clock;
        let category: Vec<SpellId> = if spell.category != 0 && category_cooldown > 0 {
            self.data
                .category_spells(spell.category)
                .iter()
                .copied()
                .filter(|s| *s != spell.id)
                .collect()
        } else {
            Vec::new()
        };
        let Some(caster) = self.units.get_mut(&ctx.caster) else {
            return;
        };
        caster.set_cooldown(spell.id, now + duration);
        for other in category {
            caster.set_cooldown(other, now + category_cooldown);
        }
    }

    // ===== shared helpers =====

    /// Units an effect slot lands on.
    ///
    /// `hostile` selects which side of the caster area effects pick.
    pub(crate) fn resolve_targets(
        &self,
        ctx: &EffectContext,
        effect: &SpellEffect,
        hostile: bool,
    ) -> Vec<Guid> {
        let Some(caster) = self.units.get(&ctx.caster) else {
            return Vec::new();
        };
        match effect.target_a {
            EffectTarget::Caster => vec![caster.guid],
            EffectTarget::Selected => {
                let selected = match ctx.target {
                    TargetSelector::Unit(guid) => guid,
                    TargetSelector::SelfCast
                    | TargetSelector::Location(_)
                    | TargetSelector::Item(_) => caster.guid,
                    TargetSelector::GameObject(_) => return Vec::new(),
                };
                match self.units.get(&selected) {
                    Some(unit) if unit.is_alive() => vec![selected],
                    _ => Vec::new(),
                }
            }
            EffectTarget::CasterArea => self
                .units_in_radius(caster.map, caster.position, effect.radius)
                .into_iter()
                .filter(|guid| {
                    self.units.get(guid).is_some_and(|unit| {
                        if hostile {
                            unit.guid != caster.guid && caster.is_hostile_to(unit)
                        } else {
                            !caster.is_hostile_to(unit)
                        }
                    })
                })
                .collect(),
        }
    }

    /// Resolves one target through the attack table.
    pub(crate) fn roll(
        &mut self,
        ctx: &EffectContext,
        effect: &SpellEffect,
        target: Guid,
        mode: ResolutionMode,
    ) -> Option<AttackRoll> {
        let table = self.attack_table.clone();
        let caster = self.units.get(&ctx.caster)?;
        let victim = self.units.get(&target)?;
        let attack = AttackContext {
            caster,
            target: victim,
            spell: &ctx.spell,
            effect,
            mode,
        };
        let rng: &mut dyn RngCore = &mut self.rng;
        Some(table.resolve(&attack, rng))
    }

    /// Rolls the base points of an effect slot for the caster.
    pub(crate) fn effect_points(&mut self, ctx: &EffectContext, effect: &SpellEffect) -> i32 {
        let (level, combo) = self
            .units
            .get(&ctx.caster)
            .map_or((1, 0), |u| (u.level, u.combo_points()));
        calculate_effect_base_points(effect, &ctx.spell, level, combo, ctx.base_points, &mut self.rng)
    }

    /// Base points scaled by the caster's spell power in the spell's school.
    pub(crate) fn scaled_points(&mut self, ctx: &EffectContext, effect: &SpellEffect) -> u32 {
        let base = self.effect_points(ctx, effect);
        let (power, bonus_pct) = self.spell_power(ctx.caster, ctx.school());
        spell_points_total(&self.config, base, ctx.cast_time, power, bonus_pct)
    }

    /// Soaks damage with the target's absorb auras. Drained shields are
    /// queued for removal.
    pub(crate) fn absorb_damage(&mut self, target: Guid, damage: u32, school: SpellSchools) -> u32 {
        if damage == 0 {
            return 0;
        }
        let Some(unit) = self.units.get_mut(&target) else {
            return 0;
        };
        let result = unit.auras.consume_absorb(damage, school);
        for aura in result.depleted {
            trace!(unit = %target, %aura, "absorb shield depleted");
            self.post(WorkItem::RemoveAura { unit: target, aura });
        }
        result.absorbed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_order_ends_with_aura_then_damage() {
        let n = DISPATCH_ORDER.len();
        assert_eq!(DISPATCH_ORDER[n - 2], EffectKind::ApplyAura);
        assert_eq!(DISPATCH_ORDER[n - 1], EffectKind::SchoolDamage);
        let heal = DISPATCH_ORDER.iter().position(|k| *k == EffectKind::Heal);
        let damage = DISPATCH_ORDER.iter().position(|k| *k == EffectKind::SchoolDamage);
        assert!(heal < damage);
    }

    #[test]
    fn dispatch_order_has_no_duplicates() {
        for (i, kind) in DISPATCH_ORDER.iter().enumerate() {
            assert!(!DISPATCH_ORDER[i + 1..].contains(kind), "{kind:?} listed twice");
        }
    }

    #[test]
    fn melee_strikes_accumulate_and_keep_first_roll() {
        let mut ctx = EffectContext {
            cast: CastId(1),
            caster: Guid(1),
            spell: Arc::new(SpellEntry::new(SpellId(1), "Heroic Strike")),
            target: TargetSelector::Unit(Guid(2)),
            base_points: None,
            cast_time: 0,
            item: None,
            item_entry: None,
            is_proc: false,
            melee: Vec::new(),
            deferred: Vec::new(),
        };
        let crit = AttackRoll::new(crate::combat::HitOutcome::CriticalHit, 0.0);
        ctx.add_melee(Guid(2), 40, crit);
        ctx.add_melee(Guid(2), 15, AttackRoll::normal());
        ctx.add_melee(Guid(3), 10, AttackRoll::normal());

        assert_eq!(ctx.melee_strikes().len(), 2);
        assert_eq!(ctx.melee_strikes()[0].damage, 55);
        assert_eq!(ctx.melee_roll(Guid(2)), Some(crit));
    }
}
