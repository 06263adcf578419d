//! Damage effects: school damage, instant kill, power burn, weapon strikes.

use rand::Rng;
use tracing::trace;

use crate::combat::{HitOutcome, ResolutionMode, mitigate};
use crate::env::{PowerType, SpellEffect};
use crate::world::{Notification, World};

use super::{EffectContext, EffectError};

impl World {
    pub(super) fn effect_instant_kill(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        for target in self.resolve_targets(ctx, effect, true) {
            let Some(health) = self.units.get(&target).map(|u| u.health) else {
                continue;
            };
            self.damage_unit(ctx.caster, target, health, true);
        }
        Ok(())
    }

    /// Spell-power scaled damage. Logs are sent after every handler ran.
    pub(super) fn effect_school_damage(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let school = ctx.school();
        for target in self.resolve_targets(ctx, effect, true) {
            let Some(roll) = self.roll(ctx, effect, target, ResolutionMode::Hostile) else {
                continue;
            };
            if roll.outcome.is_avoided() {
                ctx.defer(
                    ctx.caster,
                    Notification::SpellMiss {
                        caster: ctx.caster,
                        target,
                        spell: ctx.spell.id,
                        outcome: roll.outcome,
                    },
                );
                continue;
            }

            let raw = self.scaled_points(ctx, effect);
            let mitigation = mitigate(raw, roll.outcome, 0, roll.resist_pct);
            let absorbed = self.absorb_damage(target, mitigation.total, school);
            let dealt = mitigation.total - absorbed;

            if !self.units.get(&target).is_some_and(|u| u.is_alive()) {
                continue;
            }
            self.damage_unit(ctx.caster, target, dealt, ctx.no_threat());
            ctx.defer(
                ctx.caster,
                Notification::SpellDamageLog {
                    caster: ctx.caster,
                    target,
                    spell: ctx.spell.id,
                    school,
                    damage: dealt,
                    absorbed,
                    resisted: mitigation.resisted,
                    blocked: 0,
                    critical: roll.outcome == HitOutcome::CriticalHit,
                },
            );
        }
        Ok(())
    }

    /// Burns target mana and deals `multiple_value` damage per point burnt.
    pub(super) fn effect_power_burn(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let school = ctx.school();
        for target in self.resolve_targets(ctx, effect, true) {
            let Some(roll) = self.roll(ctx, effect, target, ResolutionMode::Hostile) else {
                continue;
            };
            if roll.outcome.is_avoided() {
                self.broadcast(
                    ctx.caster,
                    Notification::SpellMiss {
                        caster: ctx.caster,
                        target,
                        spell: ctx.spell.id,
                        outcome: roll.outcome,
                    },
                );
                continue;
            }

            let points = self.effect_points(ctx, effect).max(0) as u32;
            let resisted = (points as f32 * (roll.resist_pct / 100.0)) as u32;
            let Some(unit) = self.units.get_mut(&target) else {
                continue;
            };
            let mana = unit.power(PowerType::Mana);
            let burnt = points.saturating_sub(resisted).min(mana);
            unit.set_power(PowerType::Mana, mana - burnt);

            let damage = (burnt as f32 * effect.multiple_value).max(0.0) as u32;
            let absorbed = self.absorb_damage(target, damage, school);
            if !self.units.get(&target).is_some_and(|u| u.is_alive()) {
                continue;
            }
            self.damage_unit(ctx.caster, target, damage - absorbed, ctx.no_threat());
            self.broadcast(
                ctx.caster,
                Notification::SpellDamageLog {
                    caster: ctx.caster,
                    target,
                    spell: ctx.spell.id,
                    school,
                    damage: damage - absorbed,
                    absorbed,
                    resisted,
                    blocked: 0,
                    critical: false,
                },
            );
        }
        Ok(())
    }

    /// Weapon-based special attack. Damage is only accumulated here; the
    /// strike lands once all handlers have run.
    ///
    /// # Formula
    ///
    /// ```text
    /// flat    : damage = base_points + weapon_roll
    /// percent : damage = weapon_roll * base_points / 100
    /// damage  = armor_reduced(damage)
    /// ```
    pub(super) fn effect_weapon_damage(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
        percent: bool,
    ) -> Result<(), EffectError> {
        let (level, min, max) = self
            .units
            .get(&ctx.caster)
            .map(|u| (u.level, u.min_damage, u.max_damage))
            .ok_or(EffectError::CasterGone(ctx.caster))?;

        for target in self.resolve_targets(ctx, effect, true) {
            let roll = match ctx.melee_roll(target) {
                Some(roll) => roll,
                None => match self.roll(ctx, effect, target, ResolutionMode::SpecialMelee) {
                    Some(roll) => roll,
                    None => continue,
                },
            };
            if roll.outcome.is_avoided() {
                ctx.add_melee(target, 0, roll);
                continue;
            }

            let points = self.effect_points(ctx, effect);
            let weapon = if max > min {
                self.rng.gen_range(min..=max)
            } else {
                min
            };
            let mut damage = if percent {
                weapon.max(0.0) as u32
            } else {
                (points as f32 + weapon).max(0.0) as u32
            };
            let Some(victim) = self.units.get(&target) else {
                continue;
            };
            damage = victim.armor_reduced_damage(level, damage);
            if percent {
                damage = (damage as f64 * (f64::from(points) / 100.0)).max(0.0) as u32;
            }
            ctx.add_melee(target, damage, roll);
        }
        Ok(())
    }

    /// Lands the accumulated weapon damage on every struck target.
    ///
    /// # Order
    ///
    /// ```text
    /// block / crit / crushing / resist  (see `mitigate`)
    /// absorb
    /// health
    /// ```
    pub(super) fn execute_melee_attack(&mut self, ctx: &EffectContext) {
        let school = ctx.school();
        for strike in ctx.melee_strikes().iter().copied() {
            let Some(victim) = self.units.get(&strike.target) else {
                continue;
            };
            if !victim.is_alive() {
                trace!(target = %strike.target, "melee strike on dead target dropped");
                continue;
            }
            if strike.roll.outcome.is_avoided() {
                self.broadcast(
                    ctx.caster,
                    Notification::SpellMiss {
                        caster: ctx.caster,
                        target: strike.target,
                        spell: ctx.spell.id,
                        outcome: strike.roll.outcome,
                    },
                );
                continue;
            }

            let block_value = victim.block_value.unwrap_or(self.config.default_block_value);
            let mitigation = mitigate(
                strike.damage,
                strike.roll.outcome,
                block_value,
                strike.roll.resist_pct,
            );
            let absorbed = self.absorb_damage(strike.target, mitigation.total, school);
            let dealt = mitigation.total - absorbed;
            self.damage_unit(ctx.caster, strike.target, dealt, ctx.no_threat());
            self.broadcast(
                ctx.caster,
                Notification::SpellDamageLog {
                    caster: ctx.caster,
                    target: strike.target,
                    spell: ctx.spell.id,
                    school,
                    damage: dealt,
                    absorbed,
                    resisted: mitigation.resisted,
                    blocked: mitigation.blocked,
                    critical: strike.roll.outcome == HitOutcome::CriticalHit,
                },
            );
        }
    }
}
