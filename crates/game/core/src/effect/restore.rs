//! Resource restoring and draining effects.

use tracing::{trace, warn};

use crate::cast::TargetSelector;
use crate::combat::{HitOutcome, ResolutionMode, crit_heal};
use crate::env::{PowerType, SpellEffect};
use crate::world::{Notification, World};

use super::{EffectContext, EffectError};

impl World {
    pub(super) fn effect_heal(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        for target in self.resolve_targets(ctx, effect, false) {
            let Some(roll) =
                self.roll(ctx, effect, target, ResolutionMode::Beneficial { can_crit: true })
            else {
                continue;
            };
            let amount = if roll.outcome == HitOutcome::Immune {
                0
            } else {
                let points = self.scaled_points(ctx, effect);
                crit_heal(points, roll.outcome)
            };

            let Some(unit) = self.units.get_mut(&target) else {
                continue;
            };
            if !unit.is_alive() {
                continue;
            }
            unit.heal(amount);
            self.broadcast(
                ctx.caster,
                Notification::HealLog {
                    caster: ctx.caster,
                    target,
                    spell: ctx.spell.id,
                    amount,
                    critical: roll.outcome == HitOutcome::CriticalHit,
                },
            );
        }
        Ok(())
    }

    /// Restores the power pool named by `misc_value_a`.
    pub(super) fn effect_energize(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let power_type = match PowerType::from_misc(effect.misc_value_a) {
            Some(power) if effect.misc_value_a >= 0 => power,
            _ => return Err(EffectError::InvalidPowerType(effect.misc_value_a)),
        };

        for target in self.resolve_targets(ctx, effect, false) {
            let Some(roll) =
                self.roll(ctx, effect, target, ResolutionMode::Beneficial { can_crit: true })
            else {
                continue;
            };
            let points = self.effect_points(ctx, effect).max(0) as u32;
            let amount = if roll.outcome == HitOutcome::Immune { 0 } else { points };

            let Some(unit) = self.units.get_mut(&target) else {
                continue;
            };
            unit.energize(power_type, amount);
            self.broadcast(
                ctx.caster,
                Notification::EnergizeLog {
                    caster: ctx.caster,
                    target,
                    spell: ctx.spell.id,
                    power_type,
                    amount,
                },
            );
        }
        Ok(())
    }

    /// Drains power from the selected unit. Drained mana flows back to a
    /// mana-using caster.
    pub(super) fn effect_power_drain(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let points = self.effect_points(ctx, effect);
        let power_type = PowerType::from_misc(effect.misc_value_a)
            .ok_or(EffectError::InvalidPowerType(effect.misc_value_a))?;

        let target = match ctx.target {
            TargetSelector::SelfCast => ctx.caster,
            TargetSelector::Unit(guid) => guid,
            _ => return Err(EffectError::NoTarget),
        };
        let Some(unit) = self.units.get_mut(&target) else {
            return Err(EffectError::NoTarget);
        };

        if unit.power_type != power_type || points <= 0 {
            trace!(target = %target, "nothing to drain");
            return Ok(());
        }
        let current = unit.power(power_type);
        if current == 0 {
            return Ok(());
        }
        let drained = (points as u32).min(current);
        unit.set_power(power_type, current - drained);

        if power_type != PowerType::Mana {
            return Ok(());
        }
        let Some(caster) = self.units.get_mut(&ctx.caster) else {
            warn!(caster = %ctx.caster, "drain caster left the world");
            return Ok(());
        };
        if caster.power_type != PowerType::Mana {
            return Ok(());
        }
        caster.energize(PowerType::Mana, drained);
        self.broadcast(
            ctx.caster,
            Notification::EnergizeLog {
                caster: ctx.caster,
                target: ctx.caster,
                spell: ctx.spell.id,
                power_type,
                amount: drained,
            },
        );
        Ok(())
    }
}
