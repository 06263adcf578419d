//! Aura effects and the aura timer lifecycle.
//!
//! Auras are added directly by the handlers. Removal, dispel and steal
//! included, always goes through the world work queue
//! ([`WorkItem::RemoveAura`], [`WorkItem::StealAura`]).

use tracing::{debug, trace, warn};

use crate::aura::{Aura, AuraId};
use crate::combat::{AttackRoll, ResolutionMode};
use crate::env::{AuraInterruptFlags, AuraType, PowerType, SpellEffect, SpellId};
use crate::state::{Guid, StandState};
use crate::timer::TimerId;
use crate::world::{Notification, TimerEvent, World, WorkItem};

use super::{EffectContext, EffectError};

impl World {
    pub(super) fn effect_apply_aura(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
        index: usize,
    ) -> Result<(), EffectError> {
        let positive = ctx.spell.is_positive_effect(effect);
        let mode = if positive {
            ResolutionMode::Beneficial { can_crit: false }
        } else {
            ResolutionMode::Hostile
        };

        for target in self.resolve_targets(ctx, effect, !positive) {
            let Some(roll) = self.roll(ctx, effect, target, mode) else {
                continue;
            };
            self.apply_aura_to(ctx, effect, index, target, roll, positive);
        }
        Ok(())
    }

    /// Buffs the caster's group members within the effect radius.
    pub(super) fn effect_area_aura_party(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
        index: usize,
    ) -> Result<(), EffectError> {
        let caster = self
            .units
            .get(&ctx.caster)
            .ok_or(EffectError::CasterGone(ctx.caster))?;
        let mut members = vec![caster.guid];
        if let Some(character) = caster.character.as_ref() {
            members.extend(character.group.iter().copied().filter(|guid| {
                self.units.get(guid).is_some_and(|u| {
                    u.map == caster.map
                        && u.is_alive()
                        && !caster.is_hostile_to(u)
                        && u.position.distance(caster.position) <= effect.radius
                })
            }));
        }
        members.dedup();

        for target in members {
            let Some(roll) =
                self.roll(ctx, effect, target, ResolutionMode::Beneficial { can_crit: false })
            else {
                continue;
            };
            self.apply_aura_to(ctx, effect, index, target, roll, true);
        }
        Ok(())
    }

    fn apply_aura_to(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
        index: usize,
        target: Guid,
        roll: AttackRoll,
        positive: bool,
    ) {
        let school = ctx.school();
        if roll.outcome.is_avoided() || roll.resist_pct >= 100.0 {
            if !school.is_physical() {
                ctx.defer(
                    ctx.caster,
                    Notification::SpellMiss {
                        caster: ctx.caster,
                        target,
                        spell: ctx.spell.id,
                        outcome: roll.outcome,
                    },
                );
            }
            return;
        }
        if !self.units.get(&target).is_some_and(|u| u.is_alive()) {
            return;
        }

        let points = if effect.aura.is_modified_by_bonus() {
            let total = self.scaled_points(ctx, effect);
            total - (total as f32 * (roll.resist_pct / 100.0)) as u32
        } else {
            self.effect_points(ctx, effect).max(0) as u32
        };

        let id = self.next_aura_id();
        let mut aura = Aura::new(id, ctx.spell.id, effect.aura, ctx.caster, target);
        aura.effect_index = index as u8;
        aura.school = school;
        aura.base_points = points as i32;
        aura.misc_value = effect.misc_value_a;
        aura.positive = positive;
        aura.dispel_type = ctx.spell.dispel_type;
        aura.amplitude = effect.amplitude;
        aura.duration = ctx.spell.duration;
        if aura.aura_type == AuraType::SchoolAbsorb {
            aura.remaining = points;
        }
        self.attach_aura(aura);

        if !positive
            && !ctx.no_threat()
            && target != ctx.caster
            && let Some(unit) = self.units.get_mut(&target)
        {
            unit.add_threat(ctx.caster, 0.0);
        }

        if ctx
            .spell
            .aura_interrupt_flags
            .contains(AuraInterruptFlags::NOT_SEATED)
            && let Some(caster) = self.units.get_mut(&ctx.caster)
        {
            caster.stand_state = StandState::Sit;
            self.broadcast(
                ctx.caster,
                Notification::StandStateChanged {
                    unit: ctx.caster,
                    state: StandState::Sit,
                },
            );
        }
    }

    /// Starts the aura's timers and adds it to its target, replacing an
    /// aura of the same spell slot and caster.
    pub(crate) fn attach_aura(&mut self, mut aura: Aura) {
        let now = self.clock;
        aura.applied_at = now;
        let (unit, id) = (aura.target, aura.id);
        if aura.is_periodic() {
            aura.tick.set_end(
                &mut self.timers,
                now + u64::from(aura.amplitude),
                TimerEvent::AuraTick { unit, aura: id },
            );
        }
        if !aura.is_permanent() {
            aura.expiry.set_end(
                &mut self.timers,
                now + aura.duration as u64,
                TimerEvent::AuraExpire { unit, aura: id },
            );
        }

        let (caster, spell) = (aura.caster, aura.spell);
        let Some(target) = self.units.get_mut(&unit) else {
            aura.tick.cancel(&mut self.timers);
            aura.expiry.cancel(&mut self.timers);
            return;
        };
        if let Some(mut replaced) = target.auras.add(aura) {
            replaced.tick.cancel(&mut self.timers);
            replaced.expiry.cancel(&mut self.timers);
            trace!(unit = %unit, aura = %replaced.id, "aura refreshed");
        }
        debug!(unit = %unit, %id, spell = spell.0, "aura applied");
        self.broadcast(
            unit,
            Notification::AuraApplied {
                target: unit,
                caster,
                spell,
                aura: id,
            },
        );
    }

    /// Cancels the timers of an aura already taken out of its container.
    fn detach_aura(&mut self, mut aura: Aura) {
        aura.tick.cancel(&mut self.timers);
        aura.expiry.cancel(&mut self.timers);
        debug!(unit = %aura.target, aura = %aura.id, spell = aura.spell.0, "aura removed");
        self.broadcast(
            aura.target,
            Notification::AuraRemoved {
                target: aura.target,
                spell: aura.spell,
                aura: aura.id,
            },
        );
    }

    /// Drains the work item posted for `aura`.
    pub(crate) fn remove_aura_now(&mut self, unit: Guid, aura: AuraId) {
        let Some(removed) = self.units.get_mut(&unit).and_then(|u| u.auras.remove(aura)) else {
            return;
        };
        self.detach_aura(removed);
    }

    // ===== dispel / steal =====

    /// Queues removal of up to `base_points` auras of the dispel type in
    /// `misc_value_a`. Buffs are stripped from hostile targets, debuffs from
    /// friendly ones.
    pub(super) fn effect_dispel(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let dispel_type = effect.misc_value_a as u32;
        for target in self.resolve_targets(ctx, effect, true) {
            let Some(count) = self.binary_points(ctx, effect, target) else {
                continue;
            };
            let Some(caster) = self.units.get(&ctx.caster) else {
                return Err(EffectError::CasterGone(ctx.caster));
            };
            let Some(unit) = self.units.get(&target) else {
                continue;
            };
            let positive = caster.is_hostile_to(unit);

            let victims = self.pick_dispel_victims(target, dispel_type, positive, count);
            if victims.is_empty() {
                continue;
            }
            let removed: Vec<SpellId> = victims.iter().map(|(_, spell)| *spell).collect();
            for (aura, _) in victims {
                self.post(WorkItem::RemoveAura { unit: target, aura });
            }
            self.broadcast(
                ctx.caster,
                Notification::DispelLog {
                    caster: ctx.caster,
                    target,
                    spell: ctx.spell.id,
                    removed,
                },
            );
        }
        Ok(())
    }

    /// Queues the transfer of up to `base_points` buffs of the dispel type in
    /// `misc_value_a` from the target onto the caster.
    pub(super) fn effect_steal(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let dispel_type = effect.misc_value_a as u32;
        for target in self.resolve_targets(ctx, effect, true) {
            let Some(count) = self.binary_points(ctx, effect, target) else {
                continue;
            };
            for (aura, stolen) in self.pick_dispel_victims(target, dispel_type, true, count) {
                self.post(WorkItem::StealAura {
                    from: target,
                    aura,
                    to: ctx.caster,
                });
                self.broadcast(
                    ctx.caster,
                    Notification::StealLog {
                        caster: ctx.caster,
                        target,
                        spell: ctx.spell.id,
                        stolen,
                    },
                );
            }
        }
        Ok(())
    }

    /// Newest-first auras of `dispel_type` on `unit`, skipping those already
    /// queued for removal.
    fn pick_dispel_victims(
        &self,
        unit: Guid,
        dispel_type: u32,
        positive: bool,
        count: u32,
    ) -> Vec<(AuraId, SpellId)> {
        let Some(auras) = self.units.get(&unit).map(|u| &u.auras) else {
            return Vec::new();
        };
        let mut taken = self.queued_removals(unit);
        let mut victims = Vec::new();
        for _ in 0..count {
            let Some(aura) = auras.peek_back(dispel_type, positive, &taken) else {
                break;
            };
            taken.push(aura.id);
            victims.push((aura.id, aura.spell));
        }
        victims
    }

    /// Drains the work item posted by a steal: the aura leaves `from` and a
    /// copy owned by `to` is applied to it.
    pub(crate) fn steal_aura_now(&mut self, from: Guid, aura: AuraId, to: Guid) {
        let Some(stolen) = self.units.get_mut(&from).and_then(|u| u.auras.remove(aura)) else {
            return;
        };
        let id = self.next_aura_id();
        let mut copy = Aura::new(id, stolen.spell, stolen.aura_type, to, to);
        copy.effect_index = stolen.effect_index;
        copy.school = stolen.school;
        copy.base_points = stolen.base_points;
        copy.remaining = stolen.remaining;
        copy.misc_value = stolen.misc_value;
        copy.positive = true;
        copy.dispel_type = stolen.dispel_type;
        copy.amplitude = stolen.amplitude;
        copy.duration = stolen.duration;

        self.detach_aura(stolen);
        if self.units.get(&to).is_some_and(|u| u.is_alive()) {
            self.attach_aura(copy);
        }
    }

    /// Hostile roll for all-or-nothing effects. Returns the rolled count, or
    /// `None` after reporting the miss.
    fn binary_points(&mut self, ctx: &EffectContext, effect: &SpellEffect, target: Guid) -> Option<u32> {
        let roll = self.roll(ctx, effect, target, ResolutionMode::Hostile)?;
        if roll.outcome.is_avoided() || roll.resist_pct >= 100.0 {
            self.broadcast(
                ctx.caster,
                Notification::SpellMiss {
                    caster: ctx.caster,
                    target,
                    spell: ctx.spell.id,
                    outcome: roll.outcome,
                },
            );
            return None;
        }
        if !self.units.get(&target).is_some_and(|u| u.is_alive()) {
            return None;
        }
        Some(self.effect_points(ctx, effect).max(0) as u32)
    }

    // ===== periodic ticks =====

    /// Fires one periodic tick and schedules the next.
    pub(crate) fn on_aura_tick(&mut self, unit: Guid, aura: AuraId, timer: TimerId) {
        let Some(snapshot) = self
            .units
            .get(&unit)
            .and_then(|u| u.auras.get(aura))
            .filter(|a| a.tick.is_timer(timer))
            .cloned()
        else {
            return;
        };
        self.run_tick(&snapshot);

        let now = self.clock;
        let Some(target) = self.units.get_mut(&unit) else {
            return;
        };
        if !target.is_alive() {
            return;
        }
        if let Some(live) = target.auras.get_mut(aura) {
            live.tick.set_end(
                &mut self.timers,
                now + u64::from(live.amplitude),
                TimerEvent::AuraTick { unit, aura },
            );
        }
    }

    /// Expiry lands a tick due at the same instant before the aura goes.
    pub(crate) fn on_aura_expire(&mut self, unit: Guid, aura: AuraId, timer: TimerId) {
        let now = self.clock;
        let Some(live) = self
            .units
            .get_mut(&unit)
            .and_then(|u| u.auras.get_mut(aura))
            .filter(|a| a.expiry.is_timer(timer))
        else {
            return;
        };
        let final_tick = live.tick.end(&self.timers) == Some(now);
        live.tick.cancel(&mut self.timers);
        let snapshot = live.clone();
        if final_tick {
            self.run_tick(&snapshot);
        }
        self.post(WorkItem::RemoveAura { unit, aura });
    }

    fn run_tick(&mut self, aura: &Aura) {
        let amount = aura.base_points.max(0) as u32;
        let (caster, target) = (aura.caster, aura.target);
        if !self.units.get(&target).is_some_and(|u| u.is_alive()) {
            return;
        }

        let logged = match aura.aura_type {
            AuraType::PeriodicDamage => {
                let absorbed = self.absorb_damage(target, amount, aura.school);
                self.damage_unit(caster, target, amount - absorbed, false);
                amount - absorbed
            }
            AuraType::PeriodicLeech => {
                let absorbed = self.absorb_damage(target, amount, aura.school);
                let drained = self.damage_unit(caster, target, amount - absorbed, false).applied;
                if let Some(caster) = self.units.get_mut(&caster) {
                    caster.heal(drained);
                }
                drained
            }
            AuraType::PeriodicHeal => self.units.get_mut(&target).map_or(0, |u| u.heal(amount)),
            AuraType::PeriodicEnergize => {
                let Some(power) = PowerType::from_misc(aura.misc_value) else {
                    warn!(unit = %target, aura = %aura.id, misc = aura.misc_value, "periodic energize without power type");
                    return;
                };
                self.units
                    .get_mut(&target)
                    .map_or(0, |u| u.energize(power, amount))
            }
            _ => return,
        };

        self.broadcast(
            caster,
            Notification::PeriodicAuraLog {
                caster,
                target,
                spell: aura.spell,
                aura_type: aura.aura_type,
                amount: logged,
            },
        );
    }
}
