//! Effects that reach beyond the targets' health and power: objects,
//! summons, threat, triggered casts, and scripts.

use tracing::{debug, trace, warn};

use crate::cast::{CastError, CastRequest, TargetSelector};
use crate::env::{CreatureOracle, SpellEffect};
use crate::script::ScriptContext;
use crate::state::{GameObjectKind, Guid, Unit};
use crate::world::{Notification, World};

use super::{EffectContext, EffectError};

impl World {
    /// Opens the targeted game object: doors and buttons toggle, chests show
    /// their loot to characters.
    pub(super) fn effect_open_lock(&mut self, ctx: &mut EffectContext) -> Result<(), EffectError> {
        let TargetSelector::GameObject(guid) = ctx.target else {
            debug!(caster = %ctx.caster, spell = ctx.spell.id.0, "open lock without object target");
            return Ok(());
        };
        let is_player = self.units.get(&ctx.caster).is_some_and(|u| u.is_player());
        let object = self.objects.get_mut(&guid).ok_or(EffectError::NoTarget)?;

        match object.kind {
            GameObjectKind::Door | GameObjectKind::Button => {
                let state = object.toggle();
                self.broadcast(guid, Notification::ObjectStateChanged { object: guid, state });
            }
            GameObjectKind::Chest if is_player && !object.loot.is_empty() => {
                let items = object.loot.clone();
                self.notify(
                    ctx.caster,
                    Notification::LootOpened {
                        looter: ctx.caster,
                        object: guid,
                        items,
                    },
                );
            }
            GameObjectKind::Chest | GameObjectKind::Generic => {}
        }

        self.broadcast(
            guid,
            Notification::ObjectInteraction {
                unit: ctx.caster,
                object: guid,
            },
        );
        Ok(())
    }

    /// Spawns the creature in `summon_unit` next to the caster. The summon
    /// joins the fight against the caster's victim.
    pub(super) fn effect_summon(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let data = self.data.clone();
        let entry = data
            .creature(effect.summon_unit)
            .ok_or(EffectError::MissingCreature(effect.summon_unit))?;
        let caster = self
            .units
            .get(&ctx.caster)
            .ok_or(EffectError::CasterGone(ctx.caster))?;

        let mut summon = Unit::from_creature(Guid::NONE, entry)
            .with_map(caster.map)
            .with_position(caster.position, caster.orientation);
        summon.summoned_by = Some(ctx.caster);
        if let Some(victim) = caster.victim {
            summon.victim = Some(victim);
            summon.add_threat(victim, 0.0001);
        }

        let guid = self.spawn_unit(summon);
        self.broadcast(
            guid,
            Notification::CreatureSummoned {
                summoner: ctx.caster,
                unit: guid,
                entry: entry.id,
            },
        );
        Ok(())
    }

    /// Raises the targets' duel flag by making them cast it on themselves.
    pub(super) fn effect_duel(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let flag = self.config.duel_flag_spell;
        for target in self.resolve_targets(ctx, effect, true) {
            self.broadcast(
                ctx.caster,
                Notification::DuelRequested {
                    challenger: ctx.caster,
                    target,
                },
            );
            let request = CastRequest::new(target, flag, TargetSelector::SelfCast)
                .with_cast_time(0)
                .triggered();
            if let Err(error) = self.begin_cast(request) {
                warn!(unit = %target, spell = flag.0, %error, "duel flag not raised");
            }
        }
        Ok(())
    }

    /// Puts the caster at the top of each target's threat list.
    pub(super) fn effect_attack_me(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        for target in self.resolve_targets(ctx, effect, true) {
            let Some(unit) = self.units.get_mut(&target) else {
                continue;
            };
            let Some((_, top)) = unit.top_threat() else {
                continue;
            };
            let missing = top - unit.threat_of(ctx.caster);
            if missing > 0.0 {
                unit.add_threat(ctx.caster, missing);
            }
        }
        Ok(())
    }

    /// Casts `trigger_spell` as a triggered spell against the same target.
    pub(super) fn effect_trigger_spell(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let Some(spell) = effect.trigger_spell else {
            warn!(spell = ctx.spell.id.0, "trigger effect without a spell to trigger");
            return Ok(());
        };
        let request = CastRequest::new(ctx.caster, spell, ctx.target)
            .with_cast_time(0)
            .triggered();
        match self.begin_cast(request) {
            Ok(_) => Ok(()),
            Err(CastError::UnknownSpell(id)) => Err(EffectError::MissingSpell(id)),
            Err(error) => {
                warn!(caster = %ctx.caster, spell = spell.0, %error, "triggered spell not cast");
                Ok(())
            }
        }
    }

    pub(super) fn effect_script(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
        index: usize,
    ) -> Result<(), EffectError> {
        let Some(script) = self.scripts.get(ctx.spell.id) else {
            trace!(spell = ctx.spell.id.0, "no script registered");
            return Ok(());
        };
        let base_points = self.effect_points(ctx, effect);
        let script_ctx = ScriptContext {
            cast: ctx.cast,
            caster: ctx.caster,
            spell: &ctx.spell,
            effect,
            effect_index: index,
            target: ctx.target,
            base_points,
        };
        script.on_script_effect(self, &script_ctx)
    }
}
