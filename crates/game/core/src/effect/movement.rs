//! Teleport, charge and bind point effects.

use tracing::debug;

use crate::cast::travel_time;
use crate::env::{Destination, SpellEffect, WorldLocation};
use crate::world::{Notification, World};

use super::{EffectContext, EffectError};

impl World {
    /// Moves targets to the destination named by `target_b`.
    ///
    /// Characters may change maps; creatures are only relocated within the
    /// map they are on.
    pub(super) fn effect_teleport(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let caster = self
            .units
            .get(&ctx.caster)
            .ok_or(EffectError::CasterGone(ctx.caster))?;
        let destination = match effect.target_b {
            Destination::Home => caster
                .character
                .as_ref()
                .map(|c| c.home)
                .ok_or(EffectError::RequiresCharacter(ctx.caster))?,
            Destination::Database => ctx
                .spell
                .target_location
                .ok_or(EffectError::UnhandledDestination(Destination::Database))?,
            Destination::Caster => WorldLocation {
                map: caster.map,
                position: caster.position,
                orientation: caster.orientation,
            },
            Destination::None => return Err(EffectError::UnhandledDestination(Destination::None)),
        };

        for target in self.resolve_targets(ctx, effect, false) {
            let Some(unit) = self.units.get_mut(&target) else {
                continue;
            };
            if unit.is_player() {
                if unit.map != destination.map {
                    unit.map = destination.map;
                    self.notify(
                        target,
                        Notification::TransferPending {
                            unit: target,
                            map: destination.map,
                        },
                    );
                }
            } else if unit.map != destination.map {
                debug!(unit = %target, map = destination.map, "creatures don't change maps");
                continue;
            }
            self.relocate_unit(target, destination.position, destination.orientation);
            self.broadcast(
                target,
                Notification::Teleported {
                    unit: target,
                    location: destination,
                },
            );
        }
        Ok(())
    }

    /// Rushes the caster to the first hostile target, stopping at melee
    /// range.
    pub(super) fn effect_charge(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let Some(target) = self.resolve_targets(ctx, effect, true).first().copied() else {
            return Err(EffectError::NoTarget);
        };
        let caster = self
            .units
            .get(&ctx.caster)
            .ok_or(EffectError::CasterGone(ctx.caster))?;
        let victim = self.units.get(&target).ok_or(EffectError::NoTarget)?;

        let reach = caster.combat_reach + victim.combat_reach;
        let distance = caster.distance_to(victim);
        let travel = (distance - reach).max(0.0);
        let destination = caster.position.towards(victim.position, travel);
        let orientation = (victim.position.y - caster.position.y)
            .atan2(victim.position.x - caster.position.x);
        let arrival = self.clock + travel_time(travel, self.config.charge_speed);

        self.relocate_unit(ctx.caster, destination, orientation);
        self.broadcast(
            ctx.caster,
            Notification::ChargeStarted {
                unit: ctx.caster,
                destination,
                arrival,
            },
        );
        Ok(())
    }

    /// Binds the targets' home point to the caster's location.
    pub(super) fn effect_bind(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let caster = self
            .units
            .get(&ctx.caster)
            .ok_or(EffectError::CasterGone(ctx.caster))?;
        let location = WorldLocation {
            map: caster.map,
            position: caster.position,
            orientation: caster.orientation,
        };

        for target in self.resolve_targets(ctx, effect, false) {
            let Some(character) = self
                .units
                .get_mut(&target)
                .and_then(|u| u.character.as_mut())
            else {
                continue;
            };
            character.home = location;
            self.notify(
                target,
                Notification::HomeBound {
                    unit: target,
                    location,
                },
            );
        }
        Ok(())
    }
}
