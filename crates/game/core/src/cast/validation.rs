//! Completion checks and resource consumption.

use tracing::warn;

use crate::env::{ItemOracle, PowerType};
use crate::math::is_in_arc;
use crate::state::Guid;
use crate::world::{Notification, World};

use super::{CastFailure, CastId, TargetSelector};

/// Resolved cost of one cast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ResourceCost {
    pub power: PowerType,
    pub amount: u32,
    /// Item stack to take one charge from.
    pub item: Option<Guid>,
}

impl World {
    /// True while the cast's selection still points at something that exists.
    pub(crate) fn target_resolves(&self, id: CastId) -> bool {
        let Some(cast) = self.casts.get(&id) else {
            return false;
        };
        match cast.target {
            TargetSelector::SelfCast | TargetSelector::Location(_) | TargetSelector::Item(_) => true,
            TargetSelector::Unit(guid) => self.units.get(&guid).is_some_and(|u| u.is_alive()),
            TargetSelector::GameObject(guid) => self.objects.contains_key(&guid),
        }
    }

    /// Re-checks range, line of sight and facing against the live target.
    pub(crate) fn validate_completion(&self, id: CastId) -> Result<(), CastFailure> {
        let Some(cast) = self.casts.get(&id) else {
            return Ok(());
        };
        let Some(caster) = self.units.get(&cast.caster) else {
            return Ok(());
        };
        let spell = &cast.spell;
        let target = cast
            .target_unit()
            .filter(|guid| *guid != caster.guid)
            .and_then(|guid| self.units.get(&guid));

        if spell.has_range()
            && let Some(target) = target
        {
            let combat_reach = target.combat_reach + caster.combat_reach;
            let distance = caster.distance_to(target);
            if spell.min_range > 0.0 && distance < spell.min_range {
                return Err(CastFailure::TooClose {
                    distance,
                    min: spell.min_range,
                });
            }
            if spell.max_range > 0.0 && distance > spell.max_range + combat_reach {
                return Err(CastFailure::OutOfRange {
                    distance,
                    max: spell.max_range + combat_reach,
                });
            }
            if !self
                .terrain
                .is_in_line_of_sight(caster.map, caster.position, target.position)
            {
                return Err(CastFailure::LineOfSight);
            }
        }

        if spell.facing
            && let Some(target) = target
            && !is_in_arc(
                caster.position,
                caster.orientation,
                self.config.facing_arc,
                target.position,
            )
        {
            return Err(CastFailure::NotInFront);
        }

        Ok(())
    }

    /// Works out what the cast costs and whether the caster can pay it.
    pub(crate) fn check_resources(&self, id: CastId) -> Result<ResourceCost, CastFailure> {
        let Some(cast) = self.casts.get(&id) else {
            return Ok(ResourceCost::default());
        };
        let Some(caster) = self.units.get(&cast.caster) else {
            return Ok(ResourceCost::default());
        };
        let spell = &cast.spell;

        let amount = if spell.cost > 0 {
            spell.cost
        } else if spell.cost_pct > 0 {
            match spell.power_type {
                PowerType::Health => caster.base_health * spell.cost_pct / 100,
                PowerType::Mana => caster.base_mana * spell.cost_pct / 100,
                _ => 0,
            }
        } else {
            0
        };

        if amount > 0 {
            let available = caster.power(spell.power_type);
            // Paying with health may not kill the caster.
            let affordable = match spell.power_type {
                PowerType::Health => available > amount,
                _ => available >= amount,
            };
            if !affordable {
                return Err(CastFailure::NoPower {
                    power: spell.power_type,
                    required: amount,
                    available,
                });
            }
        }

        let mut item = None;
        if let Some(item_guid) = cast.item
            && let Some(character) = caster.character.as_ref()
        {
            let (_, stack) = character
                .inventory
                .find(item_guid)
                .ok_or(CastFailure::ItemNotFound(item_guid))?;
            let consumed = self
                .data
                .item(stack.entry)
                .and_then(|entry| entry.spell(spell.id))
                .is_some_and(|s| s.is_consumed_on_use());
            if consumed {
                item = Some(item_guid);
            }
        }

        Ok(ResourceCost {
            power: spell.power_type,
            amount,
            item,
        })
    }

    /// Deducts power and item charges. Nothing is deducted unless every
    /// check passes.
    pub(crate) fn consume_resources(&mut self, id: CastId) -> Result<(), CastFailure> {
        let cost = self.check_resources(id)?;
        let Some(caster_guid) = self.casts.get(&id).map(|c| c.caster) else {
            return Ok(());
        };
        let clock = self.clock;
        let Some(caster) = self.units.get_mut(&caster_guid) else {
            return Ok(());
        };

        if cost.amount > 0 {
            let current = caster.power(cost.power);
            caster.set_power(cost.power, current - cost.amount);
            if cost.power == PowerType::Mana {
                caster.last_mana_use = clock;
            }
        }

        if let Some(item_guid) = cost.item
            && let Some(character) = caster.character.as_mut()
        {
            let entry = character.inventory.find(item_guid).map(|(_, s)| s.entry);
            if let Err(error) = character.inventory.remove_one(item_guid) {
                warn!(caster = %caster_guid, item = %item_guid, %error, "could not consume item");
                if let Some(item) = entry {
                    self.notify(
                        caster_guid,
                        Notification::InventoryChangeFailure {
                            owner: caster_guid,
                            item,
                            error,
                        },
                    );
                }
                return Err(CastFailure::ItemNotFound(item_guid));
            }
        }

        Ok(())
    }
}
