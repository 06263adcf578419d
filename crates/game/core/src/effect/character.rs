//! Effects that only make sense on characters.

use tracing::debug;

use crate::env::{ItemId, ItemOracle, SpellEffect, item_class};
use crate::state::Guid;
use crate::world::{Notification, World};

use super::{EffectContext, EffectError};

impl World {
    pub(super) fn effect_quest_complete(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let quest = effect.misc_value_a as u32;
        for target in self.resolve_targets(ctx, effect, false) {
            let Some(character) = self
                .units
                .get_mut(&target)
                .and_then(|u| u.character.as_mut())
            else {
                continue;
            };
            if character.complete_quest(quest) {
                self.notify(target, Notification::QuestCompleted { unit: target, quest });
            }
        }
        Ok(())
    }

    /// Teaches the caster the weapon or armor subclasses of the spell.
    pub(super) fn effect_proficiency(&mut self, ctx: &mut EffectContext) -> Result<(), EffectError> {
        let character = self
            .units
            .get_mut(&ctx.caster)
            .and_then(|u| u.character.as_mut())
            .ok_or(EffectError::RequiresCharacter(ctx.caster))?;

        let item_class = ctx.spell.item_class;
        let mask = ctx.spell.item_subclass_mask;
        let proficiency = match item_class {
            item_class::WEAPON => &mut character.weapon_proficiency,
            item_class::ARMOR => &mut character.armor_proficiency,
            _ => return Ok(()),
        };
        if *proficiency & mask == mask {
            return Ok(());
        }
        *proficiency |= mask;
        let mask = *proficiency;
        self.notify(
            ctx.caster,
            Notification::ProficiencyChanged {
                unit: ctx.caster,
                item_class,
                mask,
            },
        );
        Ok(())
    }

    pub(super) fn effect_add_combo_points(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let points = self.effect_points(ctx, effect).clamp(0, i32::from(u8::MAX)) as u8;
        let target = ctx.target.unit_guid(ctx.caster).unwrap_or(Guid::NONE);
        let character = self
            .units
            .get_mut(&ctx.caster)
            .and_then(|u| u.character.as_mut())
            .ok_or(EffectError::RequiresCharacter(ctx.caster))?;

        character.add_combo_points(target, points);
        let points = character.combo_points;
        self.notify(
            ctx.caster,
            Notification::ComboPoints {
                unit: ctx.caster,
                target,
                points,
            },
        );
        Ok(())
    }

    /// Creates `base_points` items of `item_type` in each target character's
    /// backpack. The owner and their group see one push result per slot.
    pub(super) fn effect_create_item(
        &mut self,
        ctx: &mut EffectContext,
        effect: &SpellEffect,
    ) -> Result<(), EffectError> {
        let item_id = ItemId(effect.item_type);
        let data = self.data.clone();
        let entry = data.item(item_id).ok_or(EffectError::MissingItem(item_id))?;
        let count = self.effect_points(ctx, effect).clamp(0, i32::from(u16::MAX)) as u16;

        for target in self.resolve_targets(ctx, effect, false) {
            let guids = &mut self.guids;
            let Some(character) = self
                .units
                .get_mut(&target)
                .and_then(|u| u.character.as_mut())
            else {
                continue;
            };
            let group = character.group.clone();
            match character.inventory.create_items(entry, count, || guids.allocate()) {
                Ok(pushes) => {
                    for push in pushes {
                        self.notify(target, Notification::ItemPushResult { owner: target, push });
                        for member in group.iter().copied().filter(|m| *m != target) {
                            self.notify(member, Notification::ItemPushResult { owner: target, push });
                        }
                    }
                }
                Err(error) => {
                    debug!(unit = %target, item = %item_id, %error, "item creation failed");
                    self.notify(
                        target,
                        Notification::InventoryChangeFailure {
                            owner: target,
                            item: item_id,
                            error,
                        },
                    );
                }
            }
        }
        Ok(())
    }
}
