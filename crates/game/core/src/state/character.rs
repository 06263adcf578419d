use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::config::GameConfig;
use crate::env::WorldLocation;

use super::{Guid, Inventory};

/// Player-only extension of a unit.
///
/// Capabilities such as combo points or an inventory are reached through
/// [`Unit::character`](super::Unit::character) instead of narrowing the unit type.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub combo_points: u8,
    pub combo_target: Option<Guid>,
    pub home: WorldLocation,
    /// Weapon subclass mask the character can use.
    pub weapon_proficiency: u32,
    /// Armor subclass mask the character can wear.
    pub armor_proficiency: u32,
    pub completed_quests: BTreeSet<u32>,
    pub inventory: Inventory,
    pub group: ArrayVec<Guid, { GameConfig::MAX_GROUP_MEMBERS }>,
}

impl Character {
    pub fn new(home: WorldLocation) -> Self {
        Self {
            home,
            ..Self::default()
        }
    }

    /// Adds combo points on `target`; switching targets starts over.
    pub fn add_combo_points(&mut self, target: Guid, points: u8) {
        if self.combo_target != Some(target) {
            self.combo_target = Some(target);
            self.combo_points = 0;
        }
        self.combo_points = self
            .combo_points
            .saturating_add(points)
            .min(GameConfig::MAX_COMBO_POINTS);
    }

    /// Adds a group member. Returns false if already present or the group is full.
    pub fn join_group(&mut self, member: Guid) -> bool {
        !self.group.contains(&member) && self.group.try_push(member).is_ok()
    }

    pub fn reset_combo_points(&mut self) {
        self.combo_points = 0;
        self.combo_target = None;
    }

    /// Marks a quest as done. Returns false if it already was.
    pub fn complete_quest(&mut self, quest: u32) -> bool {
        self.completed_quests.insert(quest)
    }
}
