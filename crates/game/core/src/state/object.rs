use crate::env::ItemId;
use crate::math::Vec3;

use super::Guid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameObjectKind {
    Door,
    Button,
    Chest,
    #[default]
    Generic,
}

/// Non-unit world object that spells can target (doors, chests, ...).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameObject {
    pub guid: Guid,
    pub entry: u32,
    pub name: String,
    pub kind: GameObjectKind,
    /// Door and button state; 1 is the resting state.
    pub state: u8,
    pub map: u32,
    pub position: Vec3,
    pub loot: Vec<(ItemId, u16)>,
}

impl GameObject {
    pub fn new(guid: Guid, kind: GameObjectKind, position: Vec3) -> Self {
        Self {
            guid,
            kind,
            state: 1,
            position,
            ..Self::default()
        }
    }

    /// Flips a door or button between its two states.
    pub fn toggle(&mut self) -> u8 {
        self.state = if self.state == 1 { 0 } else { 1 };
        self.state
    }
}
