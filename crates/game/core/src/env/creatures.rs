use super::PowerType;

pub trait CreatureOracle: Send + Sync {
    fn creature(&self, entry: u32) -> Option<&CreatureEntry>;
}

/// Template used when spawning creatures (summons, scenario setup).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CreatureEntry {
    pub id: u32,
    pub name: String,
    pub level: u32,
    pub faction: u32,
    pub health: u32,
    pub power_type: PowerType,
    pub power: u32,
    pub min_damage: f32,
    pub max_damage: f32,
    pub armor: u32,
    pub combat_reach: f32,
}

impl Default for CreatureEntry {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            level: 1,
            faction: 0,
            health: 1,
            power_type: PowerType::Mana,
            power: 0,
            min_damage: 1.0,
            max_damage: 2.0,
            armor: 0,
            combat_reach: 1.5,
        }
    }
}

impl CreatureEntry {
    pub fn new(id: u32, name: impl Into<String>, level: u32, health: u32) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            health,
            ..Self::default()
        }
    }
}
