use super::SpellId;

/// Identifier of an item template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub u32);

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait ItemOracle: Send + Sync {
    fn item(&self, id: ItemId) -> Option<&ItemEntry>;
}

/// Item classes referenced by proficiency effects.
pub mod item_class {
    pub const CONSUMABLE: u32 = 0;
    pub const WEAPON: u32 = 2;
    pub const ARMOR: u32 = 4;
    pub const REAGENT: u32 = 5;
}

/// When an item's spell fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemSpellTrigger {
    #[default]
    OnUse,
    OnEquip,
    ChanceOnHit,
}

/// Spell attached to an item template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemSpell {
    pub spell: SpellId,
    pub trigger: ItemSpellTrigger,
    /// Negative charges are consumed on use; zero means unlimited.
    pub charges: i32,
    /// Overrides the spell cooldown when set.
    pub cooldown: Option<u64>,
    pub category: u32,
    pub category_cooldown: Option<u64>,
}

impl ItemSpell {
    pub fn is_consumed_on_use(&self) -> bool {
        self.trigger == ItemSpellTrigger::OnUse && self.charges < 0
    }
}

/// Static item template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemEntry {
    pub id: ItemId,
    pub name: String,
    pub class: u32,
    pub subclass: u32,
    pub max_stack: u16,
    pub spells: Vec<ItemSpell>,
}

impl ItemEntry {
    pub fn new(id: ItemId, name: impl Into<String>, max_stack: u16) -> Self {
        Self {
            id,
            name: name.into(),
            max_stack: max_stack.max(1),
            ..Self::default()
        }
    }

    pub fn with_spell(mut self, spell: ItemSpell) -> Self {
        self.spells.push(spell);
        self
    }

    /// The item spell entry that casts `spell`, if any.
    pub fn spell(&self, spell: SpellId) -> Option<&ItemSpell> {
        self.spells.iter().find(|s| s.spell == spell)
    }
}
