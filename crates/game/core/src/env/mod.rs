//! Read-only world data.
//!
//! Oracles expose static spell, item, and creature tables plus terrain sight
//! queries. [`GameData`] is the in-memory bundle implementing the table
//! oracles; [`GameDataOracle`] lets a world hold them behind one pointer.
mod creatures;
mod items;
mod map;
mod spell;
mod tables;

pub use creatures::{CreatureEntry, CreatureOracle};
pub use items::{ItemEntry, ItemId, ItemOracle, ItemSpell, ItemSpellTrigger, item_class};
pub use map::{MapOracle, OpenTerrain};
pub use spell::{
    AuraInterruptFlags, AuraType, Destination, EffectKind, EffectTarget, PowerType,
    SpellAttributes, SpellAttributesEx, SpellEffect, SpellEntry, SpellId, SpellOracle,
    SpellSchools, WorldLocation,
};
pub use tables::GameData;

/// All static tables a world instance reads from.
pub trait GameDataOracle: SpellOracle + ItemOracle + CreatureOracle {}

impl<T> GameDataOracle for T where T: SpellOracle + ItemOracle + CreatureOracle {}
