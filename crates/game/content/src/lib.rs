//! Static spell, item, and creature tables.
//!
//! Tables are RON catalogs (`spells.ron`, `items.ron`, `creatures.ron`) plus an
//! optional `config.toml` with engine tunables. They come either from the copy
//! bundled into this crate or from a directory on disk, and are assembled into
//! a [`spell_core::GameData`] that a world instance reads through its oracle
//! traits.
//!
//! Content never appears in world state; units only hold ids into it.

pub mod bundled;
pub mod loaders;

pub use loaders::{
    ConfigLoader, ContentFactory, ContentSource, CreatureCatalog, CreatureLoader, ItemCatalog,
    ItemLoader, LoadError, LoadResult, SpellCatalog, SpellLoader,
};
