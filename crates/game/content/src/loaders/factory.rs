//! Content factory assembling core tables from a content source.

use std::path::{Path, PathBuf};

use spell_core::env::{CreatureOracle, ItemOracle, SpellOracle};
use spell_core::{CreatureEntry, GameConfig, GameData, ItemEntry, ItemId, SpellEntry};
use tracing::{debug, info};

use super::{ConfigLoader, CreatureLoader, ItemLoader, LoadError, LoadResult, SpellLoader};
use crate::bundled;

/// Where the table files come from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ContentSource {
    /// Copies compiled into this crate.
    #[default]
    Bundled,
    /// A directory laid out like `data/` in this crate.
    Directory(PathBuf),
}

/// Loads every table from one [`ContentSource`].
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml      (optional)
/// ├── spells.ron
/// ├── items.ron
/// └── creatures.ron
/// ```
pub struct ContentFactory {
    source: ContentSource,
}

impl ContentFactory {
    pub fn new(source: ContentSource) -> Self {
        Self { source }
    }

    pub fn bundled() -> Self {
        Self::new(ContentSource::Bundled)
    }

    pub fn directory(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(ContentSource::Directory(data_dir.into()))
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    pub fn load_spells(&self) -> LoadResult<Vec<SpellEntry>> {
        match &self.source {
            ContentSource::Bundled => SpellLoader::parse("bundled spells.ron", bundled::SPELLS),
            ContentSource::Directory(dir) => SpellLoader::load(&dir.join("spells.ron")),
        }
    }

    pub fn load_items(&self) -> LoadResult<Vec<ItemEntry>> {
        match &self.source {
            ContentSource::Bundled => ItemLoader::parse("bundled items.ron", bundled::ITEMS),
            ContentSource::Directory(dir) => ItemLoader::load(&dir.join("items.ron")),
        }
    }

    pub fn load_creatures(&self) -> LoadResult<Vec<CreatureEntry>> {
        match &self.source {
            ContentSource::Bundled => {
                CreatureLoader::parse("bundled creatures.ron", bundled::CREATURES)
            }
            ContentSource::Directory(dir) => CreatureLoader::load(&dir.join("creatures.ron")),
        }
    }

    /// Engine tunables. A directory without `config.toml` yields the defaults.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        match &self.source {
            ContentSource::Bundled => ConfigLoader::parse("bundled config.toml", bundled::CONFIG),
            ContentSource::Directory(dir) => {
                let path = dir.join("config.toml");
                if path.exists() {
                    ConfigLoader::load(&path)
                } else {
                    debug!(dir = %dir.display(), "no config.toml, using defaults");
                    Ok(GameConfig::default())
                }
            }
        }
    }

    /// Loads all tables and checks cross-table references.
    pub fn load_data(&self) -> LoadResult<GameData> {
        let mut data = GameData::new();
        for spell in self.load_spells()? {
            data.insert_spell(spell);
        }
        for item in self.load_items()? {
            data.insert_item(item);
        }
        for creature in self.load_creatures()? {
            data.insert_creature(creature);
        }
        validate(&data)?;

        info!(
            source = ?self.source,
            spells = data.spell_count(),
            items = data.item_count(),
            creatures = data.creature_count(),
            "content loaded"
        );
        Ok(data)
    }

    pub fn data_dir(&self) -> Option<&Path> {
        match &self.source {
            ContentSource::Bundled => None,
            ContentSource::Directory(dir) => Some(dir),
        }
    }
}

/// Every spell, item, and creature id named by another entry must exist.
fn validate(data: &GameData) -> LoadResult<()> {
    for spell in data.spells() {
        let owner = || format!("spell {}", spell.id);
        for effect in &spell.effects {
            if let Some(trigger) = effect.trigger_spell
                && data.spell(trigger).is_none()
            {
                return Err(LoadError::DanglingReference {
                    owner: owner(),
                    table: "spell",
                    id: trigger.0,
                });
            }
            if effect.item_type != 0 && data.item(ItemId(effect.item_type)).is_none() {
                return Err(LoadError::DanglingReference {
                    owner: owner(),
                    table: "item",
                    id: effect.item_type,
                });
            }
            if effect.summon_unit != 0 && data.creature(effect.summon_unit).is_none() {
                return Err(LoadError::DanglingReference {
                    owner: owner(),
                    table: "creature",
                    id: effect.summon_unit,
                });
            }
        }
        if let Some(missing) = spell
            .additional_spells
            .iter()
            .find(|id| data.spell(**id).is_none())
        {
            return Err(LoadError::DanglingReference {
                owner: owner(),
                table: "spell",
                id: missing.0,
            });
        }
    }
    for item in data.items() {
        if let Some(missing) = item.spells.iter().find(|s| data.spell(s.spell).is_none()) {
            return Err(LoadError::DanglingReference {
                owner: format!("item {}", item.id),
                table: "spell",
                id: missing.spell.0,
            });
        }
    }
    Ok(())
}
