//! Creature template loader.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use spell_core::CreatureEntry;

use super::{LoadError, LoadResult, parse_ron, read_file};

/// Creature catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatureCatalog {
    pub creatures: Vec<CreatureEntry>,
}

/// Loader for creature templates.
pub struct CreatureLoader;

impl CreatureLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<CreatureEntry>> {
        let content = read_file(path)?;
        Self::parse(&path.display().to_string(), &content)
    }

    pub fn parse(name: &str, text: &str) -> LoadResult<Vec<CreatureEntry>> {
        let catalog: CreatureCatalog = parse_ron(name, text)?;
        let mut seen = HashSet::new();
        for creature in &catalog.creatures {
            if !seen.insert(creature.id) {
                return Err(LoadError::Duplicate {
                    table: "creature",
                    id: creature.id,
                });
            }
        }
        Ok(catalog.creatures)
    }
}
