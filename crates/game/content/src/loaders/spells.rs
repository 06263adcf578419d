//! Spell table loader.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use spell_core::SpellEntry;

use super::{LoadError, LoadResult, parse_ron, read_file};

/// Spell catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellCatalog {
    pub spells: Vec<SpellEntry>,
}

/// Loader for spell catalogs.
pub struct SpellLoader;

impl SpellLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<SpellEntry>> {
        let content = read_file(path)?;
        Self::parse(&path.display().to_string(), &content)
    }

    /// Parses catalog text; `name` only labels errors.
    pub fn parse(name: &str, text: &str) -> LoadResult<Vec<SpellEntry>> {
        let catalog: SpellCatalog = parse_ron(name, text)?;
        let mut seen = HashSet::new();
        for spell in &catalog.spells {
            if !seen.insert(spell.id) {
                return Err(LoadError::Duplicate {
                    table: "spell",
                    id: spell.id.0,
                });
            }
        }
        Ok(catalog.spells)
    }
}
