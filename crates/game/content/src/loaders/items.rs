//! Item table loader.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use spell_core::ItemEntry;

use super::{LoadError, LoadResult, parse_ron, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<ItemEntry>,
}

/// Loader for item catalogs.
pub struct ItemLoader;

impl ItemLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ItemEntry>> {
        let content = read_file(path)?;
        Self::parse(&path.display().to_string(), &content)
    }

    /// Parses catalog text. A zero `max_stack` is raised to one.
    pub fn parse(name: &str, text: &str) -> LoadResult<Vec<ItemEntry>> {
        let mut catalog: ItemCatalog = parse_ron(name, text)?;
        let mut seen = HashSet::new();
        for item in &mut catalog.items {
            if !seen.insert(item.id) {
                return Err(LoadError::Duplicate {
                    table: "item",
                    id: item.id.0,
                });
            }
            item.max_stack = item.max_stack.max(1);
        }
        Ok(catalog.items)
    }
}

#[cfg(test)]
mod tests {
    use spell_core::ItemId;
    use spell_core::env::ItemSpellTrigger;

    use super::*;

    #[test]
    fn parses_on_use_spells() {
        let text = r#"(items: [(id: 7, name: "Potion", spells: [(spell: 9, charges: -1)])])"#;
        let items = ItemLoader::parse("inline", text).unwrap();
        assert_eq!(items[0].id, ItemId(7));
        assert_eq!(items[0].max_stack, 1);
        assert_eq!(items[0].spells[0].trigger, ItemSpellTrigger::OnUse);
        assert!(items[0].spells[0].is_consumed_on_use());
    }
}
