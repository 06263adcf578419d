use std::collections::HashMap;
use std::sync::Arc;

use super::{CreatureEntry, CreatureOracle, ItemEntry, ItemId, ItemOracle, SpellEntry, SpellId, SpellOracle};

/// In-memory static tables for spells, items, and creature templates.
///
/// This is the concrete oracle bundle handed to a world instance; loaders in
/// the content crate fill it from data files and tests build it inline.
#[derive(Clone, Debug, Default)]
pub struct GameData {
    spells: HashMap<SpellId, Arc<SpellEntry>>,
    categories: HashMap<u32, Vec<SpellId>>,
    items: HashMap<ItemId, ItemEntry>,
    creatures: HashMap<u32, CreatureEntry>,
}

impl GameData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a spell entry and updates the category index.
    pub fn insert_spell(&mut self, entry: SpellEntry) {
        let id = entry.id;
        if let Some(previous) = self.spells.get(&id)
            && let Some(members) = self.categories.get_mut(&previous.category)
        {
            members.retain(|s| *s != id);
        }
        if entry.category != 0 {
            self.categories.entry(entry.category).or_default().push(id);
        }
        self.spells.insert(id, Arc::new(entry));
    }

    pub fn insert_item(&mut self, entry: ItemEntry) {
        self.items.insert(entry.id, entry);
    }

    pub fn insert_creature(&mut self, entry: CreatureEntry) {
        self.creatures.insert(entry.id, entry);
    }

    pub fn with_spell(mut self, entry: SpellEntry) -> Self {
        self.insert_spell(entry);
        self
    }

    pub fn with_item(mut self, entry: ItemEntry) -> Self {
        self.insert_item(entry);
        self
    }

    pub fn with_creature(mut self, entry: CreatureEntry) -> Self {
        self.insert_creature(entry);
        self
    }

    pub fn spell_count(&self) -> usize {
        self.spells.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    pub fn spells(&self) -> impl Iterator<Item = &Arc<SpellEntry>> {
        self.spells.values()
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemEntry> {
        self.items.values()
    }

    pub fn creatures(&self) -> impl Iterator<Item = &CreatureEntry> {
        self.creatures.values()
    }
}

impl SpellOracle for GameData {
    fn spell(&self, id: SpellId) -> Option<Arc<SpellEntry>> {
        self.spells.get(&id).cloned()
    }

    fn category_spells(&self, category: u32) -> &[SpellId] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl ItemOracle for GameData {
    fn item(&self, id: ItemId) -> Option<&ItemEntry> {
        self.items.get(&id)
    }
}

impl CreatureOracle for GameData {
    fn creature(&self, entry: u32) -> Option<&CreatureEntry> {
        self.creatures.get(&entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_index_follows_replacement() {
        let mut data = GameData::new();
        let mut a = SpellEntry::new(SpellId(1), "a");
        a.category = 10;
        let mut b = SpellEntry::new(SpellId(2), "b");
        b.category = 10;
        data.insert_spell(a.clone());
        data.insert_spell(b);
        assert_eq!(data.category_spells(10), &[SpellId(1), SpellId(2)]);

        a.category = 11;
        data.insert_spell(a);
        assert_eq!(data.category_spells(10), &[SpellId(2)]);
        assert_eq!(data.category_spells(11), &[SpellId(1)]);
        assert!(data.category_spells(12).is_empty());
    }
}
