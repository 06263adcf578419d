//! Character backpack storage.

use crate::config::GameConfig;
use crate::env::{ItemEntry, ItemId};
use crate::error::{ErrorSeverity, GameError};

use super::Guid;

/// One occupied backpack slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStack {
    pub guid: Guid,
    pub entry: ItemId,
    pub count: u16,
}

/// Result of creating items in one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemPush {
    pub slot: u8,
    pub guid: Guid,
    pub entry: ItemId,
    pub added: u16,
    pub total: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InventoryError {
    #[error("inventory is full: {requested} requested, room for {capacity}")]
    InventoryFull { requested: u32, capacity: u32 },

    #[error("item {0} not found in inventory")]
    ItemNotFound(Guid),

    #[error("item count must be positive")]
    ZeroCount,
}

impl GameError for InventoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InventoryFull { .. } => ErrorSeverity::Recoverable,
            Self::ItemNotFound(_) | Self::ZeroCount => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InventoryFull { .. } => "INVENTORY_FULL",
            Self::ItemNotFound(_) => "INVENTORY_ITEM_NOT_FOUND",
            Self::ZeroCount => "INVENTORY_ZERO_COUNT",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    slots: [Option<ItemStack>; GameConfig::MAX_INVENTORY_SLOTS],
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn find(&self, guid: Guid) -> Option<(usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .find_map(|(i, s)| s.as_ref().filter(|s| s.guid == guid).map(|s| (i, s)))
    }

    pub fn count_of(&self, entry: ItemId) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.entry == entry)
            .map(|s| u32::from(s.count))
            .sum()
    }

    /// Free room for `entry` across partial stacks and empty slots.
    pub fn capacity_for(&self, entry: &ItemEntry) -> u32 {
        let max_stack = u32::from(entry.max_stack.max(1));
        self.slots
            .iter()
            .map(|slot| match slot {
                None => max_stack,
                Some(s) if s.entry == entry.id => max_stack.saturating_sub(u32::from(s.count)),
                Some(_) => 0,
            })
            .sum()
    }

    /// Adds `count` items of `entry`, topping up existing stacks first.
    ///
    /// All-or-nothing: nothing changes when the items don't fit.
    pub fn create_items(
        &mut self,
        entry: &ItemEntry,
        count: u16,
        mut allocate: impl FnMut() -> Guid,
    ) -> Result<Vec<ItemPush>, InventoryError> {
        if count == 0 {
            return Err(InventoryError::ZeroCount);
        }
        let capacity = self.capacity_for(entry);
        if capacity < u32::from(count) {
            return Err(InventoryError::InventoryFull {
                requested: u32::from(count),
                capacity,
            });
        }

        let max_stack = entry.max_stack.max(1);
        let mut remaining = count;
        let mut pushes = Vec::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if remaining == 0 {
                break;
            }
            if let Some(stack) = slot
                && stack.entry == entry.id
                && stack.count < max_stack
            {
                let added = remaining.min(max_stack - stack.count);
                stack.count += added;
                remaining -= added;
                pushes.push(ItemPush {
                    slot: index as u8,
                    guid: stack.guid,
                    entry: entry.id,
                    added,
                    total: stack.count,
                });
            }
        }

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let added = remaining.min(max_stack);
                let guid = allocate();
                *slot = Some(ItemStack {
                    guid,
                    entry: entry.id,
                    count: added,
                });
                remaining -= added;
                pushes.push(ItemPush {
                    slot: index as u8,
                    guid,
                    entry: entry.id,
                    added,
                    total: added,
                });
            }
        }

        Ok(pushes)
    }

    /// Removes one item from the stack identified by `guid`.
    pub fn remove_one(&mut self, guid: Guid) -> Result<u16, InventoryError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|s| s.guid == guid))
            .ok_or(InventoryError::ItemNotFound(guid))?;

        let remaining = match slot {
            Some(stack) => {
                stack.count = stack.count.saturating_sub(1);
                stack.count
            }
            None => return Err(InventoryError::ItemNotFound(guid)),
        };
        if remaining == 0 {
            *slot = None;
        }
        Ok(remaining)
    }
}
