//! Mutable world entities: units, characters, game objects.
mod character;
mod guid;
mod inventory;
mod listeners;
mod object;
mod unit;

pub use character::Character;
pub use guid::{Guid, GuidAllocator};
pub use inventory::{Inventory, InventoryError, ItemPush, ItemStack};
pub use listeners::{UnitListeners, UnitSignal};
pub use object::{GameObject, GameObjectKind};
pub use unit::{DamageResult, StandState, Unit};
