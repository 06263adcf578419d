//! Tables compiled into the crate.

pub const SPELLS: &str = include_str!("../data/spells.ron");
pub const ITEMS: &str = include_str!("../data/items.ron");
pub const CREATURES: &str = include_str!("../data/creatures.ron");
pub const CONFIG: &str = include_str!("../data/config.toml");
