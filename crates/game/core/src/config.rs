use crate::env::SpellId;

/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Projectiles arriving sooner than this (ms) are applied immediately.
    pub projectile_min_travel_ms: u64,

    /// Cast time floor (ms) used when scaling effects by spell power.
    pub min_scaling_cast_time_ms: u64,

    /// Cast time (ms) at which an effect receives the full spell power bonus.
    pub scaling_base_cast_time_ms: u64,

    /// Forward cone (radians) a target must be inside for facing-restricted spells.
    pub facing_arc: f32,

    /// Block value used for units that don't define their own.
    pub default_block_value: u32,

    /// Edge length of one visibility grid tile in world units.
    pub visibility_tile_size: f32,

    /// Number of tiles around a source tile that receive notifications.
    pub sight_tiles: i32,

    /// Spell cast by duel targets on themselves to raise the duel flag.
    pub duel_flag_spell: SpellId,

    /// Movement speed used when a charge effect relocates the caster.
    pub charge_speed: f32,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Maximum number of effect slots on one spell entry.
    pub const MAX_SPELL_EFFECTS: usize = 3;
    /// Number of power pools tracked per unit (mana, rage, focus, energy, happiness).
    pub const MAX_POWERS: usize = 5;
    /// Number of spell schools (physical + six magic schools).
    pub const MAX_SCHOOLS: usize = 7;
    /// Backpack slots available to characters.
    pub const MAX_INVENTORY_SLOTS: usize = 16;
    /// Upper bound on combo points held by a character.
    pub const MAX_COMBO_POINTS: u8 = 5;
    /// Other members a character can be grouped with.
    pub const MAX_GROUP_MEMBERS: usize = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_PROJECTILE_MIN_TRAVEL_MS: u64 = 50;
    pub const DEFAULT_MIN_SCALING_CAST_TIME_MS: u64 = 1500;
    pub const DEFAULT_SCALING_BASE_CAST_TIME_MS: u64 = 3500;
    pub const DEFAULT_FACING_ARC: f32 = 2.0 * core::f32::consts::PI / 3.0;
    pub const DEFAULT_BLOCK_VALUE: u32 = 50;
    pub const DEFAULT_VISIBILITY_TILE_SIZE: f32 = 33.333_33;
    pub const DEFAULT_SIGHT_TILES: i32 = 1;
    pub const DEFAULT_DUEL_FLAG_SPELL: SpellId = SpellId(7267);
    pub const DEFAULT_CHARGE_SPEED: f32 = 25.0;

    pub fn new() -> Self {
        Self {
            projectile_min_travel_ms: Self::DEFAULT_PROJECTILE_MIN_TRAVEL_MS,
            min_scaling_cast_time_ms: Self::DEFAULT_MIN_SCALING_CAST_TIME_MS,
            scaling_base_cast_time_ms: Self::DEFAULT_SCALING_BASE_CAST_TIME_MS,
            facing_arc: Self::DEFAULT_FACING_ARC,
            default_block_value: Self::DEFAULT_BLOCK_VALUE,
            visibility_tile_size: Self::DEFAULT_VISIBILITY_TILE_SIZE,
            sight_tiles: Self::DEFAULT_SIGHT_TILES,
            duel_flag_spell: Self::DEFAULT_DUEL_FLAG_SPELL,
            charge_speed: Self::DEFAULT_CHARGE_SPEED,
        }
    }

    pub fn with_sight_tiles(mut self, sight_tiles: i32) -> Self {
        self.sight_tiles = sight_tiles;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
