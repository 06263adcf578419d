//! Effect magnitude formulas.
//!
//! Pure functions; the caller supplies the caster snapshot and the RNG.

use rand::Rng;

use crate::config::GameConfig;
use crate::env::{SpellEffect, SpellEntry};

/// Caster level used for effect scaling.
///
/// # Formula
///
/// ```text
/// level = min(caster_level, max_level)   if max_level > 0 and caster_level > max_level
///       = max(caster_level, base_level)  otherwise
/// level -= spell_level
/// ```
pub fn effective_level(spell: &SpellEntry, caster_level: u32) -> i32 {
    let caster_level = caster_level as i32;
    let max_level = spell.max_level as i32;
    let base_level = spell.base_level as i32;

    let level = if max_level > 0 && caster_level > max_level {
        max_level
    } else if caster_level < base_level {
        base_level
    } else {
        caster_level
    };
    level - spell.spell_level as i32
}

/// Rolls the base points of one effect.
///
/// # Formula
///
/// ```text
/// base   = (override or base_points) + level * points_per_level
/// range  = die_sides + level * dice_per_level
/// random = base_dice                       if base_dice >= range
///        = uniform(base_dice ..= range)    otherwise
/// combo  = points_per_combo_point * combo_points
/// result = base + random + combo
/// ```
///
/// Each partial sum truncates toward zero.
pub fn calculate_effect_base_points<R: Rng + ?Sized>(
    effect: &SpellEffect,
    spell: &SpellEntry,
    caster_level: u32,
    combo_points: u8,
    base_override: Option<i32>,
    rng: &mut R,
) -> i32 {
    let level = effective_level(spell, caster_level);

    let base = base_override.unwrap_or(effect.base_points);
    let base = (base as f32 + level as f32 * effect.points_per_level) as i32;
    let range = (effect.die_sides as f32 + level as f32 * effect.dice_per_level) as i32;
    let combo = (effect.points_per_combo_point * f32::from(combo_points)) as i32;

    let random = if effect.base_dice >= range {
        effect.base_dice
    } else {
        rng.gen_range(effect.base_dice..=range)
    };

    base + random + combo
}

/// Scales rolled base points by the caster's spell power.
///
/// # Formula
///
/// ```text
/// cast_time   = max(cast_time, min_scaling_cast_time)        (1500 ms)
/// coefficient = cast_time / scaling_base_cast_time           (3500 ms)
/// multiplier  = 1 + bonus_pct / 100
/// total       = (base_points + coefficient * spell_power) * multiplier
/// ```
///
/// Negative totals clamp to zero.
pub fn spell_points_total(
    config: &GameConfig,
    base_points: i32,
    cast_time: u64,
    spell_power: i32,
    bonus_pct: i32,
) -> u32 {
    let cast_time = cast_time.max(config.min_scaling_cast_time_ms) as f32;
    let coefficient = cast_time / config.scaling_base_cast_time_ms.max(1) as f32;
    let multiplier = 1.0 + bonus_pct as f32 / 100.0;
    let total = (base_points as f32 + coefficient * spell_power as f32) * multiplier;
    total.max(0.0) as u32
}
