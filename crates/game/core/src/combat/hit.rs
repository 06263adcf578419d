//! Hit, avoidance, and resist chance tables.

/// Percent chances for a melee swing, rolled in field order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HitChances {
    pub miss: f32,
    pub dodge: f32,
    pub parry: f32,
    pub block: f32,
    pub crit: f32,
    pub crushing: f32,
}

/// Chance (percent) that a hostile spell misses.
///
/// # Formula
///
/// ```text
/// diff = target_level - caster_level
/// diff <= 2 : 4 + diff          (never below 1)
/// diff  > 2 : 6 + 11 * (diff - 2)
/// clamped to [1, 99]
/// ```
pub fn spell_miss_chance(caster_level: u32, target_level: u32) -> f32 {
    let diff = target_level as i64 - caster_level as i64;
    let chance = if diff <= 2 {
        4 + diff
    } else {
        6 + 11 * (diff - 2)
    };
    chance.clamp(1, 99) as f32
}

/// Average resist percentage against a magic school.
///
/// # Formula
///
/// ```text
/// resist_pct = resistance / (caster_level * 5) * 75
/// clamped to [0, 75]
/// ```
pub fn spell_resist_pct(caster_level: u32, resistance: u32) -> f32 {
    if resistance == 0 {
        return 0.0;
    }
    let cap = (caster_level.max(1) * 5) as f32;
    (resistance as f32 / cap * 75.0).clamp(0.0, 75.0)
}

/// Melee outcome chances for an attacker against a defender.
///
/// Each level of difference moves miss/dodge/parry/block by half a percent.
/// Crushing blows only come from non-player attackers at least four levels
/// above the defender.
pub fn melee_chances(
    attacker_level: u32,
    defender_level: u32,
    attacker_is_player: bool,
    defender_can_block: bool,
) -> HitChances {
    let diff = (defender_level as f32 - attacker_level as f32) * 0.5;
    let crushing = if !attacker_is_player && attacker_level >= defender_level + 4 {
        (attacker_level - defender_level) as f32 * 2.0 - 15.0
    } else {
        0.0
    };
    HitChances {
        miss: (5.0 + diff).max(0.0),
        dodge: (5.0 + diff).max(0.0),
        parry: (5.0 + diff).max(0.0),
        block: if defender_can_block { (5.0 + diff).max(0.0) } else { 0.0 },
        crit: (5.0 - diff).max(0.0),
        crushing: crushing.max(0.0),
    }
}
