//! Damage mitigation pipeline.

use super::HitOutcome;

/// Breakdown of one mitigated hit, before absorption.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mitigation {
    /// Damage left after block, crit/crushing scaling, and resist.
    pub total: u32,
    pub blocked: u32,
    pub resisted: u32,
}

/// Applies outcome modifiers to a raw damage amount.
///
/// # Order
///
/// ```text
/// miss/dodge/parry/immune -> 0
/// block    : total -= block_value (clamped at 0)
/// critical : total *= 2
/// crushing : total *= 1.5
/// resisted = total * resist_pct / 100
/// total   -= resisted
/// ```
///
/// When the block value swallows the whole hit, the reported `blocked`
/// amount is the zeroed total (0), not the block value.
pub fn mitigate(raw: u32, outcome: HitOutcome, block_value: u32, resist_pct: f32) -> Mitigation {
    if outcome.is_avoided() {
        return Mitigation::default();
    }

    let mut total = raw;
    let mut blocked = 0;
    match outcome {
        HitOutcome::Block => {
            if block_value >= total {
                total = 0;
                blocked = total;
            } else {
                total -= block_value;
                blocked = block_value;
            }
        }
        HitOutcome::CriticalHit => total = total.saturating_mul(2),
        HitOutcome::Crushing => total = (total as f32 * 1.5) as u32,
        _ => {}
    }

    let resisted = (total as f32 * (resist_pct / 100.0)) as u32;
    Mitigation {
        total: total - resisted.min(total),
        blocked,
        resisted: resisted.min(total),
    }
}

/// Heal amount after the outcome roll (crits double).
pub fn crit_heal(amount: u32, outcome: HitOutcome) -> u32 {
    match outcome {
        HitOutcome::CriticalHit => amount.saturating_mul(2),
        _ => amount,
    }
}
