//! Persistent buff/debuff instances and the per-unit container.
mod container;

pub use container::{AbsorbResult, AuraContainer};

use crate::env::{AuraType, SpellId, SpellSchools};
use crate::state::Guid;
use crate::timer::{Countdown, GameTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraId(pub u64);

impl core::fmt::Display for AuraId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "aura#{}", self.0)
    }
}

/// One applied aura, owned by the target's [`AuraContainer`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aura {
    pub id: AuraId,
    pub spell: SpellId,
    pub effect_index: u8,
    pub aura_type: AuraType,
    pub school: SpellSchools,
    pub caster: Guid,
    pub target: Guid,
    /// Magnitude per tick for periodic auras, pool size for absorbs.
    pub base_points: i32,
    /// Absorb pool left.
    pub remaining: u32,
    pub misc_value: i32,
    pub positive: bool,
    pub dispel_type: u32,
    /// Tick interval in ms; zero for non-periodic auras.
    pub amplitude: u32,
    /// Lifetime in ms; zero or negative means permanent.
    pub duration: i32,
    pub applied_at: GameTime,
    pub tick: Countdown,
    pub expiry: Countdown,
}

impl Aura {
    pub fn new(id: AuraId, spell: SpellId, aura_type: AuraType, caster: Guid, target: Guid) -> Self {
        Self {
            id,
            spell,
            effect_index: 0,
            aura_type,
            school: SpellSchools::NORMAL,
            caster,
            target,
            base_points: 0,
            remaining: 0,
            misc_value: 0,
            positive: false,
            dispel_type: 0,
            amplitude: 0,
            duration: 0,
            applied_at: 0,
            tick: Countdown::new(),
            expiry: Countdown::new(),
        }
    }

    pub fn is_periodic(&self) -> bool {
        self.aura_type.is_periodic() && self.amplitude > 0
    }

    pub fn is_permanent(&self) -> bool {
        self.duration <= 0
    }

    /// True if this absorb aura shields against `school`.
    pub fn absorbs(&self, school: SpellSchools) -> bool {
        if self.aura_type != AuraType::SchoolAbsorb || self.remaining == 0 {
            return false;
        }
        let mask = self.misc_value as u8;
        mask == 0 || mask & school.bits() != 0
    }
}
