use std::sync::Arc;

use crate::env::{ItemId, SpellEntry};
use crate::math::Vec3;
use crate::state::{Guid, UnitSignal};
use crate::timer::{Countdown, GameTime};

use super::{CastId, TargetSelector};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastPhase {
    /// Cast-time countdown running (or completing inline).
    #[default]
    Casting,
    /// Completed; effects wait for the caster's next weapon swing.
    AwaitingSwing,
    /// Completed; effects wait for the projectile to arrive.
    InFlight,
    Complete,
}

/// Kinematics of the current projectile leg.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub target: Guid,
    /// Where the current leg started.
    pub origin: Vec3,
    pub start: GameTime,
    pub end: GameTime,
}

impl Projectile {
    /// Fraction of the current leg already travelled at `now`.
    pub fn progress(&self, now: GameTime) -> f32 {
        let total = self.end.saturating_sub(self.start);
        if total == 0 {
            return 1.0;
        }
        (now.saturating_sub(self.start) as f32 / total as f32).clamp(0.0, 1.0)
    }
}

/// One in-flight spell cast.
#[derive(Clone, Debug)]
pub struct ActiveCast {
    pub id: CastId,
    pub caster: Guid,
    pub spell: Arc<SpellEntry>,
    pub target: TargetSelector,
    pub base_points: Option<i32>,
    pub cast_time: u64,
    pub is_proc: bool,
    pub item: Option<Guid>,
    /// Template of `item`, resolved when the cast starts.
    pub item_entry: Option<ItemId>,
    /// Flips to true exactly once, on completion or interruption.
    pub finished: bool,
    pub phase: CastPhase,
    pub started_at: GameTime,
    /// Caster position when the countdown started.
    pub cast_position: Vec3,
    /// Cast-time gate.
    pub countdown: Countdown,
    /// Projectile impact gate.
    pub impact: Countdown,
    pub projectile: Option<Projectile>,
    /// Unit signals this cast listens to; cleared on every teardown path.
    pub subscriptions: Vec<(Guid, UnitSignal)>,
}

impl ActiveCast {
    pub fn is_deferred(&self) -> bool {
        matches!(self.phase, CastPhase::AwaitingSwing | CastPhase::InFlight)
    }

    /// Unit this cast targets, if the selection names one.
    pub fn target_unit(&self) -> Option<Guid> {
        self.target.unit_guid(self.caster)
    }
}
