use crate::aura::AuraId;
use crate::cast::CastId;
use crate::state::Guid;

/// Payload of a world timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// Cast-time countdown elapsed.
    CastFinished(CastId),
    /// Projectile reached its target.
    ProjectileImpact(CastId),
    AuraTick { unit: Guid, aura: AuraId },
    AuraExpire { unit: Guid, aura: AuraId },
}

/// Structural mutation deferred out of the calling stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkItem {
    RemoveAura { unit: Guid, aura: AuraId },
    /// Moves an aura from `from` onto `to`, recast as `to`'s own.
    StealAura { from: Guid, aura: AuraId, to: Guid },
}

impl WorkItem {
    /// Aura this item takes off `unit`, if any.
    pub fn removes_from(&self, unit: Guid) -> Option<AuraId> {
        let (owner, aura) = match *self {
            WorkItem::RemoveAura { unit, aura } => (unit, aura),
            WorkItem::StealAura { from, aura, .. } => (from, aura),
        };
        (owner == unit).then_some(aura)
    }
}
