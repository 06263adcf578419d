//! Cast lifecycle.
//!
//! # Architecture
//!
//! - **Cast Slot**: [`CastContext`] tracks the one cast a caster is actively
//!   channelling. Triggered (proc) casts never occupy it.
//! - **Registry**: every live [`ActiveCast`] is owned by the world's cast
//!   registry, keyed by [`CastId`]. A cast is live exactly while it is
//!   registered; every path that may have torn a cast down re-checks the
//!   registry before touching it again.
//! - **Phases**: a cast counts down, completes, and then either applies its
//!   effects inline, flies as a projectile, or waits for the caster's next
//!   weapon swing. The two deferred phases keep the cast registered after
//!   the slot has returned to idle.
//! - **Observers**: [`CastObserver`]s receive the `ended` signal and may
//!   mutate the world, including stopping or starting casts.

mod active;
mod context;
mod error;
mod lifecycle;
mod observer;
pub mod points;
mod projectile;
mod swing;
mod validation;

pub use active::{ActiveCast, CastPhase, Projectile};
pub use context::{CastContext, CastState};
pub use error::{CastError, CastFailure};
pub use observer::CastObserver;
pub use projectile::travel_time;
pub use swing::SwingOutcome;

use crate::env::SpellId;
use crate::math::Vec3;
use crate::state::Guid;

/// Identifier of one cast attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CastId(pub u64);

impl core::fmt::Display for CastId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "cast#{}", self.0)
    }
}

/// What a cast was issued against. Resolved lazily against the live world.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetSelector {
    #[default]
    SelfCast,
    Unit(Guid),
    GameObject(Guid),
    Item(Guid),
    Location(Vec3),
}

impl TargetSelector {
    /// Unit the selection points at; self-casts resolve to `caster`.
    pub fn unit_guid(&self, caster: Guid) -> Option<Guid> {
        match self {
            Self::SelfCast => Some(caster),
            Self::Unit(guid) => Some(*guid),
            _ => None,
        }
    }

    /// Self-casts are reported to clients as unit targets.
    pub fn resolved(&self, caster: Guid) -> Self {
        match self {
            Self::SelfCast => Self::Unit(caster),
            other => *other,
        }
    }
}

/// Input to [`World::start_cast`](crate::world::World::start_cast).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastRequest {
    pub caster: Guid,
    pub spell: SpellId,
    pub target: TargetSelector,
    /// Overrides the spell's cast time.
    pub cast_time: Option<u64>,
    /// Overrides the base points of every effect.
    pub base_points: Option<i32>,
    /// Triggered casts skip the slot, the start notification, and validation.
    pub is_proc: bool,
    /// Item the spell is cast from.
    pub item: Option<Guid>,
    /// Stop an active cast instead of rejecting the request.
    pub replace: bool,
}

impl CastRequest {
    pub fn new(caster: Guid, spell: SpellId, target: TargetSelector) -> Self {
        Self {
            caster,
            spell,
            target,
            cast_time: None,
            base_points: None,
            is_proc: false,
            item: None,
            replace: false,
        }
    }

    pub fn with_cast_time(mut self, cast_time: u64) -> Self {
        self.cast_time = Some(cast_time);
        self
    }

    pub fn with_base_points(mut self, base_points: i32) -> Self {
        self.base_points = Some(base_points);
        self
    }

    /// Marks the request as a triggered (proc) cast.
    pub fn triggered(mut self) -> Self {
        self.is_proc = true;
        self
    }

    pub fn from_item(mut self, item: Guid) -> Self {
        self.item = Some(item);
        self
    }

    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }
}

/// Signal fired exactly once per cast when it stops being in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastEnded {
    pub cast: CastId,
    pub caster: Guid,
    pub spell: SpellId,
    pub success: bool,
}
