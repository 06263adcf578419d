//! Cast errors.
//!
//! [`CastError`] rejects a request synchronously; [`CastFailure`] aborts a
//! cast that was already accepted and is reported to clients through a
//! reason-coded notification.

use crate::env::{PowerType, SpellId};
use crate::error::{ErrorSeverity, GameError};
use crate::state::Guid;
use crate::world::SpellCastResult;

// ============================================================================
// Request Rejections
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastError {
    /// Caster already has a cast in progress and the request didn't ask to
    /// replace it.
    #[error("{caster} is already casting spell {spell}")]
    AlreadyCasting { caster: Guid, spell: SpellId },

    #[error("spell {0} does not exist")]
    UnknownSpell(SpellId),

    #[error("caster {0} not found")]
    CasterNotFound(Guid),

    #[error("caster {0} is dead")]
    CasterDead(Guid),
}

impl CastError {
    pub fn result_code(&self) -> SpellCastResult {
        match self {
            Self::AlreadyCasting { .. } => SpellCastResult::FailedSpellInProgress,
            Self::UnknownSpell(_) | Self::CasterNotFound(_) => SpellCastResult::FailedBadTargets,
            Self::CasterDead(_) => SpellCastResult::FailedCasterDead,
        }
    }
}

impl GameError for CastError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyCasting { .. } => ErrorSeverity::Recoverable,
            Self::UnknownSpell(_) | Self::CasterNotFound(_) | Self::CasterDead(_) => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyCasting { .. } => "CAST_ALREADY_CASTING",
            Self::UnknownSpell(_) => "CAST_UNKNOWN_SPELL",
            Self::CasterNotFound(_) => "CAST_CASTER_NOT_FOUND",
            Self::CasterDead(_) => "CAST_CASTER_DEAD",
        }
    }
}

// ============================================================================
// Completion Failures
// ============================================================================

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastFailure {
    #[error("target too close ({distance:.1} < {min:.1})")]
    TooClose { distance: f32, min: f32 },

    #[error("target out of range ({distance:.1} > {max:.1})")]
    OutOfRange { distance: f32, max: f32 },

    #[error("target not in line of sight")]
    LineOfSight,

    #[error("target not in front")]
    NotInFront,

    #[error("not enough {power:?}: {available} < {required}")]
    NoPower {
        power: PowerType,
        required: u32,
        available: u32,
    },

    #[error("item {0} not found")]
    ItemNotFound(Guid),

    #[error("interrupted")]
    Interrupted,
}

impl CastFailure {
    pub fn result_code(&self) -> SpellCastResult {
        match self {
            Self::TooClose { .. } => SpellCastResult::FailedTooClose,
            Self::OutOfRange { .. } => SpellCastResult::FailedOutOfRange,
            Self::LineOfSight => SpellCastResult::FailedLineOfSight,
            Self::NotInFront => SpellCastResult::FailedUnitNotInfront,
            Self::NoPower { .. } => SpellCastResult::FailedNoPower,
            Self::ItemNotFound(_) => SpellCastResult::FailedItemNotFound,
            Self::Interrupted => SpellCastResult::Interrupted,
        }
    }
}

impl GameError for CastFailure {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Interrupted => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::TooClose { .. } => "CAST_TOO_CLOSE",
            Self::OutOfRange { .. } => "CAST_OUT_OF_RANGE",
            Self::LineOfSight => "CAST_LINE_OF_SIGHT",
            Self::NotInFront => "CAST_NOT_IN_FRONT",
            Self::NoPower { .. } => "CAST_NO_POWER",
            Self::ItemNotFound(_) => "CAST_ITEM_NOT_FOUND",
            Self::Interrupted => "CAST_INTERRUPTED",
        }
    }
}
