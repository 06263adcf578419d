//! Common error infrastructure for spell-core.
//!
//! Domain-specific errors (e.g. [`CastError`](crate::cast::CastError),
//! [`EffectError`](crate::effect::EffectError)) live next to the code that
//! raises them. This module provides the shared severity classification and
//! the [`GameError`] trait they all implement.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the request may succeed later (caster busy, target moved)
/// - **Validation**: invalid input, should not be retried unchanged
/// - **Internal**: unexpected state inconsistency that indicates a bug
/// - **Fatal**: corrupted world state, cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }
}

/// Common trait for all spell-core errors.
///
/// - All error enums implement this trait
/// - `#[derive(thiserror::Error)]` provides Display/Error
/// - Severity is classified by recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
