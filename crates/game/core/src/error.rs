//! Common error infrastructure for game-core.
//!
//! Domain-specific errors live next to the code that raises them
//! (`ConfigError` in [`crate::config`], `ActionError` in [`crate::env`],
//! `TickError` in [`crate::engine`]). This module provides the shared
//! severity classification the scheduler uses to decide how loudly to log an
//! isolated failure and whether a failure may escape a tick at all.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: transient collaborator failures; the entity simply does
///   nothing this tick
/// - **Validation**: malformed input (unknown entity, bad action); dropped
/// - **Internal**: unexpected state inconsistency worth investigating
/// - **Fatal**: persisted state would desynchronize; surfaced to the host
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

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all game-core errors.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Logs an error isolated to a single entity or region at a level matching
/// its severity.
pub(crate) fn log_isolated<E: GameError>(scope: &str, error: &E) {
    let severity = error.severity();
    if severity.is_internal() {
        tracing::error!(
            code = error.error_code(),
            severity = severity.as_str(),
            "{scope}: {error}"
        );
    } else if severity.is_recoverable() {
        tracing::debug!(
            code = error.error_code(),
            severity = severity.as_str(),
            "{scope}: {error}"
        );
    } else {
        tracing::warn!(
            code = error.error_code(),
            severity = severity.as_str(),
            "{scope}: {error}"
        );
    }
}
