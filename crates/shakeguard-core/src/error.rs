//! Error types for the shake detection core.
//!
//! Only programmer errors are surfaced to callers ([`DetectorError`]).
//! Environmental degradation (no sensor, no permission, no haptics) is modelled
//! by [`PlatformError`], which adapters and the detector absorb and log instead
//! of propagating.

use thiserror::Error;

/// Errors surfaced by detector operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    /// `add_listener` was called with an event other than `"shake"`.
    #[error("unsupported event {0:?}: only \"shake\" is supported")]
    UnsupportedEvent(String),
}

/// Failures reported by platform primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// No accelerometer hardware, or the motion capability object is absent.
    #[error("motion sensor unavailable: {reason}")]
    SensorUnavailable {
        /// Platform-provided description
        reason: String,
    },

    /// The user declined motion-data access.
    #[error("motion permission denied")]
    PermissionDenied,

    /// Haptic engine missing or refused the pulse.
    #[error("haptic feedback unavailable: {reason}")]
    HapticsUnavailable {
        /// Platform-provided description
        reason: String,
    },

    /// The native bridge call itself failed.
    #[error("platform bridge error: {0}")]
    Bridge(String),
}

impl PlatformError {
    /// Returns true if this error describes the runtime environment rather
    /// than a broken bridge.
    ///
    /// Environmental errors leave detection inert but are otherwise expected:
    /// desktops have no accelerometer, users decline prompts, browsers have no
    /// haptics. Bridge errors indicate a misconfigured native shell.
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            Self::SensorUnavailable { .. } | Self::PermissionDenied | Self::HapticsUnavailable { .. }
        )
    }
}

/// Failure returned by a shake listener.
///
/// Caught per listener during notification and logged; never reaches the
/// component that triggered the shake.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("shake listener failed: {message}")]
pub struct ListenerError {
    /// Description of the failure
    pub message: String,
}

impl ListenerError {
    /// Create a listener error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degradations_are_environmental() {
        assert!(PlatformError::SensorUnavailable { reason: "no hardware".into() }.is_environmental());
        assert!(PlatformError::PermissionDenied.is_environmental());
        assert!(
            PlatformError::HapticsUnavailable { reason: "web".into() }.is_environmental()
        );
    }

    #[test]
    fn bridge_failures_are_not_environmental() {
        assert!(!PlatformError::Bridge("plugin not registered".into()).is_environmental());
    }

    #[test]
    fn unsupported_event_names_the_event() {
        let err = DetectorError::UnsupportedEvent("tilt".into());
        assert_eq!(err.to_string(), "unsupported event \"tilt\": only \"shake\" is supported");
    }
}
