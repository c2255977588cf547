//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from three sources:
//! - User interactions (keys) and answers to prompts.
//! - External collaborators (authentication state, settings, logout result).
//! - Shake notifications forwarded by the [`crate::ShakeHook`].

use crate::{KeyInput, ShakeSettings};

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Authentication state changed.
    AuthChanged {
        /// Whether a user is now authenticated.
        authenticated: bool,
    },

    /// Shake settings changed.
    SettingsChanged(ShakeSettings),

    /// The shake capability notified a shake.
    ShakeDetected,

    /// The logout confirmation prompt was answered.
    PromptAnswered {
        /// `true` if the user confirmed.
        confirmed: bool,
    },

    /// The motion permission request resolved.
    PermissionAnswered {
        /// `true` if access is granted.
        granted: bool,
    },

    /// The logout action completed.
    LoggedOut,

    /// The logout action failed.
    LogoutFailed {
        /// Error description.
        message: String,
    },

    /// Quit requested.
    Quit,
}
