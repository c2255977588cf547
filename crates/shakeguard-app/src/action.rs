//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Shake detection should be active: clear listeners, enable, subscribe.
    EnableDetection,

    /// Shake detection should be inactive: clear listeners, stop.
    DisableDetection,

    /// Fire a shake through the capability's manual trigger.
    ManualShake,

    /// Ask the platform for motion access.
    RequestPermission,

    /// Ask the user whether to log out. Blocks until answered.
    PromptLogout,

    /// Invoke the external logout action.
    Logout,

    /// Generic shake action (no logout semantics).
    Shake,
}
