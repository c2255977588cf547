//! Consumer-supplied shake settings.

/// How the application reacts to shakes.
///
/// Owned by the application, not by the shake capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShakeSettings {
    /// Keep detection active while nobody is logged in.
    pub enabled_for_unauthenticated: bool,
    /// Ask before logging out on a shake.
    pub show_logout_prompt_on_shake: bool,
}

impl Default for ShakeSettings {
    fn default() -> Self {
        Self { enabled_for_unauthenticated: false, show_logout_prompt_on_shake: true }
    }
}

impl ShakeSettings {
    /// Whether detection should be active for the given auth state.
    pub fn should_listen(&self, authenticated: bool) -> bool {
        authenticated || self.enabled_for_unauthenticated
    }
}
