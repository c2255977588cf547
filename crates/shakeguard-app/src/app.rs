//! Application state machine.
//!
//! This module defines the [`App`] state machine, which decides what a shake
//! means for the application, completely decoupled from the shake capability
//! and from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks authentication state and shake settings, and re-evaluates whether
//!   detection should be active whenever either relevant input changes.
//! - Maps a shake notification to a logout prompt, a logout, or a generic
//!   shake action.
//! - Keeps the shake counter and status line shown by the demo screen.

use crate::{AppAction, AppEvent, KeyInput, ShakeSettings};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Whether a user is logged in.
    authenticated: bool,
    settings: ShakeSettings,
    /// Detection state last requested from the hook.
    detection_active: bool,
    /// A logout prompt is on screen.
    awaiting_confirmation: bool,
    /// Handled shakes (plain shakes and confirmed logouts).
    shake_count: u64,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App.
    pub fn new(settings: ShakeSettings, authenticated: bool) -> Self {
        Self {
            authenticated,
            settings,
            detection_active: false,
            awaiting_confirmation: false,
            shake_count: 0,
            status_message: None,
        }
    }

    /// Initial actions: bring detection in line with the starting state.
    pub fn start(&mut self) -> Vec<AppAction> {
        vec![self.reconcile(), AppAction::Render]
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::AuthChanged { authenticated } => {
                self.authenticated = authenticated;
                self.status_message =
                    Some(if authenticated { "Logged in" } else { "Logged out" }.to_string());
                vec![self.reconcile(), AppAction::Render]
            },
            AppEvent::SettingsChanged(settings) => {
                let gate_changed =
                    settings.enabled_for_unauthenticated != self.settings.enabled_for_unauthenticated;
                self.settings = settings;
                if gate_changed {
                    vec![self.reconcile(), AppAction::Render]
                } else {
                    vec![AppAction::Render]
                }
            },
            AppEvent::ShakeDetected => self.handle_shake(),
            AppEvent::PromptAnswered { confirmed } => {
                self.awaiting_confirmation = false;
                if confirmed {
                    self.shake_count += 1;
                    self.status_message = Some("Logging out...".to_string());
                    vec![AppAction::Logout, AppAction::Render]
                } else {
                    self.status_message = Some("Logout cancelled".to_string());
                    vec![AppAction::Render]
                }
            },
            AppEvent::PermissionAnswered { granted } => self.handle_permission(granted),
            AppEvent::LoggedOut => {
                self.authenticated = false;
                self.status_message = Some("Logged out".to_string());
                vec![self.reconcile(), AppAction::Render]
            },
            AppEvent::LogoutFailed { message } => {
                self.status_message = Some(format!("Logout failed: {message}"));
                vec![AppAction::Render]
            },
            AppEvent::Quit => vec![AppAction::Quit],
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Esc | KeyInput::Char('q') => vec![AppAction::Quit],
            KeyInput::Char('l') => self.handle(AppEvent::AuthChanged { authenticated: !self.authenticated }),
            KeyInput::Char('u') => {
                let settings = ShakeSettings {
                    enabled_for_unauthenticated: !self.settings.enabled_for_unauthenticated,
                    ..self.settings
                };
                self.handle(AppEvent::SettingsChanged(settings))
            },
            KeyInput::Char('p') => {
                let settings = ShakeSettings {
                    show_logout_prompt_on_shake: !self.settings.show_logout_prompt_on_shake,
                    ..self.settings
                };
                self.handle(AppEvent::SettingsChanged(settings))
            },
            KeyInput::Char('m') => vec![AppAction::ManualShake],
            KeyInput::Char('r') => vec![AppAction::RequestPermission],
            KeyInput::Char('c') => {
                self.shake_count = 0;
                self.status_message = Some("Count reset".to_string());
                vec![AppAction::Render]
            },
            KeyInput::Char(_) | KeyInput::Enter => vec![],
        }
    }

    fn handle_shake(&mut self) -> Vec<AppAction> {
        if !self.settings.should_listen(self.authenticated) {
            tracing::debug!("shake ignored: detection not allowed for this session");
            return vec![];
        }

        if self.authenticated && self.settings.show_logout_prompt_on_shake {
            if self.awaiting_confirmation {
                tracing::debug!("shake ignored: logout prompt already open");
                return vec![];
            }
            self.awaiting_confirmation = true;
            return vec![AppAction::PromptLogout, AppAction::Render];
        }

        self.shake_count += 1;
        self.status_message = Some("Shake detected!".to_string());
        vec![AppAction::Shake, AppAction::Render]
    }

    /// A fresh grant only reaches the event source after a resubscribe.
    fn handle_permission(&mut self, granted: bool) -> Vec<AppAction> {
        if !granted {
            self.status_message = Some("Motion permission denied".to_string());
            return vec![AppAction::Render];
        }

        self.status_message = Some("Motion permission granted".to_string());
        if self.detection_active {
            vec![AppAction::DisableDetection, AppAction::EnableDetection, AppAction::Render]
        } else {
            vec![AppAction::Render]
        }
    }

    fn reconcile(&mut self) -> AppAction {
        self.detection_active = self.settings.should_listen(self.authenticated);
        if self.detection_active { AppAction::EnableDetection } else { AppAction::DisableDetection }
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Whether a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Current shake settings.
    pub fn settings(&self) -> ShakeSettings {
        self.settings
    }

    /// Whether detection was last requested active.
    pub fn detection_active(&self) -> bool {
        self.detection_active
    }

    /// Whether a logout prompt is pending.
    pub fn awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    /// Number of handled shakes.
    pub fn shake_count(&self) -> u64 {
        self.shake_count
    }

    /// Current status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> App {
        App::new(ShakeSettings::default(), true)
    }

    #[test]
    fn start_enables_for_authenticated_user() {
        let mut app = logged_in();
        assert_eq!(app.start(), vec![AppAction::EnableDetection, AppAction::Render]);
        assert!(app.detection_active());
    }

    #[test]
    fn start_disables_for_anonymous_user() {
        let mut app = App::new(ShakeSettings::default(), false);
        assert_eq!(app.start(), vec![AppAction::DisableDetection, AppAction::Render]);
    }

    #[test]
    fn shake_while_logged_in_prompts() {
        let mut app = logged_in();
        let actions = app.handle(AppEvent::ShakeDetected);

        assert_eq!(actions, vec![AppAction::PromptLogout, AppAction::Render]);
        assert!(app.awaiting_confirmation());
        assert_eq!(app.shake_count(), 0);
    }

    #[test]
    fn second_shake_while_prompting_is_ignored() {
        let mut app = logged_in();
        app.handle(AppEvent::ShakeDetected);
        assert!(app.handle(AppEvent::ShakeDetected).is_empty());
    }

    #[test]
    fn declined_prompt_does_not_log_out() {
        let mut app = logged_in();
        app.handle(AppEvent::ShakeDetected);
        let actions = app.handle(AppEvent::PromptAnswered { confirmed: false });

        assert!(!actions.contains(&AppAction::Logout));
        assert!(app.is_authenticated());
        assert_eq!(app.shake_count(), 0);
    }

    #[test]
    fn confirmed_prompt_logs_out() {
        let mut app = logged_in();
        app.handle(AppEvent::ShakeDetected);
        let actions = app.handle(AppEvent::PromptAnswered { confirmed: true });

        assert_eq!(actions, vec![AppAction::Logout, AppAction::Render]);
        assert_eq!(app.shake_count(), 1);

        let actions = app.handle(AppEvent::LoggedOut);
        assert_eq!(actions, vec![AppAction::DisableDetection, AppAction::Render]);
        assert!(!app.is_authenticated());
    }

    #[test]
    fn shake_without_prompt_is_generic() {
        let settings = ShakeSettings { show_logout_prompt_on_shake: false, ..ShakeSettings::default() };
        let mut app = App::new(settings, true);

        assert_eq!(app.handle(AppEvent::ShakeDetected), vec![AppAction::Shake, AppAction::Render]);
        assert_eq!(app.shake_count(), 1);
    }

    #[test]
    fn anonymous_shake_is_noop_unless_enabled() {
        let mut app = App::new(ShakeSettings::default(), false);
        assert!(app.handle(AppEvent::ShakeDetected).is_empty());

        let settings = ShakeSettings { enabled_for_unauthenticated: true, ..ShakeSettings::default() };
        let mut app = App::new(settings, false);
        assert_eq!(app.handle(AppEvent::ShakeDetected), vec![AppAction::Shake, AppAction::Render]);
    }

    #[test]
    fn prompt_toggle_does_not_resubscribe() {
        let mut app = logged_in();
        let actions = app.handle(AppEvent::Key(KeyInput::Char('p')));

        assert_eq!(actions, vec![AppAction::Render]);
        assert!(!app.settings().show_logout_prompt_on_shake);
    }

    #[test]
    fn anonymous_toggle_resubscribes() {
        let mut app = App::new(ShakeSettings::default(), false);
        let actions = app.handle(AppEvent::Key(KeyInput::Char('u')));

        assert_eq!(actions, vec![AppAction::EnableDetection, AppAction::Render]);
    }

    #[test]
    fn reset_key_zeroes_counter() {
        let settings = ShakeSettings { show_logout_prompt_on_shake: false, ..ShakeSettings::default() };
        let mut app = App::new(settings, true);
        app.handle(AppEvent::ShakeDetected);
        app.handle(AppEvent::ShakeDetected);
        assert_eq!(app.shake_count(), 2);

        let actions = app.handle(AppEvent::Key(KeyInput::Char('c')));

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.shake_count(), 0);
        assert_eq!(app.status_message(), Some("Count reset"));
    }

    #[test]
    fn permission_key_requests_access() {
        let mut app = logged_in();
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Char('r'))), vec![AppAction::RequestPermission]);
    }

    #[test]
    fn granted_permission_rearms_active_detection() {
        let mut app = logged_in();
        app.start();

        let actions = app.handle(AppEvent::PermissionAnswered { granted: true });

        assert_eq!(actions, vec![
            AppAction::DisableDetection,
            AppAction::EnableDetection,
            AppAction::Render,
        ]);
        assert!(app.detection_active());
    }

    #[test]
    fn granted_permission_leaves_inactive_detection_off() {
        let mut app = App::new(ShakeSettings::default(), false);
        app.start();

        assert_eq!(app.handle(AppEvent::PermissionAnswered { granted: true }), vec![AppAction::Render]);
        assert!(!app.detection_active());
    }

    #[test]
    fn denied_permission_is_reported() {
        let mut app = logged_in();
        app.start();

        assert_eq!(app.handle(AppEvent::PermissionAnswered { granted: false }), vec![AppAction::Render]);
        assert_eq!(app.status_message(), Some("Motion permission denied"));
    }

    #[test]
    fn logout_failure_is_reported() {
        let mut app = logged_in();
        app.handle(AppEvent::LogoutFailed { message: "network down".into() });

        assert_eq!(app.status_message(), Some("Logout failed: network down"));
        assert!(app.is_authenticated());
    }
}
