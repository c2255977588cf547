//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: application state machine
//! - [`ShakeHook`]: shake subscription and capability lifecycle
//! - [`Driver`]: Platform-specific I/O

use shakeguard_core::{DetectorError, ShakePlugin};
use thiserror::Error;

use crate::{App, AppAction, AppEvent, Driver, ShakeHook, ShakeReceiver};

/// Text of the logout confirmation prompt.
pub const LOGOUT_PROMPT: &str = "Shake detected. Log out?";

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError<E: std::error::Error + 'static> {
    /// Driver I/O failed.
    #[error("driver error: {0}")]
    Driver(#[source] E),

    /// The shake capability rejected a subscription.
    #[error("shake subscription failed: {0}")]
    Detector(#[from] DetectorError),
}

/// Generic runtime that orchestrates App, `ShakeHook`, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `P`: Shake capability
pub struct Runtime<D, P>
where
    D: Driver,
    P: ShakePlugin,
{
    driver: D,
    app: App,
    hook: ShakeHook<P>,
    shakes: ShakeReceiver,
}

impl<D, P> Runtime<D, P>
where
    D: Driver,
    P: ShakePlugin,
{
    /// Create a new runtime.
    pub fn new(driver: D, plugin: P, app: App) -> Self {
        let (hook, shakes) = ShakeHook::new(plugin);
        Self { driver, app, hook, shakes }
    }

    /// Run the main event loop until the app quits.
    ///
    /// The hook is torn down on every exit path, including errors. Returns the
    /// final application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<App, RuntimeError<D::Error>> {
        let result = self.event_loop().await;

        self.hook.teardown().await;
        self.driver.stop();

        result.map(|()| self.app)
    }

    async fn event_loop(&mut self) -> Result<(), RuntimeError<D::Error>> {
        let actions = self.app.start();
        if self.process_actions(actions).await? {
            return Ok(());
        }

        loop {
            // Pending shakes are drained before the next input.
            let event = tokio::select! {
                biased;

                Some(()) = self.shakes.recv() => Some(AppEvent::ShakeDetected),
                event = self.driver.poll_event() => event.map_err(RuntimeError::Driver)?,
            };

            let Some(event) = event else { continue };
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(());
            }
        }
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(
        &mut self,
        initial_actions: Vec<AppAction>,
    ) -> Result<bool, RuntimeError<D::Error>> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => {
                        self.driver.render(&self.app).map_err(RuntimeError::Driver)?;
                    },
                    AppAction::Quit => return Ok(true),
                    AppAction::EnableDetection => self.hook.apply(true).await?,
                    AppAction::DisableDetection => self.hook.apply(false).await?,
                    AppAction::ManualShake => self.hook.plugin().manual_shake().await,
                    AppAction::RequestPermission => {
                        let granted = self.hook.plugin().request_permission().await;
                        tracing::info!(granted, "motion permission answered");
                        pending_actions.extend(self.app.handle(AppEvent::PermissionAnswered { granted }));
                    },
                    AppAction::PromptLogout => {
                        let confirmed =
                            self.driver.confirm(LOGOUT_PROMPT).await.map_err(RuntimeError::Driver)?;
                        pending_actions.extend(self.drain_shakes_while_prompting());
                        pending_actions.extend(self.app.handle(AppEvent::PromptAnswered { confirmed }));
                    },
                    AppAction::Logout => {
                        let event = match self.driver.logout().await {
                            Ok(()) => AppEvent::LoggedOut,
                            Err(error) => {
                                tracing::warn!(%error, "logout failed");
                                AppEvent::LogoutFailed { message: error.to_string() }
                            },
                        };
                        pending_actions.extend(self.app.handle(event));
                    },
                    AppAction::Shake => {
                        tracing::info!(count = self.app.shake_count(), "shake handled");
                    },
                }
            }
        }
        Ok(false)
    }

    /// Hand shakes that arrived during the prompt to the app while it still
    /// awaits the answer, so none of them opens another prompt.
    fn drain_shakes_while_prompting(&mut self) -> Vec<AppAction> {
        let mut actions = Vec::new();
        let mut drained = 0_usize;
        while self.shakes.try_recv().is_ok() {
            actions.extend(self.app.handle(AppEvent::ShakeDetected));
            drained += 1;
        }
        if drained > 0 {
            tracing::debug!(drained, "shakes received while prompting");
        }
        actions
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the hook
    pub fn hook(&self) -> &ShakeHook<P> {
        &self.hook
    }
}
