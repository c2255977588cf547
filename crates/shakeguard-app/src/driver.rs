//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal demo and simulation.
///
/// # Implementations
///
/// - **Terminal**: crossterm key events, ratatui screen and prompt dialog
/// - **Simulation**: scripted events and prompt answers, recorded calls
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Poll for the next input event.
    ///
    /// Returns an event or `None` if the input was not relevant.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Present a blocking yes/no prompt.
    ///
    /// Resolves `true` if the user confirmed.
    fn confirm(&mut self, prompt: &str) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Invoke the external logout action.
    ///
    /// # Errors
    ///
    /// Failures are reported to the app, not handled further.
    fn logout(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release platform resources.
    fn stop(&mut self);
}
