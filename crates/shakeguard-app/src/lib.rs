//! Application layer for shakeguard
//!
//! Binds the shake capability to authentication state and user settings, and
//! turns raw shake notifications into application-level actions. Everything
//! here is generic over the platform so the same orchestration runs in the
//! terminal demo and in deterministic simulation.
//!
//! # Components
//!
//! - [`App`]: pure state machine (auth, settings, prompt, shake counter)
//! - [`ShakeHook`]: owns the current shake subscription (replace-on-change)
//! - [`Driver`]: trait for platform-specific I/O (prompt, logout, render)
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod hook;
mod input;
mod runtime;
mod settings;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use hook::{ShakeHook, ShakeReceiver};
pub use input::KeyInput;
pub use runtime::{LOGOUT_PROMPT, Runtime, RuntimeError};
pub use settings::ShakeSettings;
