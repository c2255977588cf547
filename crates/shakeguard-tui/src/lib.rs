//! Terminal UI for shake-to-logout
//!
//! A thin shell over [`shakeguard_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`shakeguard_app::Runtime`].
//!
//! This crate only handles terminal rendering and the terminal's stand-ins for
//! device primitives.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod panic_hook;
pub mod platform;
pub mod system_env;
pub mod terminal;
pub mod ui;

pub use platform::{TerminalBell, TerminalKeys, TerminalSensor, TerminalShake};
pub use shakeguard_app::{App, AppEvent, Driver, KeyInput, Runtime, ShakeSettings};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
