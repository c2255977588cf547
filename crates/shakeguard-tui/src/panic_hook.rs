//! Panic reporting while the terminal belongs to the UI.
//!
//! Listener panics are caught and survived by the detector, but the default
//! hook still prints them to the terminal, over the alternate screen. While
//! the UI runs, panic reports go to the log instead.

use std::panic::{self, PanicHookInfo};

/// Replace the panic hook with one that logs through `tracing`.
///
/// Call [`restore`] once the terminal is handed back.
pub fn route_to_tracing() {
    panic::set_hook(Box::new(report));
}

/// Reinstall the default panic hook.
pub fn restore() {
    drop(panic::take_hook());
}

fn report(info: &PanicHookInfo<'_>) {
    let location = info.location().map(ToString::to_string).unwrap_or_default();
    let message = info
        .payload()
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_default();
    tracing::error!(%location, %message, "panic");
}
