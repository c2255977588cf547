//! Terminal platform primitives and capability wiring.
//!
//! A terminal has no accelerometer and no haptic engine. The native backend
//! therefore runs on [`TerminalSensor`] (always unavailable, so only manual
//! shakes get through) and pulses by ringing the terminal bell. The web
//! backend listens for the simulated shake key through [`TerminalKeys`].

use std::{
    io::{Write, stdout},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use shakeguard_core::{
    AccelerometerAdapter, DetectorConfig, HapticIntensity, Haptics, KeySource, KeyboardAdapter,
    MotionInput, MotionSensor, NativeShake, NoHaptics, Platform, PlatformError, PluginRegistry,
    ShakeBackend, ShakeDetector, WebShake,
};

use crate::SystemEnv;

/// Accelerometer of a terminal: there is none.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSensor;

impl MotionSensor for TerminalSensor {
    fn is_available(&self) -> bool {
        false
    }

    fn requires_permission(&self) -> bool {
        false
    }

    async fn request_permission(&mut self) -> Result<bool, PlatformError> {
        Ok(true)
    }

    async fn subscribe(&mut self, _interval: Duration) -> Result<(), PlatformError> {
        Err(PlatformError::SensorUnavailable { reason: "terminal has no accelerometer".into() })
    }

    async fn unsubscribe(&mut self) {}
}

/// Keyboard listener state shared with the terminal driver.
///
/// The driver reads the key events itself; attaching only decides whether it
/// forwards them to the detector.
#[derive(Debug, Clone, Default)]
pub struct TerminalKeys {
    attached: Arc<AtomicBool>,
}

impl TerminalKeys {
    /// Detached key listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the detector currently listens for key presses.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

impl KeySource for TerminalKeys {
    async fn attach(&mut self) -> Result<(), PlatformError> {
        self.attached.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn detach(&mut self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}

/// Haptic feedback through the terminal bell.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl Haptics for TerminalBell {
    fn pulse(&self, _intensity: HapticIntensity) -> Result<(), PlatformError> {
        let mut out = stdout();
        out.write_all(b"\x07")
            .and_then(|()| out.flush())
            .map_err(|error| PlatformError::HapticsUnavailable { reason: error.to_string() })
    }
}

/// Native backend in the terminal.
pub type TerminalNative = NativeShake<SystemEnv, TerminalSensor, TerminalBell>;

/// Web backend in the terminal.
pub type TerminalWeb = WebShake<SystemEnv, TerminalKeys>;

/// Shake capability for this process.
pub type TerminalShake = Arc<PluginRegistry<TerminalNative, TerminalWeb>>;

/// Register the shake capability for `platform`.
///
/// Resolution is lazy: neither detector exists until the app first uses the
/// capability.
pub fn register(env: &SystemEnv, platform: Platform, keys: &TerminalKeys) -> TerminalShake {
    let native_env = env.clone();
    let web_env = env.clone();
    let keys = keys.clone();

    Arc::new(PluginRegistry::register(
        "ShakeDetector",
        platform,
        move || {
            ShakeDetector::new(
                native_env.clone(),
                AccelerometerAdapter::native(TerminalSensor),
                TerminalBell,
                DetectorConfig::default(),
            )
        },
        move || {
            ShakeDetector::new(
                web_env.clone(),
                KeyboardAdapter::new(keys.clone()),
                NoHaptics,
                DetectorConfig::default(),
            )
        },
    ))
}

/// Route a raw input to whichever backend the capability resolved to.
///
/// Returns `true` if the input produced a shake.
pub fn feed(shake: &TerminalShake, input: MotionInput) -> bool {
    match shake.backend() {
        ShakeBackend::Native(detector) => detector.handle_input(input),
        ShakeBackend::Web(detector) => detector.handle_input(input),
    }
}
