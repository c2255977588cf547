//! Shake detection core.
//!
//! Platform-independent shake detection: a cooldown-gated magnitude
//! classifier, motion source adapters, and the detector service that ties
//! them to permission prompts, haptic feedback, and shake listeners.
//!
//! # Components
//!
//! - [`ShakeClassifier`]: pure threshold/cooldown decision
//! - [`MotionAdapter`]: attaches one platform event source (accelerometer or
//!   keyboard simulation)
//! - [`ShakeDetector`]: lifecycle, permission, listeners, haptics
//! - [`ShakePlugin`]: uniform capability surface, resolved once per process
//!   by [`PluginRegistry`]
//!
//! Time is read only through [`Environment`], so the whole core runs
//! unchanged under a virtual clock.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod adapter;
pub mod classifier;
pub mod detector;
pub mod env;
pub mod error;
pub mod listener;
pub mod plugin;
pub mod sample;

pub use adapter::{
    AccelerometerAdapter, HapticIntensity, Haptics, InputFilter, KeySource, KeyboardAdapter,
    MotionAdapter, MotionSensor, NoHaptics, Signal, SourceKind, SourceStatus,
};
pub use classifier::{Classification, ClassifierConfig, ShakeClassifier};
pub use detector::{
    DetectorConfig, DetectorState, DetectorStats, Lifecycle, ShakeDetector, TriggerOrigin,
};
pub use env::Environment;
pub use error::{DetectorError, ListenerError, PlatformError};
pub use listener::{
    EventName, ListenerHandle, ListenerId, ListenerResult, ShakeListener, listener_fn,
};
pub use plugin::{
    NativeShake, Platform, PluginRegistry, RuntimeProbe, ShakeBackend, ShakePlugin, WebShake,
};
pub use sample::{MotionInput, MotionSample};
