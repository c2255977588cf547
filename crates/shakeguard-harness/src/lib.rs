//! Deterministic simulation harness for shake detection testing.
//!
//! Virtual-clock implementations of [`shakeguard_core::Environment`] and the
//! platform traits (motion sensor, key source, haptics), so the real detector
//! and the real app runtime run reproducibly without hardware or wall time.
//!
//! # Model-Based Testing
//!
//! The `rig` module wires a detector to simulated hardware and applies
//! abstract [`Operation`]s to it. The same operations drive the native and the
//! web rig, so their notification logs can be compared directly.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! detector invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod motion;
pub mod rig;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_platform;

pub use invariants::{
    CooldownSpacing, DetectorSnapshot, Invariant, InvariantRegistry, InvariantResult, Observe,
    PermissionGatesSource, SilentWhenStopped, SingleAttachment, Violation,
};
pub use motion::MotionGen;
pub use rig::{NativeRig, Notification, Operation, Rig, WebRig};
pub use sim_driver::{DriverCall, SimDriver, SimDriverError, SimStep};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_platform::{KeysState, PromptAnswer, SensorState, SimHaptics, SimKeys, SimSensor};
