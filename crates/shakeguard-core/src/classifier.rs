//! Shake classification.
//!
//! Turns a motion sample (or a discrete trigger) into a shake decision. The
//! only quantitative logic in the subsystem lives here:
//!
//! ```text
//! magnitude = sqrt(x² + y² + z²)
//! shake     = magnitude > threshold  &&  now - last_shake > cooldown
//! ```
//!
//! Discrete triggers (simulated key press, manual shake) skip the magnitude
//! check but still pass the cooldown gate. On a positive decision the
//! last-shake timestamp is committed immediately, before the caller notifies
//! anyone, so a listener that re-enters the detector cannot double count.

use std::{ops::Sub, time::Duration};

use crate::sample::MotionSample;

/// Magnitude threshold for native accelerometers reporting in g.
pub const NATIVE_SHAKE_THRESHOLD: f64 = 2.5;

/// Magnitude threshold for `devicemotion`-style events reporting in m/s².
pub const MOTION_EVENT_SHAKE_THRESHOLD: f64 = 15.0;

/// Minimum time between two accepted shakes.
pub const DEFAULT_SHAKE_COOLDOWN: Duration = Duration::from_millis(1000);

/// Accelerometer update interval requested from native sensors.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Key treated as a shake by the keyboard simulation (case-insensitive).
pub const SIMULATED_SHAKE_KEY: char = 's';

/// Classifier tuning.
///
/// Thresholds are calibrated against the units of a specific adapter and are
/// not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    /// Magnitude a sample must strictly exceed
    pub threshold: f64,
    /// Refractory window after an accepted shake
    pub cooldown: Duration,
}

impl ClassifierConfig {
    /// Calibration for native accelerometers (g units).
    pub fn native() -> Self {
        Self { threshold: NATIVE_SHAKE_THRESHOLD, cooldown: DEFAULT_SHAKE_COOLDOWN }
    }

    /// Calibration for browser motion events (m/s² units).
    pub fn motion_events() -> Self {
        Self { threshold: MOTION_EVENT_SHAKE_THRESHOLD, cooldown: DEFAULT_SHAKE_COOLDOWN }
    }

    /// Replace the cooldown window.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::motion_events()
    }
}

/// Outcome of classifying one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Accepted shake. The last-shake timestamp has been updated.
    Shake,
    /// Sample magnitude did not exceed the threshold.
    BelowThreshold,
    /// Input would have been a shake but arrived inside the cooldown window.
    Cooldown,
}

impl Classification {
    /// Whether the input was accepted as a shake.
    pub fn is_shake(self) -> bool {
        matches!(self, Self::Shake)
    }
}

/// Cooldown-gated shake classifier.
///
/// Pure state machine: time is passed in by the caller. Generic over the
/// instant type so tests can drive it with virtual time.
#[derive(Debug, Clone)]
pub struct ShakeClassifier<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    config: ClassifierConfig,
    /// Time of the last accepted shake. `None` until the first shake.
    last_shake: Option<I>,
}

impl<I> ShakeClassifier<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a classifier that has never seen a shake.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config, last_shake: None }
    }

    /// Active configuration.
    pub fn config(&self) -> ClassifierConfig {
        self.config
    }

    /// Time of the last accepted shake. `None` if none yet.
    pub fn last_shake(&self) -> Option<I> {
        self.last_shake
    }

    /// Classify an accelerometer sample taken at `now`.
    ///
    /// Non-finite readings are sensor glitches and never count as shakes.
    pub fn classify(&mut self, sample: &MotionSample, now: I) -> Classification {
        let magnitude = sample.magnitude();
        if !magnitude.is_finite() || magnitude <= self.config.threshold {
            return Classification::BelowThreshold;
        }
        self.gate(now)
    }

    /// Classify a discrete trigger (key press, manual shake) at `now`.
    ///
    /// Skips the magnitude check; only the cooldown applies.
    pub fn accept_trigger(&mut self, now: I) -> Classification {
        self.gate(now)
    }

    fn gate(&mut self, now: I) -> Classification {
        if let Some(last) = self.last_shake
            && now - last <= self.config.cooldown
        {
            return Classification::Cooldown;
        }

        self.last_shake = Some(now);
        Classification::Shake
    }
}
