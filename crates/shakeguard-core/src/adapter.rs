//! Motion source adapters.
//!
//! An adapter attaches exactly one platform event source and tells the
//! detector how to read the raw inputs it produces. The rest of the system
//! never learns which source is active.
//!
//! - [`AccelerometerAdapter`]: continuous accelerometer samples, thresholded
//!   by the classifier. Calibrated either for native sensors (g) or browser
//!   motion events (m/s²).
//! - [`KeyboardAdapter`]: browser fallback where a designated key press is a
//!   discrete shake trigger.
//!
//! Platform primitives are reached through [`MotionSensor`], [`KeySource`],
//! and [`Haptics`], implemented by the native shell, the terminal demo, or the
//! simulation harness.
//!
//! Starting never fails: missing hardware and denied permission are reported
//! as a [`SourceStatus`] so the enable flow can still resolve.

use std::{future::Future, time::Duration};

use crate::{
    classifier::{
        DEFAULT_SAMPLE_INTERVAL, MOTION_EVENT_SHAKE_THRESHOLD, NATIVE_SHAKE_THRESHOLD,
        SIMULATED_SHAKE_KEY,
    },
    error::PlatformError,
    sample::{MotionInput, MotionSample},
};

/// Platform accelerometer.
pub trait MotionSensor: Send + 'static {
    /// Whether accelerometer hardware and the capability object exist.
    fn is_available(&self) -> bool;

    /// Whether motion access is gated by user consent on this platform.
    fn requires_permission(&self) -> bool;

    /// Prompt the user for motion-data access.
    fn request_permission(&mut self) -> impl Future<Output = Result<bool, PlatformError>> + Send;

    /// Start continuous updates at `interval`.
    fn subscribe(&mut self, interval: Duration) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Stop updates. Must tolerate being called while unsubscribed.
    fn unsubscribe(&mut self) -> impl Future<Output = ()> + Send;
}

/// Platform keyboard event source.
pub trait KeySource: Send + 'static {
    /// Attach the key listener.
    fn attach(&mut self) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Detach the key listener. Must tolerate being called while detached.
    fn detach(&mut self) -> impl Future<Output = ()> + Send;
}

/// Strength of a haptic pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticIntensity {
    /// Light tap
    Light,
    /// Medium tap
    Medium,
    /// Heavy impact, used for shakes
    Heavy,
}

/// Platform haptic engine. Best-effort.
pub trait Haptics: Send + Sync + 'static {
    /// Pulse once at `intensity`.
    fn pulse(&self, intensity: HapticIntensity) -> Result<(), PlatformError>;
}

/// Haptics for platforms without a haptic engine. Pulses are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self, _intensity: HapticIntensity) -> Result<(), PlatformError> {
        Ok(())
    }
}

/// Which kind of event source an adapter attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Continuous accelerometer samples
    Accelerometer,
    /// Keyboard simulation
    Keyboard,
}

/// Result of starting an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// Event source attached; inputs will flow.
    Attached,
    /// No hardware or capability. Detection stays inert.
    Unavailable,
    /// Permission missing on a permission-gated platform. Detection stays inert.
    PermissionDenied,
}

/// A raw input after adapter interpretation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// Sample to be thresholded by the classifier.
    Sample(MotionSample),
    /// Discrete trigger; only the cooldown applies.
    Trigger,
}

/// How raw inputs are read while a source is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFilter {
    /// Accept accelerometer samples, ignore keys.
    Accelerometer,
    /// Accept the designated key (case-insensitive), ignore samples.
    Keyboard {
        /// Key acting as a shake
        key: char,
    },
}

impl InputFilter {
    /// Interpret a raw input. `None` means the input is ignored.
    pub fn interpret(self, input: MotionInput) -> Option<Signal> {
        match (self, input) {
            (Self::Accelerometer, MotionInput::Sample(sample)) => Some(Signal::Sample(sample)),
            (Self::Keyboard { key }, MotionInput::Key(pressed))
                if pressed.eq_ignore_ascii_case(&key) =>
            {
                Some(Signal::Trigger)
            },
            _ => None,
        }
    }
}

/// Platform-specific acquisition of motion inputs.
pub trait MotionAdapter: Send + 'static {
    /// Kind of source this adapter attaches.
    fn kind(&self) -> SourceKind;

    /// Magnitude threshold calibrated for this adapter's units.
    fn threshold(&self) -> f64;

    /// Whether the platform gates this source behind a permission prompt.
    fn requires_permission(&self) -> bool;

    /// Prompt for permission. Resolves `true` on platforms without a
    /// permission concept; prompt failures resolve `false`.
    fn request_permission(&mut self) -> impl Future<Output = bool> + Send;

    /// Attach the event source. Idempotent.
    ///
    /// `permitted` is the detector's current permission status.
    fn start(&mut self, permitted: bool) -> impl Future<Output = SourceStatus> + Send;

    /// Detach the event source. Idempotent.
    fn stop(&mut self) -> impl Future<Output = ()> + Send;

    /// Whether an event source is currently attached.
    fn is_attached(&self) -> bool;

    /// How to read inputs while attached.
    fn filter(&self) -> InputFilter;
}

/// Accelerometer-backed adapter.
#[derive(Debug)]
pub struct AccelerometerAdapter<S: MotionSensor> {
    sensor: S,
    threshold: f64,
    interval: Duration,
    attached: bool,
}

impl<S: MotionSensor> AccelerometerAdapter<S> {
    /// Adapter with an explicit threshold.
    pub fn new(sensor: S, threshold: f64) -> Self {
        Self { sensor, threshold, interval: DEFAULT_SAMPLE_INTERVAL, attached: false }
    }

    /// Calibration for native accelerometers reporting in g.
    pub fn native(sensor: S) -> Self {
        Self::new(sensor, NATIVE_SHAKE_THRESHOLD)
    }

    /// Calibration for browser motion events reporting in m/s².
    pub fn motion_events(sensor: S) -> Self {
        Self::new(sensor, MOTION_EVENT_SHAKE_THRESHOLD)
    }

    /// Override the sampling interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Requested sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Underlying sensor.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }
}

impl<S: MotionSensor> MotionAdapter for AccelerometerAdapter<S> {
    fn kind(&self) -> SourceKind {
        SourceKind::Accelerometer
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn requires_permission(&self) -> bool {
        self.sensor.requires_permission()
    }

    async fn request_permission(&mut self) -> bool {
        if !self.sensor.requires_permission() {
            tracing::debug!("motion permission not required on this platform");
            return true;
        }

        match self.sensor.request_permission().await {
            Ok(granted) => {
                tracing::debug!(granted, "motion permission prompt answered");
                granted
            },
            Err(error) => {
                tracing::warn!(%error, "motion permission request failed");
                false
            },
        }
    }

    async fn start(&mut self, permitted: bool) -> SourceStatus {
        if self.attached {
            return SourceStatus::Attached;
        }

        if !self.sensor.is_available() {
            tracing::warn!("accelerometer unavailable, shake detection inert");
            return SourceStatus::Unavailable;
        }

        if self.sensor.requires_permission() && !permitted {
            tracing::warn!("motion permission denied, falling back to manual triggers");
            return SourceStatus::PermissionDenied;
        }

        match self.sensor.subscribe(self.interval).await {
            Ok(()) => {
                self.attached = true;
                tracing::debug!(interval = ?self.interval, "accelerometer attached");
                SourceStatus::Attached
            },
            Err(PlatformError::PermissionDenied) => {
                tracing::warn!("accelerometer refused subscription: permission denied");
                SourceStatus::PermissionDenied
            },
            Err(error) => {
                tracing::warn!(%error, "accelerometer subscription failed");
                SourceStatus::Unavailable
            },
        }
    }

    async fn stop(&mut self) {
        if !self.attached {
            return;
        }
        self.sensor.unsubscribe().await;
        self.attached = false;
        tracing::debug!("accelerometer detached");
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn filter(&self) -> InputFilter {
        InputFilter::Accelerometer
    }
}

/// Keyboard simulation adapter for environments without motion sensors.
#[derive(Debug)]
pub struct KeyboardAdapter<K: KeySource> {
    keys: K,
    key: char,
    attached: bool,
}

impl<K: KeySource> KeyboardAdapter<K> {
    /// Adapter treating [`SIMULATED_SHAKE_KEY`] as a shake.
    pub fn new(keys: K) -> Self {
        Self::with_key(keys, SIMULATED_SHAKE_KEY)
    }

    /// Adapter treating `key` as a shake.
    pub fn with_key(keys: K, key: char) -> Self {
        Self { keys, key, attached: false }
    }

    /// Underlying key source.
    pub fn keys(&self) -> &K {
        &self.keys
    }
}

impl<K: KeySource> MotionAdapter for KeyboardAdapter<K> {
    fn kind(&self) -> SourceKind {
        SourceKind::Keyboard
    }

    // Key presses are discrete triggers and never reach the magnitude check.
    fn threshold(&self) -> f64 {
        MOTION_EVENT_SHAKE_THRESHOLD
    }

    fn requires_permission(&self) -> bool {
        false
    }

    async fn request_permission(&mut self) -> bool {
        true
    }

    async fn start(&mut self, _permitted: bool) -> SourceStatus {
        if self.attached {
            return SourceStatus::Attached;
        }

        match self.keys.attach().await {
            Ok(()) => {
                self.attached = true;
                tracing::debug!(key = %self.key, "keyboard simulation attached");
                SourceStatus::Attached
            },
            Err(error) => {
                tracing::warn!(%error, "keyboard listener unavailable");
                SourceStatus::Unavailable
            },
        }
    }

    async fn stop(&mut self) {
        if !self.attached {
            return;
        }
        self.keys.detach().await;
        self.attached = false;
        tracing::debug!("keyboard simulation detached");
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn filter(&self) -> InputFilter {
        InputFilter::Keyboard { key: self.key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sensor fake counting subscriptions.
    #[derive(Debug, Default)]
    struct FakeSensor {
        missing: bool,
        gated: bool,
        grant: bool,
        subscriptions: usize,
        unsubscriptions: usize,
    }

    impl MotionSensor for FakeSensor {
        fn is_available(&self) -> bool {
            !self.missing
        }

        fn requires_permission(&self) -> bool {
            self.gated
        }

        async fn request_permission(&mut self) -> Result<bool, PlatformError> {
            Ok(self.grant)
        }

        async fn subscribe(&mut self, _interval: Duration) -> Result<(), PlatformError> {
            self.subscriptions += 1;
            Ok(())
        }

        async fn unsubscribe(&mut self) {
            self.unsubscriptions += 1;
        }
    }

    #[derive(Debug, Default)]
    struct FakeKeys {
        attached: usize,
    }

    impl KeySource for FakeKeys {
        async fn attach(&mut self) -> Result<(), PlatformError> {
            self.attached += 1;
            Ok(())
        }

        async fn detach(&mut self) {}
    }

    #[tokio::test]
    async fn start_twice_subscribes_once() {
        let mut adapter = AccelerometerAdapter::native(FakeSensor::default());

        assert_eq!(adapter.start(true).await, SourceStatus::Attached);
        assert_eq!(adapter.start(true).await, SourceStatus::Attached);
        assert_eq!(adapter.sensor().subscriptions, 1);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let mut adapter = AccelerometerAdapter::native(FakeSensor::default());

        adapter.stop().await;
        let _ = adapter.start(true).await;
        adapter.stop().await;
        adapter.stop().await;

        assert_eq!(adapter.sensor().unsubscriptions, 1);
        assert!(!adapter.is_attached());
    }

    #[tokio::test]
    async fn missing_hardware_is_soft_failure() {
        let sensor = FakeSensor { missing: true, ..FakeSensor::default() };
        let mut adapter = AccelerometerAdapter::native(sensor);

        assert_eq!(adapter.start(true).await, SourceStatus::Unavailable);
        assert!(!adapter.is_attached());
    }

    #[tokio::test]
    async fn gated_sensor_needs_permission() {
        let sensor = FakeSensor { gated: true, grant: false, ..FakeSensor::default() };
        let mut adapter = AccelerometerAdapter::native(sensor);

        let granted = adapter.request_permission().await;
        assert!(!granted);
        assert_eq!(adapter.start(granted).await, SourceStatus::PermissionDenied);
        assert_eq!(adapter.sensor().subscriptions, 0);
    }

    #[tokio::test]
    async fn ungated_sensor_grants_without_prompt() {
        let mut adapter = AccelerometerAdapter::motion_events(FakeSensor::default());
        assert!(adapter.request_permission().await);
    }

    #[tokio::test]
    async fn keyboard_attaches_once() {
        let mut adapter = KeyboardAdapter::new(FakeKeys::default());

        assert_eq!(adapter.start(false).await, SourceStatus::Attached);
        assert_eq!(adapter.start(false).await, SourceStatus::Attached);
        assert_eq!(adapter.keys().attached, 1);
    }

    #[test]
    fn keyboard_filter_matches_designated_key_only() {
        let filter = InputFilter::Keyboard { key: SIMULATED_SHAKE_KEY };

        assert_eq!(filter.interpret(MotionInput::Key('s')), Some(Signal::Trigger));
        assert_eq!(filter.interpret(MotionInput::Key('S')), Some(Signal::Trigger));
        assert_eq!(filter.interpret(MotionInput::Key('d')), None);
        assert_eq!(filter.interpret(MotionInput::Sample(MotionSample::new(30.0, 0.0, 0.0))), None);
    }

    #[test]
    fn accelerometer_filter_ignores_keys() {
        let sample = MotionSample::new(1.0, 2.0, 3.0);
        assert_eq!(
            InputFilter::Accelerometer.interpret(MotionInput::Sample(sample)),
            Some(Signal::Sample(sample))
        );
        assert_eq!(InputFilter::Accelerometer.interpret(MotionInput::Key('s')), None);
    }
}
