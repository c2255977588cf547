//! Model-based test rigs.
//!
//! A [`Rig`] wires a real [`ShakeDetector`] to simulated platform primitives
//! on a virtual clock and applies abstract [`Operation`]s to it. Each
//! operation maps to the platform-appropriate mechanism: a `Trigger` is a
//! violent accelerometer sample on the native rig and a press of the shake key
//! on the web rig.
//!
//! Every listener the rig registers appends a [`Notification`] to a shared
//! log, so two rigs fed the same operations can be compared notification for
//! notification.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use arbitrary::Arbitrary;
use serde::Serialize;
use shakeguard_core::{
    AccelerometerAdapter, DetectorConfig, Haptics, KeyboardAdapter, ListenerHandle, MotionAdapter,
    MotionInput, NoHaptics, ShakeDetector, classifier::SIMULATED_SHAKE_KEY, listener_fn,
};

use crate::{
    DetectorSnapshot, MotionGen, Observe, SimEnv, SimHaptics, SimInstant, SimKeys, SimSensor,
};

/// Operations that can be applied to a rig.
///
/// Kept small and composable so proptest and the fuzzer can explore
/// interesting interleavings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// `enable_listening`
    Enable,
    /// `stop_listening`
    Stop,
    /// Register a fresh recording listener.
    AddListener,
    /// `remove_all_listeners`
    RemoveAll,
    /// Remove the oldest live listener through its handle.
    RemoveOldest,
    /// Physical shake through the attached source.
    Trigger,
    /// Input that must never count as a shake.
    Idle,
    /// `manual_shake`
    ManualShake,
    /// Advance virtual time.
    Advance {
        /// Milliseconds to advance
        millis: u16,
    },
}

/// One listener invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Index of the operation that caused it
    pub step: usize,
    /// Registration order of the listener (0-based, never reused)
    pub listener: usize,
}

/// How the rig produces physical inputs.
#[derive(Debug, Clone)]
enum InputStyle {
    Motion { generator: MotionGen, threshold: f64 },
    Keys,
}

impl InputStyle {
    fn trigger(&mut self) -> MotionInput {
        match self {
            Self::Motion { generator, threshold } => MotionInput::Sample(generator.shake(*threshold)),
            Self::Keys => MotionInput::Key(SIMULATED_SHAKE_KEY),
        }
    }

    fn idle(&mut self) -> MotionInput {
        match self {
            Self::Motion { generator, .. } => MotionInput::Sample(generator.resting()),
            Self::Keys => MotionInput::Key('x'),
        }
    }
}

/// Native rig: accelerometer plus haptics.
pub type NativeRig<H> = Rig<AccelerometerAdapter<SimSensor>, H, SimSensor>;

/// Web rig: keyboard simulation, no haptics.
pub type WebRig = Rig<KeyboardAdapter<SimKeys>, NoHaptics, SimKeys>;

/// A detector on simulated hardware, driven by [`Operation`]s.
pub struct Rig<A, H, P>
where
    A: MotionAdapter,
    H: Haptics,
    P: Observe,
{
    env: SimEnv,
    detector: ShakeDetector<SimEnv, A, H>,
    platform: P,
    input: InputStyle,
    log: Arc<Mutex<Vec<Notification>>>,
    step: Arc<AtomicUsize>,
    handles: Vec<ListenerHandle>,
    next_listener: usize,
    enables: usize,
    shake_times: Vec<SimInstant>,
}

impl<H: Haptics> Rig<AccelerometerAdapter<SimSensor>, H, SimSensor> {
    /// Native detector on `sensor`, with g-unit calibration.
    pub fn native(sensor: SimSensor, haptics: H, seed: u64) -> Self {
        let env = SimEnv::new();
        let adapter = AccelerometerAdapter::native(sensor.clone());
        let threshold = adapter.threshold();
        let detector = ShakeDetector::new(env.clone(), adapter, haptics, DetectorConfig::default());
        let input = InputStyle::Motion { generator: MotionGen::g_units(seed), threshold };
        Self::assemble(env, detector, sensor, input)
    }
}

impl Rig<KeyboardAdapter<SimKeys>, NoHaptics, SimKeys> {
    /// Web fallback detector on `keys`.
    pub fn web(keys: SimKeys) -> Self {
        let env = SimEnv::new();
        let detector = ShakeDetector::new(
            env.clone(),
            KeyboardAdapter::new(keys.clone()),
            NoHaptics,
            DetectorConfig::default(),
        );
        Self::assemble(env, detector, keys, InputStyle::Keys)
    }
}

impl<A, H, P> Rig<A, H, P>
where
    A: MotionAdapter,
    H: Haptics,
    P: Observe,
{
    fn assemble(env: SimEnv, detector: ShakeDetector<SimEnv, A, H>, platform: P, input: InputStyle) -> Self {
        Self {
            env,
            detector,
            platform,
            input,
            log: Arc::default(),
            step: Arc::default(),
            handles: Vec::new(),
            next_listener: 0,
            enables: 0,
            shake_times: Vec::new(),
        }
    }

    /// Apply one operation.
    pub async fn apply(&mut self, operation: Operation) {
        match operation {
            Operation::Enable => {
                let was_listening = self.detector.is_listening();
                self.detector.enable_listening().await;
                if !was_listening && self.detector.is_listening() {
                    self.enables += 1;
                }
            },
            Operation::Stop => self.detector.stop_listening().await,
            Operation::AddListener => {
                let listener = self.next_listener;
                self.next_listener += 1;
                let log = Arc::clone(&self.log);
                let step = Arc::clone(&self.step);
                let callback = listener_fn(move || {
                    let step = step.load(Ordering::SeqCst);
                    log.lock().unwrap_or_else(PoisonError::into_inner).push(Notification { step, listener });
                });
                match self.detector.add_listener("shake", callback).await {
                    Ok(handle) => self.handles.push(handle),
                    Err(error) => tracing::error!(%error, "rig listener rejected"),
                }
            },
            Operation::RemoveAll => {
                self.detector.remove_all_listeners().await;
                self.handles.clear();
            },
            Operation::RemoveOldest => {
                if !self.handles.is_empty() {
                    self.handles.remove(0).remove();
                }
            },
            Operation::Trigger => {
                let input = self.input.trigger();
                self.detector.handle_input(input);
            },
            Operation::Idle => {
                let input = self.input.idle();
                self.detector.handle_input(input);
            },
            Operation::ManualShake => {
                self.detector.manual_shake().await;
            },
            Operation::Advance { millis } => self.env.advance_ms(u64::from(millis)),
        }

        if let Some(last) = self.detector.state().last_shake
            && self.shake_times.last() != Some(&last)
        {
            self.shake_times.push(last);
        }
        self.step.fetch_add(1, Ordering::SeqCst);
    }

    /// Apply every operation in order.
    pub async fn run(&mut self, operations: &[Operation]) {
        for &operation in operations {
            self.apply(operation).await;
        }
    }

    /// The supported abort path: stop, then drop every listener.
    pub async fn teardown(&mut self) {
        self.detector.stop_listening().await;
        self.detector.remove_all_listeners().await;
        self.handles.clear();
    }

    /// Notifications delivered so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Observable state for invariant checks.
    pub fn snapshot(&self) -> DetectorSnapshot {
        DetectorSnapshot::capture(&self.detector, &self.platform, self.enables, &self.shake_times)
    }

    /// The detector under test.
    pub fn detector(&self) -> &ShakeDetector<SimEnv, A, H> {
        &self.detector
    }

    /// The virtual clock.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }
}
