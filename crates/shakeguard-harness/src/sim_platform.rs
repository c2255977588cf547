//! Simulated platform primitives.
//!
//! In-memory implementations of [`MotionSensor`], [`KeySource`], and
//! [`Haptics`] with knobs for the degraded environments the detector must
//! tolerate (no hardware, gated permission, denied prompt, broken haptics)
//! and counters the tests assert on.
//!
//! Every type is a cheap handle over shared state: keep a clone to inspect or
//! reconfigure the platform after moving the original into an adapter.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shakeguard_core::{HapticIntensity, Haptics, KeySource, MotionSensor, PlatformError};

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How the simulated user answers a motion permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Grant access.
    Grant,
    /// Deny access.
    Deny,
    /// The prompt itself fails.
    Fail,
}

/// Observable accelerometer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorState {
    /// Hardware present
    pub available: bool,
    /// Access gated by a permission prompt
    pub gated: bool,
    /// Answer to prompts once the queue is empty
    pub answer: PromptAnswer,
    /// One-off answers consumed by the next prompts, in order
    pub queued_answers: VecDeque<PromptAnswer>,
    /// Prompts shown so far
    pub prompts: usize,
    /// Currently delivering samples
    pub subscribed: bool,
    /// Subscriptions made so far
    pub subscriptions: usize,
    /// Interval of the last subscription
    pub interval: Option<Duration>,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            available: true,
            gated: false,
            answer: PromptAnswer::Grant,
            queued_answers: VecDeque::new(),
            prompts: 0,
            subscribed: false,
            subscriptions: 0,
            interval: None,
        }
    }
}

/// Simulated accelerometer.
#[derive(Debug, Clone, Default)]
pub struct SimSensor {
    state: Arc<Mutex<SensorState>>,
}

impl SimSensor {
    /// Ungated sensor with hardware present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sensor without hardware.
    pub fn missing() -> Self {
        let sensor = Self::new();
        lock(&sensor.state).available = false;
        sensor
    }

    /// Permission-gated sensor answering prompts with `answer`.
    pub fn gated(answer: PromptAnswer) -> Self {
        let sensor = Self::new();
        {
            let mut state = lock(&sensor.state);
            state.gated = true;
            state.answer = answer;
        }
        sensor
    }

    /// Change how future prompts are answered.
    pub fn set_answer(&self, answer: PromptAnswer) {
        lock(&self.state).answer = answer;
    }

    /// Answer the next prompts with `answers` before falling back to the
    /// standing answer.
    pub fn queue_answers(&self, answers: impl IntoIterator<Item = PromptAnswer>) {
        lock(&self.state).queued_answers.extend(answers);
    }

    /// Copy of the current state.
    pub fn state(&self) -> SensorState {
        lock(&self.state).clone()
    }
}

impl MotionSensor for SimSensor {
    fn is_available(&self) -> bool {
        lock(&self.state).available
    }

    fn requires_permission(&self) -> bool {
        lock(&self.state).gated
    }

    async fn request_permission(&mut self) -> Result<bool, PlatformError> {
        let mut state = lock(&self.state);
        state.prompts += 1;
        let answer = state.queued_answers.pop_front().unwrap_or(state.answer);
        match answer {
            PromptAnswer::Grant => Ok(true),
            PromptAnswer::Deny => Ok(false),
            PromptAnswer::Fail => Err(PlatformError::Bridge("permission prompt failed".into())),
        }
    }

    async fn subscribe(&mut self, interval: Duration) -> Result<(), PlatformError> {
        let mut state = lock(&self.state);
        if !state.available {
            return Err(PlatformError::SensorUnavailable { reason: "no accelerometer".into() });
        }
        state.subscribed = true;
        state.subscriptions += 1;
        state.interval = Some(interval);
        Ok(())
    }

    async fn unsubscribe(&mut self) {
        lock(&self.state).subscribed = false;
    }
}

/// Observable keyboard listener state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeysState {
    /// Listener attached
    pub attached: bool,
    /// Attachments made so far
    pub attachments: usize,
}

/// Simulated keyboard event source.
#[derive(Debug, Clone, Default)]
pub struct SimKeys {
    state: Arc<Mutex<KeysState>>,
}

impl SimKeys {
    /// Detached key source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state.
    pub fn state(&self) -> KeysState {
        lock(&self.state).clone()
    }
}

impl KeySource for SimKeys {
    async fn attach(&mut self) -> Result<(), PlatformError> {
        let mut state = lock(&self.state);
        state.attached = true;
        state.attachments += 1;
        Ok(())
    }

    async fn detach(&mut self) {
        lock(&self.state).attached = false;
    }
}

#[derive(Debug, Default)]
struct HapticsState {
    pulses: Vec<HapticIntensity>,
    broken: bool,
}

/// Simulated haptic engine recording pulses.
#[derive(Debug, Clone, Default)]
pub struct SimHaptics {
    state: Arc<Mutex<HapticsState>>,
}

impl SimHaptics {
    /// Working haptic engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Haptic engine that fails every pulse.
    pub fn broken() -> Self {
        let haptics = Self::new();
        lock(&haptics.state).broken = true;
        haptics
    }

    /// Pulses delivered so far.
    pub fn pulses(&self) -> Vec<HapticIntensity> {
        lock(&self.state).pulses.clone()
    }
}

impl Haptics for SimHaptics {
    fn pulse(&self, intensity: HapticIntensity) -> Result<(), PlatformError> {
        let mut state = lock(&self.state);
        if state.broken {
            return Err(PlatformError::HapticsUnavailable { reason: "simulated failure".into() });
        }
        state.pulses.push(intensity);
        Ok(())
    }
}
