//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`shakeguard_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Steps are scripted up front. Physical inputs are pushed into the platform
//! through an input sink (normally `ShakeDetector::handle_input`), exactly as
//! a native event source would. When the script runs out the driver asks the
//! app to quit.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shakeguard_app::{App, AppEvent, Driver};
use shakeguard_core::MotionInput;
use thiserror::Error;

use crate::SimEnv;

/// Error type for simulation driver.
#[derive(Debug, Clone, Error)]
#[error("sim driver: {0}")]
pub struct SimDriverError(pub String);

/// One scripted step.
#[derive(Debug, Clone)]
pub enum SimStep {
    /// Deliver an app event.
    Event(AppEvent),
    /// Push a raw input into the attached event source.
    Input(MotionInput),
    /// Advance the virtual clock.
    Advance(Duration),
}

/// Platform call observed by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// Confirmation prompt shown.
    Confirm(String),
    /// Logout invoked.
    Logout,
    /// Frame rendered.
    Render {
        /// Shake counter at render time
        shake_count: u64,
        /// Detection requested active at render time
        detection_active: bool,
    },
}

type InputSink = Arc<dyn Fn(MotionInput) -> bool + Send + Sync>;

#[derive(Default)]
struct SharedState {
    steps: VecDeque<SimStep>,
    answers: VecDeque<bool>,
    failing_logouts: usize,
    calls: Vec<DriverCall>,
}

/// Simulation driver for deterministic testing.
///
/// Cheap to clone; clones share the script and the call log, so a test keeps
/// one clone to inspect after moving the other into the runtime.
#[derive(Clone)]
pub struct SimDriver {
    env: SimEnv,
    state: Arc<Mutex<SharedState>>,
    sink: Option<InputSink>,
}

impl SimDriver {
    /// Create a driver on `env` with an empty script.
    pub fn new(env: SimEnv) -> Self {
        Self { env, state: Arc::default(), sink: None }
    }

    /// Route scripted inputs to `sink`.
    #[must_use]
    pub fn with_input_sink(mut self, sink: impl Fn(MotionInput) -> bool + Send + Sync + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Append a step to the script.
    pub fn push(&self, step: SimStep) {
        self.lock().steps.push_back(step);
    }

    /// Append an app event.
    pub fn inject_event(&self, event: AppEvent) {
        self.push(SimStep::Event(event));
    }

    /// Append a raw input.
    pub fn inject_input(&self, input: MotionInput) {
        self.push(SimStep::Input(input));
    }

    /// Append a clock advance.
    pub fn advance(&self, by: Duration) {
        self.push(SimStep::Advance(by));
    }

    /// Queue the answer to the next confirmation prompt. Unqueued prompts
    /// are declined.
    pub fn answer(&self, confirmed: bool) {
        self.lock().answers.push_back(confirmed);
    }

    /// Make the next `count` logout calls fail.
    pub fn fail_logouts(&self, count: usize) {
        self.lock().failing_logouts = count;
    }

    /// Every platform call so far, in order.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.lock().calls.clone()
    }

    /// Whether scripted steps remain.
    pub fn has_pending(&self) -> bool {
        !self.lock().steps.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let step = self.lock().steps.pop_front();

        match step {
            None => Ok(Some(AppEvent::Quit)),
            Some(SimStep::Event(event)) => Ok(Some(event)),
            Some(SimStep::Input(input)) => {
                let sink = self.sink.as_ref().ok_or_else(|| SimDriverError("no input sink".into()))?;
                sink(input);
                Ok(None)
            },
            Some(SimStep::Advance(by)) => {
                self.env.advance(by);
                Ok(None)
            },
        }
    }

    async fn confirm(&mut self, prompt: &str) -> Result<bool, Self::Error> {
        let mut state = self.lock();
        state.calls.push(DriverCall::Confirm(prompt.to_string()));
        Ok(state.answers.pop_front().unwrap_or(false))
    }

    async fn logout(&mut self) -> Result<(), Self::Error> {
        let mut state = self.lock();
        state.calls.push(DriverCall::Logout);
        if state.failing_logouts > 0 {
            state.failing_logouts -= 1;
            return Err(SimDriverError("logout rejected".into()));
        }
        Ok(())
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.lock().calls.push(DriverCall::Render {
            shake_count: app.shake_count(),
            detection_active: app.detection_active(),
        });
        Ok(())
    }

    fn stop(&mut self) {}
}
