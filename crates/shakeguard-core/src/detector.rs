//! Shake detector service.
//!
//! The single platform-independent entry point. Owns the [`DetectorState`],
//! the listener registry, and the classifier, and drives permission prompts
//! and haptic feedback around the active [`MotionAdapter`].
//!
//! # State Machine
//!
//! ```text
//! ┌──────────┐  enable_listening   ┌───────────┐
//! │ Disabled │────────────────────>│ Listening │
//! └──────────┘<────────────────────└───────────┘
//!                stop_listening
//! ```
//!
//! Permission and attachment status are tracked separately and only decide
//! whether `Listening` actually receives inputs.
//!
//! # Concurrency
//!
//! [`ShakeDetector`] is a cheap cloneable handle; every clone drives the same
//! state. Enable/stop calls are serialized by an async lifecycle lock and made
//! idempotent, so overlapping callers cannot attach a source twice. Listener
//! notification never runs under a lock.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::{
    adapter::{HapticIntensity, Haptics, InputFilter, MotionAdapter, NoHaptics, Signal, SourceStatus},
    classifier::{Classification, ClassifierConfig, DEFAULT_SHAKE_COOLDOWN, ShakeClassifier},
    env::Environment,
    error::DetectorError,
    listener::{
        self, EventName, ListenerHandle, ListenerRegistry, SharedRegistry, ShakeListener,
        notify_all,
    },
    sample::MotionInput,
};

/// Detector configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Minimum time between two accepted shakes
    pub cooldown: Duration,
    /// Haptic pulse emitted on every accepted shake
    pub haptic_intensity: HapticIntensity,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { cooldown: DEFAULT_SHAKE_COOLDOWN, haptic_intensity: HapticIntensity::Heavy }
    }
}

/// Detector lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not listening. No event source attached.
    Disabled,
    /// Listening. An event source is attached if the platform allowed it.
    Listening,
}

/// Observable detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorState<I> {
    /// Whether `enable_listening` is in effect
    pub is_listening: bool,
    /// Result of the last permission request
    pub has_permission: bool,
    /// Time of the last accepted shake. `None` if none yet.
    pub last_shake: Option<I>,
    /// Result of the last adapter start. `None` while disabled.
    pub source: Option<SourceStatus>,
}

/// Counters for diagnostics screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorStats {
    /// Accepted shakes
    pub shakes: u64,
    /// Would-be shakes dropped by the cooldown gate
    pub suppressed: u64,
    /// Inputs dropped because no source accepts them
    pub ignored: u64,
    /// Listener invocations that failed
    pub listener_failures: u64,
}

/// What caused a shake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOrigin {
    /// Accelerometer sample above threshold
    Motion,
    /// Simulated shake key
    Key,
    /// `manual_shake` test/demo hook
    Manual,
}

impl fmt::Display for TriggerOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Motion => "motion",
            Self::Key => "key",
            Self::Manual => "manual",
        })
    }
}

/// Mutable state guarded by a synchronous lock.
#[derive(Debug)]
struct Core<I>
where
    I: Copy + Ord + std::ops::Sub<Output = Duration>,
{
    is_listening: bool,
    has_permission: bool,
    source: Option<SourceStatus>,
    /// Set only while a source is attached.
    filter: Option<InputFilter>,
    classifier: ShakeClassifier<I>,
    stats: DetectorStats,
}

struct Inner<E: Environment, A, H> {
    env: E,
    haptics: H,
    config: DetectorConfig,
    /// Serializes enable/stop/permission flows. Held across adapter awaits.
    lifecycle: tokio::sync::Mutex<A>,
    core: Mutex<Core<E::Instant>>,
    registry: SharedRegistry,
}

/// Platform-independent shake detector.
///
/// Generic over the environment (time source), the motion adapter, and the
/// haptic engine.
pub struct ShakeDetector<E: Environment, A, H = NoHaptics> {
    inner: Arc<Inner<E, A, H>>,
}

impl<E: Environment, A, H> Clone for ShakeDetector<E, A, H> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<E, A, H> ShakeDetector<E, A, H>
where
    E: Environment,
    A: MotionAdapter,
    H: Haptics,
{
    /// Create a disabled detector with no listeners.
    pub fn new(env: E, adapter: A, haptics: H, config: DetectorConfig) -> Self {
        let classifier_config =
            ClassifierConfig { threshold: adapter.threshold(), cooldown: config.cooldown };

        let core = Core {
            is_listening: false,
            has_permission: false,
            source: None,
            filter: None,
            classifier: ShakeClassifier::new(classifier_config),
            stats: DetectorStats::default(),
        };

        Self {
            inner: Arc::new(Inner {
                env,
                haptics,
                config,
                lifecycle: tokio::sync::Mutex::new(adapter),
                core: Mutex::new(core),
                registry: Arc::new(Mutex::new(ListenerRegistry::new())),
            }),
        }
    }

    /// Start listening for shakes.
    ///
    /// Idempotent. Requests permission, marks the detector listening, and
    /// attaches the adapter. Always resolves: missing hardware or denied
    /// permission leave detection inert and are only logged.
    pub async fn enable_listening(&self) {
        let mut adapter = self.inner.lifecycle.lock().await;

        let already = self.core().is_listening;
        if already {
            tracing::debug!("already listening");
            return;
        }

        let permitted = self.request_permission_locked(&mut adapter).await;
        self.core().is_listening = true;

        let status = adapter.start(permitted).await;
        let filter = (status == SourceStatus::Attached).then(|| adapter.filter());
        {
            let mut core = self.core();
            core.source = Some(status);
            core.filter = filter;
        }

        tracing::info!(kind = ?adapter.kind(), ?status, permitted, "shake detection enabled");
    }

    /// Stop listening for shakes.
    ///
    /// Idempotent. Detaches the adapter. Listeners stay registered.
    pub async fn stop_listening(&self) {
        let mut adapter = self.inner.lifecycle.lock().await;

        let listening = {
            let mut core = self.core();
            // Drop inputs racing with the detach.
            core.filter = None;
            core.is_listening
        };
        if !listening {
            tracing::debug!("already stopped");
            return;
        }

        adapter.stop().await;
        {
            let mut core = self.core();
            core.is_listening = false;
            core.source = None;
        }

        tracing::info!("shake detection stopped");
    }

    /// Register `listener` for `event`.
    ///
    /// Only `"shake"` is recognized; other names fail with
    /// [`DetectorError::UnsupportedEvent`].
    pub async fn add_listener(
        &self,
        event: &str,
        listener: ShakeListener,
    ) -> Result<ListenerHandle, DetectorError> {
        let event: EventName = event.parse()?;
        let id = listener::lock(&self.inner.registry).insert(listener);
        tracing::debug!(%event, listener = %id, "listener added");
        Ok(ListenerHandle::new(id, &self.inner.registry))
    }

    /// Remove every listener. Does not change the lifecycle.
    pub async fn remove_all_listeners(&self) {
        let removed = listener::lock(&self.inner.registry).clear();
        tracing::debug!(removed, "all listeners removed");
    }

    /// Ask for motion permission.
    ///
    /// Resolves `true` on platforms without a permission concept. Otherwise
    /// prompts (unless already granted) and stores the answer.
    pub async fn request_permission(&self) -> bool {
        let mut adapter = self.inner.lifecycle.lock().await;
        self.request_permission_locked(&mut adapter).await
    }

    /// Trigger a shake directly, bypassing the adapter and the magnitude
    /// check. The cooldown still applies.
    ///
    /// Returns `true` if listeners were notified.
    pub async fn manual_shake(&self) -> bool {
        tracing::debug!("manual shake requested");
        self.process(Signal::Trigger, TriggerOrigin::Manual)
    }

    /// Feed a raw input from the attached platform event source.
    ///
    /// Inputs are dropped unless a source is attached and accepts them.
    /// Returns `true` if the input produced a shake.
    pub fn handle_input(&self, input: MotionInput) -> bool {
        let signal = {
            let mut core = self.core();
            let signal = core.filter.and_then(|filter| filter.interpret(input));
            if signal.is_none() {
                core.stats.ignored += 1;
            }
            signal
        };

        match signal {
            Some(signal @ Signal::Sample(_)) => self.process(signal, TriggerOrigin::Motion),
            Some(Signal::Trigger) => self.process(Signal::Trigger, TriggerOrigin::Key),
            None => false,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> DetectorState<E::Instant> {
        let core = self.core();
        DetectorState {
            is_listening: core.is_listening,
            has_permission: core.has_permission,
            last_shake: core.classifier.last_shake(),
            source: core.source,
        }
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        if self.core().is_listening { Lifecycle::Listening } else { Lifecycle::Disabled }
    }

    /// Whether the detector is listening.
    pub fn is_listening(&self) -> bool {
        self.core().is_listening
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        listener::lock(&self.inner.registry).len()
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> DetectorStats {
        self.core().stats
    }

    /// Active configuration.
    pub fn config(&self) -> DetectorConfig {
        self.inner.config
    }

    /// Environment driving this detector.
    pub fn env(&self) -> &E {
        &self.inner.env
    }

    async fn request_permission_locked(&self, adapter: &mut A) -> bool {
        if !adapter.requires_permission() {
            self.core().has_permission = true;
            return true;
        }

        let granted = self.core().has_permission;
        if granted {
            return true;
        }

        let granted = adapter.request_permission().await;
        self.core().has_permission = granted;
        if !granted {
            tracing::warn!("motion permission denied, detection inert until granted");
        }
        granted
    }

    /// Classify, commit the timestamp, then notify.
    fn process(&self, signal: Signal, origin: TriggerOrigin) -> bool {
        let now = self.inner.env.now();

        let decision = {
            let mut core = self.core();
            let decision = match signal {
                Signal::Sample(sample) => core.classifier.classify(&sample, now),
                Signal::Trigger => core.classifier.accept_trigger(now),
            };
            match decision {
                Classification::Shake => core.stats.shakes += 1,
                Classification::Cooldown => core.stats.suppressed += 1,
                Classification::BelowThreshold => {},
            }
            decision
        };

        if decision == Classification::Cooldown {
            tracing::debug!(%origin, "shake suppressed by cooldown");
        }
        if !decision.is_shake() {
            return false;
        }

        self.trigger_shake(origin);
        true
    }

    fn trigger_shake(&self, origin: TriggerOrigin) {
        if let Err(error) = self.inner.haptics.pulse(self.inner.config.haptic_intensity) {
            tracing::warn!(%error, "haptic feedback failed");
        }

        let listeners = listener::lock(&self.inner.registry).snapshot();
        let report = notify_all(&listeners);

        if report.failed > 0 {
            self.core().stats.listener_failures += report.failed as u64;
        }

        tracing::info!(%origin, delivered = report.delivered, failed = report.failed, "shake");
    }

    fn core(&self) -> MutexGuard<'_, Core<E::Instant>> {
        self.inner.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: Environment, A, H> fmt::Debug for ShakeDetector<E, A, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShakeDetector").finish_non_exhaustive()
    }
}
