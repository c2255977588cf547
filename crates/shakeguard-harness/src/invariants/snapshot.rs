//! Observable detector state for invariant checking.

use std::time::Duration;

use shakeguard_core::{DetectorStats, Environment, Haptics, MotionAdapter, ShakeDetector};

use crate::{SimInstant, SimKeys, SimSensor};

/// Everything an invariant may look at, captured in one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorSnapshot {
    /// Detector claims to be listening
    pub is_listening: bool,
    /// Detector's stored permission answer
    pub has_permission: bool,
    /// Platform gates the source behind a prompt
    pub requires_permission: bool,
    /// A platform event source is attached right now
    pub source_attached: bool,
    /// Times the platform source was attached so far
    pub attachments: usize,
    /// Times `enable_listening` took effect so far
    pub enables: usize,
    /// Registered listeners
    pub listeners: usize,
    /// Times of every accepted shake, since simulation start
    pub shake_times: Vec<Duration>,
    /// Cooldown window
    pub cooldown: Duration,
    /// Detector counters
    pub stats: DetectorStats,
}

/// Builds snapshots for a detector wired to simulated platform primitives.
pub trait Observe {
    /// Platform source attached now, and attachments so far.
    fn source(&self) -> (bool, usize);

    /// Whether the platform gates the source.
    fn gated(&self) -> bool;
}

impl Observe for SimSensor {
    fn source(&self) -> (bool, usize) {
        let state = self.state();
        (state.subscribed, state.subscriptions)
    }

    fn gated(&self) -> bool {
        self.state().gated
    }
}

impl Observe for SimKeys {
    fn source(&self) -> (bool, usize) {
        let state = self.state();
        (state.attached, state.attachments)
    }

    fn gated(&self) -> bool {
        false
    }
}

impl DetectorSnapshot {
    /// Capture a detector's state plus its platform's.
    ///
    /// `enables` and `shake_times` are tracked by the caller, which sees every
    /// operation.
    pub fn capture<E, A, H>(
        detector: &ShakeDetector<E, A, H>,
        platform: &impl Observe,
        enables: usize,
        shake_times: &[SimInstant],
    ) -> Self
    where
        E: Environment<Instant = SimInstant>,
        A: MotionAdapter,
        H: Haptics,
    {
        let state = detector.state();
        let (source_attached, attachments) = platform.source();
        Self {
            is_listening: state.is_listening,
            has_permission: state.has_permission,
            requires_permission: platform.gated(),
            source_attached,
            attachments,
            enables,
            listeners: detector.listener_count(),
            shake_times: shake_times.iter().map(|t| t.since_start()).collect(),
            cooldown: detector.config().cooldown,
            stats: detector.stats(),
        }
    }
}
