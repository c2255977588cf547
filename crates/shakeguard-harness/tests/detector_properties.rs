//! Property-based tests for the shake detector.
//!
//! Random operation sequences run against real detectors on simulated
//! hardware. After every operation the standard invariants are checked, so a
//! violation is reported at the first step that breaks it.
//!
//! # Rigs
//!
//! - native: ungated accelerometer with working haptics
//! - gated: accelerometer behind a permission prompt the user denies
//! - web: keyboard simulation, no haptics

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use proptest::prelude::*;
use shakeguard_core::{
    HapticIntensity, Haptics, ListenerError, ListenerResult, PlatformError, SourceStatus,
    listener_fn,
};
use shakeguard_harness::{
    InvariantRegistry, Operation, PromptAnswer, Rig, SimHaptics, SimKeys, SimSensor,
};

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
}

/// Generate random detector operations.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        2 => Just(Operation::Enable),
        1 => Just(Operation::Stop),
        2 => Just(Operation::AddListener),
        1 => Just(Operation::RemoveAll),
        1 => Just(Operation::RemoveOldest),
        4 => Just(Operation::Trigger),
        2 => Just(Operation::Idle),
        1 => Just(Operation::ManualShake),
        3 => (0u16..2500).prop_map(|millis| Operation::Advance { millis }),
    ]
}

fn operations() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation_strategy(), 0..60)
}

proptest! {
    /// Invariants hold after every operation on the native rig.
    #[test]
    fn prop_native_invariants_hold(ops in operations(), seed in any::<u64>()) {
        block_on(async {
            let mut rig = Rig::native(SimSensor::new(), SimHaptics::new(), seed);
            let invariants = InvariantRegistry::standard();

            for op in ops {
                rig.apply(op).await;
                let result = invariants.check_all(&rig.snapshot());
                prop_assert!(result.is_ok(), "after {:?}: {:?}", op, result);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Invariants hold when the user denies motion access.
    #[test]
    fn prop_denied_permission_invariants_hold(ops in operations(), seed in any::<u64>()) {
        block_on(async {
            let mut rig = Rig::native(SimSensor::gated(PromptAnswer::Deny), SimHaptics::new(), seed);
            let invariants = InvariantRegistry::standard();

            for op in ops {
                rig.apply(op).await;
                let result = invariants.check_all(&rig.snapshot());
                prop_assert!(result.is_ok(), "after {:?}: {:?}", op, result);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Invariants hold on the web fallback.
    #[test]
    fn prop_web_invariants_hold(ops in operations()) {
        block_on(async {
            let mut rig = Rig::web(SimKeys::new());
            let invariants = InvariantRegistry::standard();

            for op in ops {
                rig.apply(op).await;
                let result = invariants.check_all(&rig.snapshot());
                prop_assert!(result.is_ok(), "after {:?}: {:?}", op, result);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Teardown from any state leaves nothing attached and nobody listening.
    #[test]
    fn prop_teardown_is_total(ops in operations(), seed in any::<u64>()) {
        block_on(async {
            let mut rig = Rig::native(SimSensor::new(), SimHaptics::new(), seed);
            rig.run(&ops).await;
            rig.teardown().await;

            let snapshot = rig.snapshot();
            prop_assert!(!snapshot.is_listening);
            prop_assert!(!snapshot.source_attached);
            prop_assert_eq!(snapshot.listeners, 0);

            let before = rig.notifications().len();
            rig.apply(Operation::Advance { millis: 2000 }).await;
            rig.apply(Operation::Trigger).await;
            prop_assert_eq!(rig.notifications().len(), before);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Enabling twice in a row behaves like enabling once.
    #[test]
    fn prop_enable_is_idempotent(prefix in operations(), seed in any::<u64>()) {
        block_on(async {
            let mut once = Rig::native(SimSensor::new(), SimHaptics::new(), seed);
            let mut twice = Rig::native(SimSensor::new(), SimHaptics::new(), seed);
            once.run(&prefix).await;
            twice.run(&prefix).await;

            once.apply(Operation::Enable).await;
            twice.apply(Operation::Enable).await;
            twice.apply(Operation::Enable).await;

            let (a, b) = (once.snapshot(), twice.snapshot());
            prop_assert_eq!(a.is_listening, b.is_listening);
            prop_assert_eq!(a.source_attached, b.source_attached);
            prop_assert_eq!(a.attachments, b.attachments);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// A burst inside one cooldown window yields exactly one shake.
    #[test]
    fn prop_burst_collapses_to_one_shake(len in 1usize..40, seed in any::<u64>()) {
        block_on(async {
            let mut rig = Rig::native(SimSensor::new(), SimHaptics::new(), seed);
            rig.run(&[Operation::Enable, Operation::AddListener]).await;

            for _ in 0..len {
                rig.apply(Operation::Trigger).await;
                rig.apply(Operation::Advance { millis: 20 }).await;
            }

            // Oracle: 40 samples 20ms apart span at most 800ms < cooldown
            let stats = rig.detector().stats();
            prop_assert_eq!(rig.notifications().len(), 1);
            prop_assert_eq!(stats.shakes, 1);
            prop_assert_eq!(stats.suppressed, len as u64 - 1);
            Ok::<(), TestCaseError>(())
        })?;
    }
}

#[tokio::test]
async fn manual_triggers_respect_cooldown() {
    let mut rig = Rig::web(SimKeys::new());
    rig.run(&[
        Operation::Enable,
        Operation::AddListener,
        Operation::ManualShake,
        Operation::Advance { millis: 10 },
        Operation::ManualShake,
        Operation::Advance { millis: 1090 },
        Operation::ManualShake,
    ])
    .await;

    // ORACLE: t=0 fires, t=10ms is suppressed, t=1100ms fires
    let steps: Vec<usize> = rig.notifications().iter().map(|n| n.step).collect();
    assert_eq!(steps, vec![2, 6]);
    assert_eq!(rig.detector().stats().suppressed, 1);
}

#[tokio::test]
async fn cooldown_boundary_is_exclusive() {
    let mut rig = Rig::web(SimKeys::new());
    rig.run(&[
        Operation::Enable,
        Operation::AddListener,
        Operation::Trigger,
        Operation::Advance { millis: 1000 },
        Operation::Trigger,
        Operation::Advance { millis: 1 },
        Operation::Trigger,
    ])
    .await;

    let steps: Vec<usize> = rig.notifications().iter().map(|n| n.step).collect();
    assert_eq!(steps, vec![2, 6]);
}

#[tokio::test]
async fn denied_permission_keeps_manual_fallback() {
    let sensor = SimSensor::gated(PromptAnswer::Deny);
    let mut rig = Rig::native(sensor.clone(), SimHaptics::new(), 7);
    rig.run(&[Operation::Enable, Operation::AddListener, Operation::Trigger]).await;

    let state = rig.detector().state();
    assert!(state.is_listening);
    assert!(!state.has_permission);
    assert_eq!(state.source, Some(SourceStatus::PermissionDenied));
    assert!(!sensor.state().subscribed);
    assert!(rig.notifications().is_empty());

    rig.apply(Operation::ManualShake).await;
    assert_eq!(rig.notifications().len(), 1);
}

#[tokio::test]
async fn failed_prompt_counts_as_denial() {
    let sensor = SimSensor::gated(PromptAnswer::Fail);
    let mut rig = Rig::native(sensor.clone(), SimHaptics::new(), 7);
    rig.apply(Operation::Enable).await;

    assert!(!rig.detector().state().has_permission);
    assert_eq!(sensor.state().prompts, 1);
    assert!(!sensor.state().subscribed);
}

#[tokio::test]
async fn granted_permission_is_not_asked_again() {
    let sensor = SimSensor::gated(PromptAnswer::Grant);
    let mut rig = Rig::native(sensor.clone(), SimHaptics::new(), 7);
    rig.run(&[Operation::Enable, Operation::Stop, Operation::Enable]).await;

    assert_eq!(sensor.state().prompts, 1);
    assert_eq!(sensor.state().subscriptions, 2);
}

#[tokio::test]
async fn denied_prompt_is_asked_again_on_next_enable() {
    let sensor = SimSensor::gated(PromptAnswer::Deny);
    let mut rig = Rig::native(sensor.clone(), SimHaptics::new(), 7);
    rig.run(&[Operation::Enable, Operation::Stop]).await;

    sensor.set_answer(PromptAnswer::Grant);
    rig.run(&[Operation::Enable, Operation::AddListener, Operation::Trigger]).await;

    assert!(rig.detector().state().has_permission);
    assert!(sensor.state().subscribed);
    assert_eq!(rig.notifications().len(), 1);
}

#[tokio::test]
async fn missing_sensor_fails_softly() {
    let mut rig = Rig::native(SimSensor::missing(), SimHaptics::new(), 7);
    rig.run(&[Operation::Enable, Operation::AddListener, Operation::Trigger]).await;

    let state = rig.detector().state();
    assert!(state.is_listening);
    assert_eq!(state.source, Some(SourceStatus::Unavailable));
    assert!(rig.notifications().is_empty());
}

#[tokio::test]
async fn every_shake_pulses_haptics() {
    let haptics = SimHaptics::new();
    let mut rig = Rig::native(SimSensor::new(), haptics.clone(), 11);
    rig.run(&[
        Operation::Enable,
        Operation::Trigger,
        Operation::Advance { millis: 1500 },
        Operation::Trigger,
        Operation::Trigger,
    ])
    .await;

    // ORACLE: pulses follow accepted shakes, even with no listeners
    assert_eq!(haptics.pulses().len(), 2);
}

/// Haptics writing into a log shared with a listener.
#[derive(Clone, Default)]
struct LoggedHaptics(Arc<Mutex<Vec<String>>>);

impl LoggedHaptics {
    fn push(&self, entry: String) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Haptics for LoggedHaptics {
    fn pulse(&self, intensity: HapticIntensity) -> Result<(), PlatformError> {
        self.push(format!("pulse {intensity:?}"));
        Ok(())
    }
}

#[tokio::test]
async fn haptic_pulse_precedes_notification() {
    let log = LoggedHaptics::default();
    let mut rig = Rig::native(SimSensor::new(), log.clone(), 11);
    rig.apply(Operation::Enable).await;

    let listener_log = log.clone();
    rig.detector()
        .add_listener(
            "shake",
            Arc::new(move || -> ListenerResult {
                listener_log.push("notify".to_string());
                Ok(())
            }),
        )
        .await
        .unwrap();
    rig.run(&[Operation::Trigger, Operation::Advance { millis: 1500 }, Operation::ManualShake]).await;

    // ORACLE: each shake pulses once, strictly before its listeners run
    assert_eq!(log.entries(), vec!["pulse Heavy", "notify", "pulse Heavy", "notify"]);
}

#[tokio::test]
async fn broken_haptics_do_not_block_listeners() {
    let mut rig = Rig::native(SimSensor::new(), SimHaptics::broken(), 11);
    rig.run(&[Operation::Enable, Operation::AddListener, Operation::Trigger]).await;

    assert_eq!(rig.notifications().len(), 1);
}

#[tokio::test]
async fn failing_listeners_are_isolated() {
    let mut rig = Rig::web(SimKeys::new());
    rig.apply(Operation::Enable).await;

    let detector = rig.detector().clone();
    detector
        .add_listener("shake", Arc::new(|| -> ListenerResult { Err(ListenerError::new("boom")) }))
        .await
        .unwrap();
    detector
        .add_listener("shake", Arc::new(|| -> ListenerResult { panic!("listener panicked") }))
        .await
        .unwrap();
    rig.run(&[Operation::AddListener, Operation::Trigger]).await;

    assert_eq!(rig.notifications().len(), 1);
    assert_eq!(rig.detector().stats().listener_failures, 2);
}

#[tokio::test]
async fn removing_one_listener_keeps_the_others() {
    let mut rig = Rig::web(SimKeys::new());
    rig.run(&[
        Operation::Enable,
        Operation::AddListener,
        Operation::AddListener,
        Operation::RemoveOldest,
        Operation::Trigger,
    ])
    .await;

    let listeners: Vec<usize> = rig.notifications().iter().map(|n| n.listener).collect();
    assert_eq!(listeners, vec![1]);
}

#[tokio::test]
async fn unknown_event_name_is_rejected() {
    let rig = Rig::web(SimKeys::new());
    let result = rig.detector().add_listener("tilt", listener_fn(|| {})).await;

    assert!(result.is_err());
    assert_eq!(rig.detector().listener_count(), 0);
}

#[tokio::test]
async fn stop_keeps_listeners_registered() {
    let mut rig = Rig::web(SimKeys::new());
    rig.run(&[Operation::Enable, Operation::AddListener, Operation::Stop]).await;
    assert_eq!(rig.detector().listener_count(), 1);

    rig.run(&[Operation::Enable, Operation::Trigger]).await;
    assert_eq!(rig.notifications().len(), 1);
    assert_eq!(rig.env().elapsed(), Duration::ZERO);
}
