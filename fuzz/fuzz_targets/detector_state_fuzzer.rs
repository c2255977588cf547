//! Fuzz target for the shake detector lifecycle
//!
//! Ensure detector invariants hold under arbitrary operation sequences
//!
//! # Strategy
//!
//! - Platform: native (optionally gated, denying, or without hardware) or web
//! - Operations: enable/stop, listener add/remove, physical and manual shakes,
//!   virtual time jumps
//! - Teardown: always finish with the supported abort path
//!
//! # Invariants
//!
//! - Standard registry (silent when stopped, permission gates source,
//!   cooldown spacing, single attachment) after every operation
//! - After teardown: nothing attached, nothing listening, no listeners

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shakeguard_core::{Haptics, MotionAdapter};
use shakeguard_harness::{
    InvariantRegistry, Observe, Operation, PromptAnswer, Rig, SimHaptics, SimKeys, SimSensor,
};

#[derive(Debug, Clone, Arbitrary)]
enum Device {
    Native { seed: u64 },
    Gated { seed: u64, grant: bool },
    Missing { seed: u64 },
    Web,
}

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    device: Device,
    ops: Vec<Operation>,
}

async fn exercise<A, H, P>(mut rig: Rig<A, H, P>, ops: &[Operation])
where
    A: MotionAdapter,
    H: Haptics,
    P: Observe,
{
    let invariants = InvariantRegistry::standard();

    for &op in ops {
        rig.apply(op).await;
        if let Err(violations) = invariants.check_all(&rig.snapshot()) {
            panic!("invariant violated after {op:?}: {violations:?}");
        }
    }

    rig.teardown().await;
    let snapshot = rig.snapshot();
    assert!(!snapshot.is_listening, "listening after teardown");
    assert!(!snapshot.source_attached, "source attached after teardown");
    assert_eq!(snapshot.listeners, 0, "listeners left after teardown");
}

fuzz_target!(|input: Input| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("current-thread runtime");

    runtime.block_on(async {
        match input.device {
            Device::Native { seed } => {
                exercise(Rig::native(SimSensor::new(), SimHaptics::new(), seed), &input.ops).await;
            },
            Device::Gated { seed, grant } => {
                let answer = if grant { PromptAnswer::Grant } else { PromptAnswer::Deny };
                let rig = Rig::native(SimSensor::gated(answer), SimHaptics::new(), seed);
                exercise(rig, &input.ops).await;
            },
            Device::Missing { seed } => {
                exercise(Rig::native(SimSensor::missing(), SimHaptics::broken(), seed), &input.ops)
                    .await;
            },
            Device::Web => exercise(Rig::web(SimKeys::new()), &input.ops).await,
        }
    });
});
