//! Fuzz target for the shake classifier
//!
//! Ensure arbitrary sample streams respect threshold and cooldown
//!
//! # Strategy
//!
//! - Raw f64 components, including NaN, infinities, and subnormals
//! - Monotonic timestamps built from arbitrary gaps
//! - Discrete triggers interleaved with samples
//!
//! # Invariants
//!
//! - A shake sample always has a finite magnitude above the threshold
//! - Two accepted shakes are always more than the cooldown apart
//! - Rejected inputs never move the last-shake timestamp

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shakeguard_core::{Classification, ClassifierConfig, MotionSample, ShakeClassifier};

#[derive(Debug, Clone, Arbitrary)]
enum Event {
    Sample { x: f64, y: f64, z: f64, gap_ms: u16 },
    Trigger { gap_ms: u16 },
}

fuzz_target!(|input: (bool, Vec<Event>)| {
    let (native, events) = input;
    let config = if native { ClassifierConfig::native() } else { ClassifierConfig::motion_events() };
    let mut classifier = ShakeClassifier::new(config);
    let mut now = Duration::ZERO;
    let mut last_accepted: Option<Duration> = None;

    for event in events {
        let (decision, magnitude) = match event {
            Event::Sample { x, y, z, gap_ms } => {
                now += Duration::from_millis(u64::from(gap_ms));
                let sample = MotionSample::new(x, y, z);
                (classifier.classify(&sample, now), Some(sample.magnitude()))
            },
            Event::Trigger { gap_ms } => {
                now += Duration::from_millis(u64::from(gap_ms));
                (classifier.accept_trigger(now), None)
            },
        };

        match decision {
            Classification::Shake => {
                if let Some(magnitude) = magnitude {
                    assert!(magnitude.is_finite() && magnitude > config.threshold);
                }
                if let Some(previous) = last_accepted {
                    assert!(now - previous > config.cooldown, "shakes {previous:?} and {now:?}");
                }
                last_accepted = Some(now);
            },
            Classification::Cooldown | Classification::BelowThreshold => {},
        }
        assert_eq!(classifier.last_shake(), last_accepted);
    }
});
