//! Environment abstraction for deterministic testing.
//!
//! Decouples detection logic from the system clock. The classifier and the
//! detector service only ever read time through [`Environment::now`], so the
//! cooldown window can be exercised on a virtual clock in simulation and on
//! `std::time::Instant` in production.

use std::time::Duration;

/// Abstract environment providing time and async sleeping.
///
/// # Invariants
///
/// Implementations MUST guarantee that `now()` never goes backwards.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`, while simulation
    /// environments use a virtual instant advanced by the test.
    type Instant: Copy + Ord + Send + Sync + std::fmt::Debug + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    ///
    /// Subsequent calls must return times >= previous calls.
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only used by driver code (sample pacing, demo loops), never by the
    /// classifier.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
