//! Virtual-time environment.
//!
//! `SimEnv` implements [`Environment`] on a clock that only moves when the
//! test says so. `sleep` advances the clock by the requested duration and
//! yields once, so cooldown windows are exercised exactly and instantly.
//!
//! Clones share one clock.

use std::{
    fmt,
    ops::{Add, Sub},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use shakeguard_core::Environment;

/// Instant on the virtual clock: time elapsed since the simulation started.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Simulation start.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Time elapsed since the simulation started.
    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, earlier: Self) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, offset: Duration) -> Self {
        Self(self.0 + offset)
    }
}

impl fmt::Debug for SimInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}ms", self.0.as_millis())
    }
}

/// Environment backed by a manually advanced clock.
#[derive(Clone, Default)]
pub struct SimEnv {
    now: Arc<Mutex<SimInstant>>,
}

impl SimEnv {
    /// Create a clock at [`SimInstant::ZERO`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = *now + by;
    }

    /// Move the clock forward by `millis` milliseconds.
    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Time elapsed since the simulation started.
    pub fn elapsed(&self) -> Duration {
        self.now().since_start()
    }
}

impl fmt::Debug for SimEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimEnv").field("now", &self.now()).finish()
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        tokio::task::yield_now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_clock() {
        let env = SimEnv::new();
        let other = env.clone();

        other.advance_ms(250);
        assert_eq!(env.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn instants_subtract_to_durations() {
        let start = SimInstant::ZERO;
        let later = start + Duration::from_millis(1100);

        assert_eq!(later - start, Duration::from_millis(1100));
        assert_eq!(start - later, Duration::ZERO);
    }

    #[tokio::test]
    async fn sleep_advances_virtual_time() {
        let env = SimEnv::new();
        env.sleep(Duration::from_secs(3)).await;
        assert_eq!(env.elapsed(), Duration::from_secs(3));
    }
}
