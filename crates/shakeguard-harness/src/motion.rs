//! Seeded motion sample generation.
//!
//! Produces reproducible accelerometer traces: a device at rest (gravity plus
//! jitter) and violent bursts well above a given threshold. Same seed, same
//! trace.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shakeguard_core::MotionSample;

/// Deterministic generator of motion samples.
#[derive(Debug, Clone)]
pub struct MotionGen {
    rng: ChaCha8Rng,
    /// Resting gravity magnitude in the sensor's units.
    gravity: f64,
}

impl MotionGen {
    /// Generator for sensors reporting in g.
    pub fn g_units(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), gravity: 1.0 }
    }

    /// Generator for sensors reporting in m/s².
    pub fn metric(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), gravity: 9.81 }
    }

    /// Device lying still: gravity on z plus at most 5% jitter per axis.
    pub fn resting(&mut self) -> MotionSample {
        let jitter = self.gravity * 0.05;
        MotionSample::new(
            self.rng.gen_range(-jitter..=jitter),
            self.rng.gen_range(-jitter..=jitter),
            self.gravity + self.rng.gen_range(-jitter..=jitter),
        )
    }

    /// Violent motion whose magnitude is between 1.5x and 3x `threshold`.
    pub fn shake(&mut self, threshold: f64) -> MotionSample {
        let magnitude = threshold * self.rng.gen_range(1.5..3.0);
        let (x, y, z): (f64, f64, f64) =
            (self.rng.gen_range(-1.0..1.0), self.rng.gen_range(-1.0..1.0), self.rng.gen_range(0.1..1.0));
        let norm = (x * x + y * y + z * z).sqrt();
        MotionSample::new(x / norm * magnitude, y / norm * magnitude, z / norm * magnitude)
    }

    /// `len` violent samples.
    pub fn burst(&mut self, threshold: f64, len: usize) -> Vec<MotionSample> {
        (0..len).map(|_| self.shake(threshold)).collect()
    }
}
