//! Raw motion inputs.

/// One reading of acceleration including gravity along three axes.
///
/// Units depend on the source: native accelerometers report in g, browser
/// `devicemotion` events in m/s². Thresholds are calibrated per adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// X axis acceleration
    pub x: f64,
    /// Y axis acceleration
    pub y: f64,
    /// Z axis acceleration
    pub z: f64,
}

impl MotionSample {
    /// Create a sample from its three components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the acceleration vector.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Raw input delivered by an attached platform event source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionInput {
    /// Accelerometer reading.
    Sample(MotionSample),
    /// Key pressed while the keyboard simulation is attached.
    Key(char),
}
