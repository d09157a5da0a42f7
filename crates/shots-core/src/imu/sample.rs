use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// One device-motion reading as delivered by the motion source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMotion {
    /// User acceleration in g (gravity removed).
    pub acceleration: Vec3,
    /// Rotation rate in rad/s.
    pub rotation_rate: Vec3,
    /// Gravity direction in g.
    pub gravity: Vec3,
}

impl RawMotion {
    pub fn new(acceleration: [f64; 3], rotation_rate: [f64; 3], gravity: [f64; 3]) -> Self {
        Self {
            acceleration: Vec3::from(acceleration),
            rotation_rate: Vec3::from(rotation_rate),
            gravity: Vec3::from(gravity),
        }
    }
}

/// A reading after handedness correction and gravity alignment.
///
/// Samples are immutable once appended to a pipeline's series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub acceleration: [f64; 3],
    pub rotation_rate: [f64; 3],
    pub gravity: [f64; 3],
    pub transformed_acceleration: [f64; 3],
    /// Seconds since sampling started, advanced by one sample interval per reading.
    pub timestamp: f64,
}
