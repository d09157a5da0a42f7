use std::f64::consts::PI;

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::errors::{Result, ShotsError};

/// Cross products shorter than this are treated as "up is on the Z axis".
const DEGENERATE_AXIS_NORM: f64 = 1e-12;

/// Returns the rotation that carries the measured "up" direction (opposite of
/// `gravity`) onto +Z.
///
/// Degenerate inputs fall back to fixed rotations: zero gravity and an up
/// vector already on +Z give the identity, an up vector on -Z gives a half
/// turn about +X.
pub fn gravity_alignment(gravity: &Vector3<f64>) -> UnitQuaternion<f64> {
    let Some(down) = gravity.try_normalize(0.0) else {
        return UnitQuaternion::identity();
    };
    let up = -down;
    let z_axis = Vector3::z();

    let cos_angle = up.dot(&z_axis).clamp(-1.0, 1.0);
    let angle = cos_angle.acos();

    match Unit::try_new(up.cross(&z_axis), DEGENERATE_AXIS_NORM) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle),
        None if cos_angle > 0.0 => UnitQuaternion::identity(),
        None => UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI),
    }
}

/// Re-expresses `acceleration` in the frame where gravity points along -Z
/// (so "up" is +Z).
pub fn align(acceleration: &Vector3<f64>, gravity: &Vector3<f64>) -> Vector3<f64> {
    gravity_alignment(gravity) * acceleration
}

/// Slice variant of [`align`] for callers holding dynamically sized input.
///
/// On a dimension mismatch the error carries both lengths and the
/// acceleration unchanged.
pub fn align_slices(acceleration: &[f64], gravity: &[f64]) -> Result<[f64; 3]> {
    if acceleration.len() != 3 || gravity.len() != 3 {
        log::error!(
            target: "shots_core::math",
            "Vectors are not 3D: acceleration={}, gravity={}",
            acceleration.len(),
            gravity.len()
        );
        return Err(ShotsError::Dimension {
            acceleration: acceleration.len(),
            gravity: gravity.len(),
            unchanged: acceleration.to_vec(),
        });
    }

    let rotated = align(
        &Vector3::from_column_slice(acceleration),
        &Vector3::from_column_slice(gravity),
    );
    Ok([rotated.x, rotated.y, rotated.z])
}
