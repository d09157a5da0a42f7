pub mod align;

pub use align::{align, align_slices, gravity_alignment};

/// Fixed-size 3D vector used for every sensor triple.
pub type Vec3 = nalgebra::Vector3<f64>;
