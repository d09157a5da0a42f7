use serde::{Deserialize, Serialize};

/// How the watch is worn, as reported by the host device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOrientation {
    pub crown_on_left: bool,
    pub watch_on_right_wrist: bool,
}

impl DeviceOrientation {
    pub fn new(crown_on_left: bool, watch_on_right_wrist: bool) -> Self {
        Self {
            crown_on_left,
            watch_on_right_wrist,
        }
    }

    /// Sign applied to the X/Y axes so every wearing style reads like the
    /// default (crown right, left wrist). Either flag alone mirrors the
    /// device; both together cancel out.
    pub fn inversion_sign(&self) -> f64 {
        if self.crown_on_left != self.watch_on_right_wrist {
            -1.0
        } else {
            1.0
        }
    }
}
