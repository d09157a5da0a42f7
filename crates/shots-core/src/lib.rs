pub mod config;
pub mod contracts;
pub mod errors;
pub mod imu;
pub mod math;
pub mod session;
pub mod time;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{HeartRateSeeds, WorkoutConfig};
pub use errors::{RecordingError, RecordingStage, Result, SensorError, ShotsError};
