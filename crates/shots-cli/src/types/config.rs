use serde::{Deserialize, Serialize};
use shots_core::imu::DeviceOrientation;
use shots_core::session::SessionType;
use shots_core::WorkoutConfig;
use std::path::{Path, PathBuf};

use crate::errors::{ReplayError, Result};

/// Configuration for replaying a recorded session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Workout manager settings (sampling rate, seeds)
    #[serde(default)]
    pub workout: WorkoutConfig,
    /// Session type to replay as; manual sessions capture no motion
    #[serde(default = "default_session_type")]
    pub session_type: SessionType,
    /// How the watch was worn during the recording
    #[serde(default)]
    pub orientation: DeviceOrientation,
    /// Output directory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_session_type() -> SessionType {
    SessionType::Free
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./shots-output")
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            workout: WorkoutConfig::default(),
            session_type: default_session_type(),
            orientation: DeviceOrientation::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl ReplayConfig {
    /// Load a configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ReplayError::InvalidConfig(format!(
                "Failed to read file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: ReplayConfig = serde_yaml::from_str(&contents)?;
        config.workout.validate()?;

        if config.session_type == SessionType::Manual {
            log::warn!("Manual sessions capture no motion; the export will be empty");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "workout:\n  sample_frequency: 50.0\n  heart_rate_seeds: legacy\nsession_type: goal\n";
        let config: ReplayConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.workout.sample_frequency, 50.0);
        assert!(config.workout.save_workout);
        assert_eq!(config.workout.heart_rate_seeds, shots_core::HeartRateSeeds::Legacy);
        assert_eq!(config.session_type, SessionType::Goal);
        assert_eq!(config.orientation, DeviceOrientation::default());
        assert_eq!(config.output_dir, PathBuf::from("./shots-output"));
    }
}
