use serde::{Deserialize, Serialize};

use crate::errors::{Result, ShotsError};

/// Initial heart-rate extremes of a new session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartRateSeeds {
    /// Extremes start empty and take the first reading.
    #[default]
    Sentinel,
    /// Max starts at 40 bpm and min at 90 bpm, as older exports expect.
    Legacy,
}

impl HeartRateSeeds {
    pub const LEGACY_MAX_BPM: u32 = 40;
    pub const LEGACY_MIN_BPM: u32 = 90;

    /// `(max, min)` seeds.
    pub fn extremes(&self) -> (Option<u32>, Option<u32>) {
        match self {
            HeartRateSeeds::Sentinel => (None, None),
            HeartRateSeeds::Legacy => (Some(Self::LEGACY_MAX_BPM), Some(Self::LEGACY_MIN_BPM)),
        }
    }
}

/// Settings of the workout manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    /// Device-motion sampling rate in Hz.
    #[serde(default = "default_sample_frequency")]
    pub sample_frequency: f64,
    /// When false the recorder is never contacted (development runs).
    #[serde(default = "default_save_workout")]
    pub save_workout: bool,
    #[serde(default)]
    pub heart_rate_seeds: HeartRateSeeds,
}

fn default_sample_frequency() -> f64 {
    30.0
}

fn default_save_workout() -> bool {
    true
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            sample_frequency: default_sample_frequency(),
            save_workout: default_save_workout(),
            heart_rate_seeds: HeartRateSeeds::default(),
        }
    }
}

impl WorkoutConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.sample_frequency.is_finite() || self.sample_frequency <= 0.0 {
            return Err(ShotsError::InvalidFrequency(self.sample_frequency));
        }
        Ok(())
    }

    pub fn sample_interval(&self) -> f64 {
        1.0 / self.sample_frequency
    }
}
