use std::time::{Duration, SystemTime};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::kind::SessionType;
use super::telemetry::{QuantityStatistics, TelemetryKind};
use crate::config::HeartRateSeeds;

/// Per-end heart-rate extremes start at this placeholder.
const END_EXTREME_PLACEHOLDER: u32 = 1;

/// Running statistics of one workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub session_id: String,
    pub session_type: SessionType,
    pub start_date: SystemTime,
    pub end_date: Option<SystemTime>,
    /// Active (running) time rounded to whole seconds.
    pub elapsed_seconds: u64,
    /// Exact active time behind `elapsed_seconds`.
    pub active_duration: Duration,
    pub arrow_counter: u32,
    /// Index of the current end (group of shots), starting at 1.
    pub end_counter: u32,
    pub current_heart_rate: u32,
    pub average_heart_rate: u32,
    pub max_heart_rate: Option<u32>,
    pub min_heart_rate: Option<u32>,
    pub max_hr_at_end: u32,
    pub min_hr_at_end: u32,
    /// Kilocalories.
    pub cumulative_calories_burned: u32,
    /// Meters.
    pub cumulative_distance: u32,
}

impl SessionDetails {
    pub fn new(
        session_id: impl Into<String>,
        session_type: SessionType,
        start_date: SystemTime,
        seeds: HeartRateSeeds,
    ) -> Self {
        let (max_heart_rate, min_heart_rate) = seeds.extremes();
        Self {
            session_id: session_id.into(),
            session_type,
            start_date,
            end_date: None,
            elapsed_seconds: 0,
            active_duration: Duration::ZERO,
            arrow_counter: 0,
            end_counter: 1,
            current_heart_rate: 0,
            average_heart_rate: 0,
            max_heart_rate,
            min_heart_rate,
            max_hr_at_end: END_EXTREME_PLACEHOLDER,
            min_hr_at_end: END_EXTREME_PLACEHOLDER,
            cumulative_calories_burned: 0,
            cumulative_distance: 0,
        }
    }

    /// Folds one running interval into the active time.
    pub fn add_active_time(&mut self, delta: Duration) {
        self.active_duration = self.active_duration.saturating_add(delta);
        self.elapsed_seconds = self.active_duration.as_secs_f64().round() as u64;
    }

    pub fn add_arrow(&mut self) {
        self.arrow_counter = self.arrow_counter.saturating_add(1);
    }

    /// Never drops below zero.
    pub fn remove_arrow(&mut self) {
        self.arrow_counter = self.arrow_counter.saturating_sub(1);
    }

    pub fn advance_end(&mut self) {
        self.end_counter = self.end_counter.saturating_add(1);
    }

    /// Applies recorder statistics. Returns whether any field changed.
    pub fn apply_statistics(&mut self, kind: TelemetryKind, stats: &QuantityStatistics) -> bool {
        match kind {
            TelemetryKind::Distance => {
                let Some(sum) = stats.sum else {
                    warn!(target: "shots_core::session", "Distance update without a sum");
                    return false;
                };
                raise(&mut self.cumulative_distance, to_whole(sum))
            }
            TelemetryKind::ActiveEnergy => {
                let Some(sum) = stats.sum else {
                    warn!(target: "shots_core::session", "Energy update without a sum");
                    return false;
                };
                raise(&mut self.cumulative_calories_burned, to_whole(sum))
            }
            TelemetryKind::HeartRate => self.apply_heart_rate(stats),
        }
    }

    fn apply_heart_rate(&mut self, stats: &QuantityStatistics) -> bool {
        let before = (
            self.current_heart_rate,
            self.average_heart_rate,
            self.max_heart_rate,
            self.min_heart_rate,
        );

        if let Some(latest) = stats.latest {
            self.current_heart_rate = to_whole(latest);
        }
        if let Some(average) = stats.average {
            self.average_heart_rate = to_whole(average);
        }
        if let Some(maximum) = stats.maximum {
            let maximum = to_whole(maximum);
            self.max_heart_rate = Some(self.max_heart_rate.map_or(maximum, |m| m.max(maximum)));
        }
        if let Some(minimum) = stats.minimum {
            let minimum = to_whole(minimum);
            self.min_heart_rate = Some(self.min_heart_rate.map_or(minimum, |m| m.min(minimum)));
        }

        let changed = before
            != (
                self.current_heart_rate,
                self.average_heart_rate,
                self.max_heart_rate,
                self.min_heart_rate,
            );
        if changed {
            debug!(
                target: "shots_core::session",
                "Heart rate now {} bpm (avg {}, max {:?}, min {:?})",
                self.current_heart_rate,
                self.average_heart_rate,
                self.max_heart_rate,
                self.min_heart_rate
            );
        }
        changed
    }
}

/// Truncates towards zero; negative and NaN readings become 0.
fn to_whole(value: f64) -> u32 {
    value as u32
}

fn raise(field: &mut u32, value: u32) -> bool {
    if value > *field {
        *field = value;
        true
    } else {
        false
    }
}
