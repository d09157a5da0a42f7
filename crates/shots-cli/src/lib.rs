pub mod errors;
pub mod motion;
pub mod output;
pub mod providers;
pub mod types;

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use shots_core::imu::MotionSample;
use shots_engine::WorkoutManager;

use crate::errors::Result;
use crate::motion::RawMotionParser;
use crate::output::{Metadata, MotionSummary, ReplayOutput};
use crate::providers::{OfflineRecorder, ReplayClock, ReplayHost, ReplayMotionSource};
use crate::types::{ReplayConfig, SessionData};

/// Runs recorded raw motion through a workout session, as if the watch were
/// sampling it live.
pub struct ReplayProcessor {
    config: ReplayConfig,
}

/// Files written for a replayed session.
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub export: Option<PathBuf>,
    pub summary: PathBuf,
}

impl ReplayProcessor {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Replay a raw motion file and return the session summary together
    /// with the motion text export, when motion was captured.
    pub fn process_session<P: AsRef<Path>>(
        &self,
        motion_path: P,
    ) -> Result<(ReplayOutput, Option<String>)> {
        let session = SessionData::new(motion_path.as_ref().to_path_buf());
        info!("Replaying session: {}", session.name);

        let readings = RawMotionParser::parse_file(&session.motion_file)?;

        let source = ReplayMotionSource::new();
        let factory_source = source.clone();
        let clock = ReplayClock::starting_at(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        );
        let manager = WorkoutManager::with_clock(
            self.config.workout.clone(),
            move || factory_source.clone(),
            OfflineRecorder,
            ReplayHost::new(self.config.orientation),
            clock.clone(),
        )?;

        manager.start(&session.name, self.config.session_type)?;

        let interval = Duration::from_secs_f64(self.config.workout.sample_interval());
        let mut dropped = 0usize;
        for raw in &readings {
            if !source.push(*raw) {
                dropped += 1;
            }
            clock.advance(interval);
        }
        if dropped > 0 {
            warn!("{} readings were not delivered to the workout", dropped);
        }

        let details = manager.stop()?;
        let samples = manager.motion_samples();
        let export = manager.motion_export();
        debug!("Replay captured {} of {} readings", samples.len(), readings.len());

        info!(
            "Replay complete: {} readings, {}s elapsed, {} samples",
            readings.len(),
            details.elapsed_seconds,
            samples.len()
        );

        let motion = export
            .as_ref()
            .map(|_| summarize_motion(&session.name, &samples));

        let output = ReplayOutput {
            metadata: Metadata {
                session_name: session.name.clone(),
                motion_file: session.motion_file.display().to_string(),
                reading_count: readings.len(),
                sample_frequency: self.config.workout.sample_frequency,
            },
            session: details,
            motion,
        };

        Ok((output, export))
    }

    /// Write `<session>.json` and, when present, `<session>.txt` into the
    /// configured output directory.
    pub fn write_outputs(&self, output: &ReplayOutput, export: Option<&str>) -> Result<WrittenFiles> {
        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir)?;

        let name = &output.metadata.session_name;
        let export_path = match export {
            Some(text) => {
                let path = dir.join(format!("{name}.txt"));
                std::fs::write(&path, text)?;
                info!("Motion export written to {}", path.display());
                Some(path)
            }
            None => None,
        };

        let summary_path = dir.join(format!("{name}.json"));
        let json = serde_json::to_string_pretty(output)?;
        std::fs::write(&summary_path, json)?;
        info!("Session summary written to {}", summary_path.display());

        Ok(WrittenFiles {
            export: export_path,
            summary: summary_path,
        })
    }
}

fn summarize_motion(name: &str, samples: &[MotionSample]) -> MotionSummary {
    let duration_seconds = samples.last().map(|s| s.timestamp).unwrap_or(0.0);
    let mean_vertical_acceleration = if samples.is_empty() {
        0.0
    } else {
        samples
            .iter()
            .map(|s| s.transformed_acceleration[2])
            .sum::<f64>()
            / samples.len() as f64
    };

    MotionSummary {
        sample_count: samples.len(),
        duration_seconds,
        export_file: format!("{name}.txt"),
        mean_vertical_acceleration,
    }
}
