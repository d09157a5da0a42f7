use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, trace, warn};

use super::export::render_samples;
use super::orientation::DeviceOrientation;
use super::sample::{MotionSample, RawMotion};
use crate::contracts::{MotionHandler, MotionSource};
use crate::errors::{Result, SensorError, ShotsError};
use crate::math::{align, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Configured,
    Sampling,
    Paused,
    Stopped,
}

/// State touched from the sensor delivery thread.
#[derive(Debug)]
struct SeriesState {
    series: Vec<MotionSample>,
    /// Clock value when the current interval took effect.
    clock_base: f64,
    /// Samples stamped since `clock_base`.
    ticks: u64,
    sample_interval: f64,
    inversion: f64,
    accepting: bool,
    observers: Vec<Sender<MotionSample>>,
}

impl SeriesState {
    fn clock(&self) -> f64 {
        self.clock_base + self.ticks as f64 * self.sample_interval
    }

    fn reset_clock(&mut self) {
        self.clock_base = 0.0;
        self.ticks = 0;
    }

    /// Later samples advance by `interval`; stamps already issued keep theirs.
    fn set_interval(&mut self, interval: f64) {
        self.clock_base = self.clock();
        self.ticks = 0;
        self.sample_interval = interval;
    }

    fn ingest(&mut self, raw: RawMotion) -> Option<MotionSample> {
        if !self.accepting {
            trace!(target: "shots_core::imu", "Dropping sample delivered while not sampling");
            return None;
        }

        let sign = self.inversion;
        let acceleration = mirror_xy(&raw.acceleration, sign);
        let rotation_rate = mirror_xy(&raw.rotation_rate, sign);
        let gravity = mirror_xy(&raw.gravity, sign);
        let transformed = align(&acceleration, &gravity);

        let sample = MotionSample {
            acceleration: acceleration.into(),
            rotation_rate: rotation_rate.into(),
            gravity: gravity.into(),
            transformed_acceleration: transformed.into(),
            timestamp: self.clock(),
        };

        self.series.push(sample);
        self.ticks += 1;
        self.observers.retain(|tx| tx.send(sample).is_ok());
        Some(sample)
    }
}

fn mirror_xy(v: &Vec3, sign: f64) -> Vec3 {
    Vec3::new(v.x * sign, v.y * sign, v.z)
}

fn lock(state: &Mutex<SeriesState>) -> MutexGuard<'_, SeriesState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Samples device motion for one workout, aligns every reading with gravity
/// and keeps the time-ordered series for export.
///
/// Samples delivered after [`pause`](Self::pause) or [`stop`](Self::stop)
/// are dropped, so the series never grows while the workout is not running.
pub struct MotionPipeline<S: MotionSource> {
    source: S,
    status: PipelineStatus,
    state: Arc<Mutex<SeriesState>>,
}

impl<S: MotionSource> MotionPipeline<S> {
    pub fn new(source: S, sample_frequency: f64) -> Result<Self> {
        let interval = sample_interval(sample_frequency)?;
        Ok(Self {
            source,
            status: PipelineStatus::Configured,
            state: Arc::new(Mutex::new(SeriesState {
                series: Vec::new(),
                clock_base: 0.0,
                ticks: 0,
                sample_interval: interval,
                inversion: 1.0,
                accepting: false,
                observers: Vec::new(),
            })),
        })
    }

    /// Changes the sampling rate. While sampling the source is switched at
    /// once; otherwise the rate applies from the next `begin`/`resume`.
    pub fn configure(&mut self, sample_frequency: f64) -> Result<()> {
        let interval = sample_interval(sample_frequency)?;
        lock(&self.state).set_interval(interval);
        if self.status == PipelineStatus::Sampling {
            self.apply_interval(interval)?;
        }
        Ok(())
    }

    /// Starts sampling from a zeroed clock.
    pub fn begin(&mut self, orientation: DeviceOrientation) -> Result<()> {
        if !self.source.is_available() {
            warn!(target: "shots_core::imu", "Device motion not available");
            return Err(ShotsError::SensorUnavailable);
        }

        let interval = {
            let mut state = lock(&self.state);
            if orientation.crown_on_left {
                info!(target: "shots_core::imu", "Inverting XY for crown on the left");
            }
            if orientation.watch_on_right_wrist {
                info!(target: "shots_core::imu", "Inverting XY for watch on the right wrist");
            }
            state.inversion = orientation.inversion_sign();
            state.reset_clock();
            state.sample_interval
        };

        self.apply_interval(interval)?;

        debug!(target: "shots_core::imu", "Starting motion updates every {:.4}s", interval);
        self.start_delivery();
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.status != PipelineStatus::Sampling {
            debug!(target: "shots_core::imu", "Pause ignored while {:?}", self.status);
            return;
        }
        debug!(target: "shots_core::imu", "Pausing motion updates");
        lock(&self.state).accepting = false;
        self.source.stop_updates();
        self.status = PipelineStatus::Paused;
    }

    /// Restarts delivery; time stamps continue from where they stopped.
    pub fn resume(&mut self) {
        if self.status != PipelineStatus::Paused {
            debug!(target: "shots_core::imu", "Resume ignored while {:?}", self.status);
            return;
        }
        debug!(target: "shots_core::imu", "Resuming motion updates");
        let interval = lock(&self.state).sample_interval;
        if let Err(err) = self.apply_interval(interval) {
            warn!(target: "shots_core::imu", "Keeping the previous update interval: {}", err);
        }
        self.start_delivery();
    }

    pub fn stop(&mut self) {
        if matches!(
            self.status,
            PipelineStatus::Configured | PipelineStatus::Stopped
        ) {
            return;
        }
        debug!(target: "shots_core::imu", "Stopping motion updates");
        lock(&self.state).accepting = false;
        if self.status == PipelineStatus::Sampling {
            self.source.stop_updates();
        }
        self.status = PipelineStatus::Stopped;
    }

    /// Processes one reading as if it had arrived from the source.
    pub fn on_raw_sample(&self, raw: RawMotion) -> Option<MotionSample> {
        lock(&self.state).ingest(raw)
    }

    /// Receives every accepted sample from now on.
    pub fn subscribe(&self) -> Receiver<MotionSample> {
        let (tx, rx) = unbounded();
        lock(&self.state).observers.push(tx);
        rx
    }

    pub fn export_text(&self) -> String {
        render_samples(lock(&self.state).series.iter())
    }

    pub fn samples(&self) -> Vec<MotionSample> {
        lock(&self.state).series.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time stamp the next accepted sample will carry.
    pub fn clock(&self) -> f64 {
        lock(&self.state).clock()
    }

    pub fn sample_interval(&self) -> f64 {
        lock(&self.state).sample_interval
    }

    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn apply_interval(&mut self, interval: f64) -> Result<()> {
        self.source
            .set_update_interval(Duration::from_secs_f64(interval))
            .map_err(|err| match err {
                SensorError::Unavailable => ShotsError::SensorUnavailable,
                other => ShotsError::Sensor(other),
            })
    }

    fn start_delivery(&mut self) {
        lock(&self.state).accepting = true;
        self.source.start_updates(self.handler());
        self.status = PipelineStatus::Sampling;
    }

    fn handler(&self) -> MotionHandler {
        let state = Arc::clone(&self.state);
        Box::new(move |delivery| match delivery {
            Ok(raw) => {
                lock(&state).ingest(raw);
            }
            Err(err) => {
                error!(target: "shots_core::imu", "Encountered error during device motion updates: {}", err);
            }
        })
    }
}

fn sample_interval(sample_frequency: f64) -> Result<f64> {
    if !sample_frequency.is_finite() || sample_frequency <= 0.0 {
        return Err(ShotsError::InvalidFrequency(sample_frequency));
    }
    Ok(1.0 / sample_frequency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imu::export::EXPORT_HEADER;
    use crate::testing::ManualMotionSource;
    use approx::assert_relative_eq;

    fn level_reading() -> RawMotion {
        RawMotion::new([0.1, 0.2, 0.3], [0.01, -0.02, 0.03], [0.0, -1.0, 0.0])
    }

    fn started(orientation: DeviceOrientation) -> (MotionPipeline<ManualMotionSource>, ManualMotionSource) {
        let source = ManualMotionSource::new();
        let mut pipeline = MotionPipeline::new(source.clone(), 30.0).unwrap();
        pipeline.begin(orientation).unwrap();
        (pipeline, source)
    }

    #[test]
    fn rejects_non_positive_frequency() {
        assert_eq!(
            MotionPipeline::new(ManualMotionSource::new(), 0.0).err(),
            Some(ShotsError::InvalidFrequency(0.0))
        );
        let mut pipeline = MotionPipeline::new(ManualMotionSource::new(), 50.0).unwrap();
        assert!(pipeline.configure(-3.0).is_err());
        assert!(pipeline.configure(f64::NAN).is_err());
        assert_relative_eq!(pipeline.sample_interval(), 0.02);
    }

    #[test]
    fn timestamps_advance_by_interval() {
        let (pipeline, source) = started(DeviceOrientation::default());
        for _ in 0..5 {
            assert!(source.deliver(level_reading()));
        }

        let samples = pipeline.samples();
        assert_eq!(samples.len(), 5);
        for (k, sample) in samples.iter().enumerate() {
            assert_relative_eq!(sample.timestamp, k as f64 / 30.0, epsilon = 1e-12);
        }
        assert_relative_eq!(source.update_interval().unwrap().as_secs_f64(), 1.0 / 30.0, epsilon = 1e-9);
    }

    #[test]
    fn resume_continues_clock_and_pause_drops_late_samples() {
        let (mut pipeline, source) = started(DeviceOrientation::default());
        source.deliver(level_reading());
        source.deliver(level_reading());

        pipeline.pause();
        assert!(!source.is_delivering());
        // Arrives after the pause request was issued.
        assert!(pipeline.on_raw_sample(level_reading()).is_none());
        assert_eq!(pipeline.len(), 2);

        pipeline.resume();
        source.deliver(level_reading());
        let samples = pipeline.samples();
        assert_eq!(samples.len(), 3);
        assert_relative_eq!(samples[2].timestamp, 2.0 / 30.0, epsilon = 1e-12);
    }

    #[test]
    fn mirrored_wearing_inverts_xy_only() {
        let (pipeline, source) = started(DeviceOrientation::new(true, false));
        source.deliver(level_reading());

        let sample = pipeline.samples()[0];
        assert_eq!(sample.acceleration, [-0.1, -0.2, 0.3]);
        assert_eq!(sample.rotation_rate, [-0.01, 0.02, 0.03]);
        assert_eq!(sample.gravity, [-0.0, 1.0, 0.0]);
    }

    #[test]
    fn transformed_acceleration_is_gravity_aligned() {
        let (pipeline, source) = started(DeviceOrientation::default());
        // Pure upward acceleration with the watch held on its side.
        source.deliver(RawMotion::new([0.0, 0.5, 0.0], [0.0; 3], [0.0, -1.0, 0.0]));

        let sample = pipeline.samples()[0];
        assert_relative_eq!(sample.transformed_acceleration[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(sample.transformed_acceleration[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(sample.transformed_acceleration[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn unavailable_sensor_is_reported() {
        let source = ManualMotionSource::unavailable();
        let mut pipeline = MotionPipeline::new(source.clone(), 30.0).unwrap();
        assert_eq!(
            pipeline.begin(DeviceOrientation::default()),
            Err(ShotsError::SensorUnavailable)
        );
        assert!(!source.is_delivering());
        assert_eq!(pipeline.status(), PipelineStatus::Configured);
    }

    #[test]
    fn observers_receive_each_sample() {
        let (pipeline, source) = started(DeviceOrientation::default());
        let rx = pipeline.subscribe();
        source.deliver(level_reading());
        source.deliver(level_reading());

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1], pipeline.samples()[1]);
    }

    #[test]
    fn begin_after_stop_restarts_clock() {
        let (mut pipeline, source) = started(DeviceOrientation::default());
        source.deliver(level_reading());
        source.deliver(level_reading());
        pipeline.stop();
        assert_eq!(pipeline.status(), PipelineStatus::Stopped);

        pipeline.begin(DeviceOrientation::default()).unwrap();
        source.deliver(level_reading());
        let samples = pipeline.samples();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[2].timestamp, 0.0);
    }

    #[test]
    fn export_mid_run_is_side_effect_free() {
        let (pipeline, source) = started(DeviceOrientation::default());
        source.deliver(level_reading());

        let first = pipeline.export_text();
        let second = pipeline.export_text();
        assert_eq!(first, second);
        assert!(first.starts_with(EXPORT_HEADER));
        assert_eq!(first.lines().count(), 2);
        assert!(first.lines().nth(1).unwrap().starts_with("0.00,0.10000000,"));
    }

    #[test]
    fn delivery_errors_do_not_stop_sampling() {
        let (pipeline, source) = started(DeviceOrientation::default());
        source.fail(SensorError::Delivery("dropped frame".into()));
        source.deliver(level_reading());
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.samples()[0].timestamp, 0.0);
    }

    #[test]
    fn reconfiguring_mid_run_keeps_issued_stamps() {
        let (mut pipeline, source) = started(DeviceOrientation::default());
        for _ in 0..5 {
            source.deliver(level_reading());
        }
        pipeline.configure(10.0).unwrap();
        assert_relative_eq!(source.update_interval().unwrap().as_secs_f64(), 0.1, epsilon = 1e-9);
        source.deliver(level_reading());
        source.deliver(level_reading());

        let samples = pipeline.samples();
        assert_relative_eq!(samples[4].timestamp, 4.0 / 30.0, epsilon = 1e-12);
        assert_relative_eq!(samples[5].timestamp, 5.0 / 30.0, epsilon = 1e-12);
        assert_relative_eq!(samples[6].timestamp - samples[5].timestamp, 0.1, epsilon = 1e-12);
        assert_relative_eq!(pipeline.clock(), 5.0 / 30.0 + 0.2, epsilon = 1e-12);
    }

    #[test]
    fn rate_set_while_paused_reaches_source_on_resume() {
        let (mut pipeline, source) = started(DeviceOrientation::default());
        source.deliver(level_reading());
        pipeline.pause();
        pipeline.configure(50.0).unwrap();
        assert_relative_eq!(source.update_interval().unwrap().as_secs_f64(), 1.0 / 30.0, epsilon = 1e-9);

        pipeline.resume();
        assert_relative_eq!(source.update_interval().unwrap().as_secs_f64(), 0.02, epsilon = 1e-9);
        source.deliver(level_reading());
        source.deliver(level_reading());
        let samples = pipeline.samples();
        assert_relative_eq!(samples[1].timestamp, 1.0 / 30.0, epsilon = 1e-12);
        assert_relative_eq!(samples[2].timestamp, 1.0 / 30.0 + 0.02, epsilon = 1e-12);
    }

    #[test]
    fn samples_after_stop_are_dropped() {
        let (mut pipeline, source) = started(DeviceOrientation::default());
        source.deliver(level_reading());
        pipeline.stop();

        assert!(!source.deliver(level_reading()));
        assert!(pipeline.on_raw_sample(level_reading()).is_none());
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.status(), PipelineStatus::Stopped);
    }
}
