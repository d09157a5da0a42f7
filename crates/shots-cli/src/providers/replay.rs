use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use shots_core::contracts::{
    HapticCue, HostDevice, MotionHandler, MotionSource, RecorderCompletion, WorkoutRecorder,
};
use shots_core::imu::{DeviceOrientation, RawMotion};
use shots_core::time::Clock;
use shots_core::SensorError;
use tracing::{debug, trace};

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Motion source fed from a recording instead of hardware.
///
/// Clones share the same delivery slot, so the replay loop can push readings
/// into the source the workout manager started.
#[derive(Clone, Default)]
pub struct ReplayMotionSource {
    handler: Arc<Mutex<Option<MotionHandler>>>,
}

impl ReplayMotionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the workout is not sampling (paused or stopped).
    pub fn push(&self, raw: RawMotion) -> bool {
        match guard(&self.handler).as_mut() {
            Some(handler) => {
                handler(Ok(raw));
                true
            }
            None => false,
        }
    }
}

impl MotionSource for ReplayMotionSource {
    fn is_available(&self) -> bool {
        true
    }

    fn set_update_interval(&mut self, interval: Duration) -> Result<(), SensorError> {
        debug!("Replay interval set to {:.4}s", interval.as_secs_f64());
        Ok(())
    }

    fn start_updates(&mut self, handler: MotionHandler) {
        *guard(&self.handler) = Some(handler);
    }

    fn stop_updates(&mut self) {
        *guard(&self.handler) = None;
    }
}

/// Clock advanced by the replay loop, one sample interval per reading.
#[derive(Debug, Clone, Default)]
pub struct ReplayClock {
    now: Arc<Mutex<Duration>>,
}

impl ReplayClock {
    pub fn starting_at(now: Duration) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *guard(&self.now) += by;
    }
}

impl Clock for ReplayClock {
    fn now(&mut self) -> Duration {
        *guard(&self.now)
    }
}

/// Recorder for offline runs: accepts every request and stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRecorder;

impl WorkoutRecorder for OfflineRecorder {
    fn begin_collection(&self, start: SystemTime, completion: RecorderCompletion) {
        trace!(?start, "offline recorder: begin");
        completion(Ok(()));
    }

    fn pause(&self) {
        trace!("offline recorder: pause");
    }

    fn resume(&self) {
        trace!("offline recorder: resume");
    }

    fn end_collection(&self, end: SystemTime, completion: RecorderCompletion) {
        trace!(?end, "offline recorder: end");
        completion(Ok(()));
    }

    fn finalize(&self, completion: RecorderCompletion) {
        trace!("offline recorder: finalize");
        completion(Ok(()));
    }
}

/// Host device standing in for the watch during a replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayHost {
    orientation: DeviceOrientation,
}

impl ReplayHost {
    pub fn new(orientation: DeviceOrientation) -> Self {
        Self { orientation }
    }
}

impl HostDevice for ReplayHost {
    fn orientation(&self) -> DeviceOrientation {
        self.orientation
    }

    fn play(&mut self, cue: HapticCue) {
        debug!(?cue, "haptic");
    }

    fn enable_input_lock(&mut self) {
        debug!("input lock requested");
    }
}
