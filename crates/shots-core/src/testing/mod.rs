//! In-memory stand-ins for the platform collaborators, shared by the unit and
//! integration tests of every crate in the workspace.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use crate::contracts::{
    HapticCue, HostDevice, MotionHandler, MotionSource, RecorderCompletion, WorkoutRecorder,
};
use crate::errors::{RecordingError, RecordingStage, SensorError};
use crate::imu::{DeviceOrientation, RawMotion};
use crate::time::Clock;

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock whose reading only moves when a test advances it.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClock {
    now: Arc<Mutex<Duration>>,
}

impl ScriptedClock {
    pub fn starting_at(now: Duration) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = guard(&self.now);
        *now += by;
    }
}

impl Clock for ScriptedClock {
    fn now(&mut self) -> Duration {
        *guard(&self.now)
    }
}

#[derive(Default)]
struct SourceState {
    available: bool,
    interval: Option<Duration>,
    handler: Option<MotionHandler>,
    starts: usize,
    stops: usize,
}

/// Motion source driven by hand: readings are pushed with [`deliver`](Self::deliver).
#[derive(Clone)]
pub struct ManualMotionSource {
    state: Arc<Mutex<SourceState>>,
}

impl ManualMotionSource {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SourceState {
                available: true,
                ..SourceState::default()
            })),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            state: Arc::new(Mutex::new(SourceState::default())),
        }
    }

    /// Hands a reading to the active handler. Returns `false` when updates
    /// are not running.
    pub fn deliver(&self, raw: RawMotion) -> bool {
        let mut state = guard(&self.state);
        match state.handler.as_mut() {
            Some(handler) => {
                handler(Ok(raw));
                true
            }
            None => false,
        }
    }

    pub fn fail(&self, err: SensorError) -> bool {
        let mut state = guard(&self.state);
        match state.handler.as_mut() {
            Some(handler) => {
                handler(Err(err));
                true
            }
            None => false,
        }
    }

    pub fn is_delivering(&self) -> bool {
        guard(&self.state).handler.is_some()
    }

    pub fn update_interval(&self) -> Option<Duration> {
        guard(&self.state).interval
    }

    pub fn start_count(&self) -> usize {
        guard(&self.state).starts
    }

    pub fn stop_count(&self) -> usize {
        guard(&self.state).stops
    }
}

impl Default for ManualMotionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionSource for ManualMotionSource {
    fn is_available(&self) -> bool {
        guard(&self.state).available
    }

    fn set_update_interval(&mut self, interval: Duration) -> Result<(), SensorError> {
        let mut state = guard(&self.state);
        if !state.available {
            return Err(SensorError::Unavailable);
        }
        state.interval = Some(interval);
        Ok(())
    }

    fn start_updates(&mut self, handler: MotionHandler) {
        let mut state = guard(&self.state);
        state.handler = Some(handler);
        state.starts += 1;
    }

    fn stop_updates(&mut self) {
        let mut state = guard(&self.state);
        state.handler = None;
        state.stops += 1;
    }
}

/// Request observed by a [`RecorderLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderCall {
    Begin(SystemTime),
    Pause,
    Resume,
    End(SystemTime),
    Finalize,
}

#[derive(Default)]
struct RecorderState {
    calls: Vec<RecorderCall>,
    failing: Vec<RecordingStage>,
    deferred: bool,
    pending: Vec<(RecordingStage, RecorderCompletion)>,
}

/// Recorder that logs every request and completes it immediately, unless
/// completions are deferred.
#[derive(Clone, Default)]
pub struct RecorderLog {
    state: Arc<Mutex<RecorderState>>,
}

impl RecorderLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests at `stage` complete with an error.
    pub fn failing_at(self, stage: RecordingStage) -> Self {
        guard(&self.state).failing.push(stage);
        self
    }

    /// Holds completions until [`complete_pending`](Self::complete_pending).
    pub fn deferred(self) -> Self {
        guard(&self.state).deferred = true;
        self
    }

    pub fn calls(&self) -> Vec<RecorderCall> {
        guard(&self.state).calls.clone()
    }

    /// Runs held completions in request order; returns how many ran.
    pub fn complete_pending(&self) -> usize {
        let pending = std::mem::take(&mut guard(&self.state).pending);
        let count = pending.len();
        for (stage, completion) in pending {
            completion(self.outcome(stage));
        }
        count
    }

    fn outcome(&self, stage: RecordingStage) -> Result<(), RecordingError> {
        if guard(&self.state).failing.contains(&stage) {
            Err(RecordingError::new(stage, "rejected by test recorder"))
        } else {
            Ok(())
        }
    }

    fn request(&self, call: RecorderCall, stage: RecordingStage, completion: RecorderCompletion) {
        let deferred = {
            let mut state = guard(&self.state);
            state.calls.push(call);
            state.deferred
        };
        if deferred {
            guard(&self.state).pending.push((stage, completion));
        } else {
            completion(self.outcome(stage));
        }
    }
}

impl WorkoutRecorder for RecorderLog {
    fn begin_collection(&self, start: SystemTime, completion: RecorderCompletion) {
        self.request(RecorderCall::Begin(start), RecordingStage::Begin, completion);
    }

    fn pause(&self) {
        guard(&self.state).calls.push(RecorderCall::Pause);
    }

    fn resume(&self) {
        guard(&self.state).calls.push(RecorderCall::Resume);
    }

    fn end_collection(&self, end: SystemTime, completion: RecorderCompletion) {
        self.request(RecorderCall::End(end), RecordingStage::End, completion);
    }

    fn finalize(&self, completion: RecorderCompletion) {
        self.request(RecorderCall::Finalize, RecordingStage::Finalize, completion);
    }
}

#[derive(Default)]
struct HostState {
    orientation: DeviceOrientation,
    cues: Vec<HapticCue>,
    input_locks: usize,
}

/// Host device that records haptic cues and input-lock requests.
#[derive(Clone, Default)]
pub struct HostLog {
    state: Arc<Mutex<HostState>>,
}

impl HostLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orientation(orientation: DeviceOrientation) -> Self {
        let host = Self::default();
        guard(&host.state).orientation = orientation;
        host
    }

    pub fn cues(&self) -> Vec<HapticCue> {
        guard(&self.state).cues.clone()
    }

    pub fn input_locks(&self) -> usize {
        guard(&self.state).input_locks
    }
}

impl HostDevice for HostLog {
    fn orientation(&self) -> DeviceOrientation {
        guard(&self.state).orientation
    }

    fn play(&mut self, cue: HapticCue) {
        guard(&self.state).cues.push(cue);
    }

    fn enable_input_lock(&mut self) {
        guard(&self.state).input_locks += 1;
    }
}
