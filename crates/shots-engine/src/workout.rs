use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, SystemTime};

use crossbeam_channel::Receiver;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use shots_core::contracts::{
    HapticCue, HostDevice, MotionSource, RecorderSessionState, WorkoutRecorder,
};
use shots_core::imu::{MotionPipeline, MotionSample};
use shots_core::session::{QuantityStatistics, SessionDetails, SessionType, TelemetryKind};
use shots_core::time::{to_system_time, Clock, MonotonicWallClock, SystemClock};
use shots_core::{RecordingError, Result, ShotsError, WorkoutConfig};

use crate::events::{EventBus, WorkoutEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkoutState {
    Idle,
    Running,
    Paused,
    /// Terminal; a new manager is needed for another workout.
    Ended,
}

impl fmt::Display for WorkoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkoutState::Idle => "idle",
            WorkoutState::Running => "running",
            WorkoutState::Paused => "paused",
            WorkoutState::Ended => "ended",
        };
        f.write_str(name)
    }
}

type SourceFactory = Box<dyn Fn() -> Box<dyn MotionSource> + Send + Sync>;
type Pipeline = MotionPipeline<Box<dyn MotionSource>>;

struct WorkoutInner<C: Clock> {
    config: WorkoutConfig,
    state: WorkoutState,
    clock: MonotonicWallClock<C>,
    host: Box<dyn HostDevice>,
    details: Option<SessionDetails>,
    pipeline: Option<Pipeline>,
    /// Wall-clock instant the current running interval began.
    run_started_at: Option<Duration>,
}

impl<C: Clock> WorkoutInner<C> {
    fn snapshot(&self) -> Option<SessionDetails> {
        self.details.clone()
    }

    fn require(&self, operation: &'static str, allowed: &[WorkoutState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            warn!(target: "shots_engine::workout", "Can't {} while the workout is {}", operation, self.state);
            Err(ShotsError::invalid_transition(operation, self.state))
        }
    }

    /// Adds the time since the run-start marker to the session and clears it.
    fn fold_running_interval(&mut self, now: Duration) {
        let Some(marker) = self.run_started_at.take() else {
            return;
        };
        let delta = now.saturating_sub(marker);
        if let Some(details) = self.details.as_mut() {
            details.add_active_time(delta);
            debug!(
                target: "shots_engine::workout",
                "Folded {:.3}s of activity (elapsed {}s)",
                delta.as_secs_f64(),
                details.elapsed_seconds
            );
        }
    }

    fn finish(&mut self) -> Option<SessionDetails> {
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.stop();
        }
        let now = self.clock.now();
        self.fold_running_interval(now);
        self.state = WorkoutState::Ended;
        self.host.play(HapticCue::Stop);

        self.details.as_mut().map(|details| {
            details.end_date = Some(to_system_time(now));
            details.clone()
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives one archery workout: start, pause, resume and stop, with motion
/// capture, arrow counting and vital-sign aggregation.
///
/// All methods take `&self`; lifecycle calls, telemetry relays and sensor
/// deliveries may arrive from different threads. Requests to the recorder are
/// fire-and-forget and their outcome is reported on the event channel.
/// Events are published under the workout lock, in the order the state
/// changed.
pub struct WorkoutManager<C: Clock + Send + 'static = SystemClock> {
    inner: Arc<Mutex<WorkoutInner<C>>>,
    recorder: Option<Arc<dyn WorkoutRecorder>>,
    source_factory: SourceFactory,
    events: EventBus,
}

impl WorkoutManager<SystemClock> {
    pub fn new<F, S, R, H>(config: WorkoutConfig, source_factory: F, recorder: R, host: H) -> Result<Self>
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: MotionSource,
        R: WorkoutRecorder,
        H: HostDevice,
    {
        Self::with_clock(config, source_factory, recorder, host, SystemClock)
    }
}

impl<C: Clock + Send + 'static> WorkoutManager<C> {
    pub fn with_clock<F, S, R, H>(
        config: WorkoutConfig,
        source_factory: F,
        recorder: R,
        host: H,
        clock: C,
    ) -> Result<Self>
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: MotionSource,
        R: WorkoutRecorder,
        H: HostDevice,
    {
        config.validate()?;

        let recorder: Option<Arc<dyn WorkoutRecorder>> = if config.save_workout {
            Some(Arc::new(recorder))
        } else {
            None
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(WorkoutInner {
                config,
                state: WorkoutState::Idle,
                clock: MonotonicWallClock::with_clock(clock),
                host: Box::new(host),
                details: None,
                pipeline: None,
                run_started_at: None,
            })),
            recorder,
            source_factory: Box::new(move || Box::new(source_factory()) as Box<dyn MotionSource>),
            events: EventBus::new(),
        })
    }

    pub fn subscribe(&self) -> Receiver<WorkoutEvent> {
        self.events.subscribe()
    }

    /// Motion samples of the current workout as they are accepted; `None`
    /// when no motion is being captured.
    pub fn subscribe_motion(&self) -> Option<Receiver<MotionSample>> {
        lock(&self.inner).pipeline.as_ref().map(|p| p.subscribe())
    }

    pub fn state(&self) -> WorkoutState {
        lock(&self.inner).state
    }

    pub fn details(&self) -> Option<SessionDetails> {
        lock(&self.inner).snapshot()
    }

    /// Text export of the captured motion; `None` for manual sessions or when
    /// the sensor was unavailable.
    pub fn motion_export(&self) -> Option<String> {
        lock(&self.inner).pipeline.as_ref().map(|p| p.export_text())
    }

    pub fn motion_samples(&self) -> Vec<MotionSample> {
        lock(&self.inner)
            .pipeline
            .as_ref()
            .map(|p| p.samples())
            .unwrap_or_default()
    }

    pub fn start(&self, session_id: &str, session_type: SessionType) -> Result<SessionDetails> {
        let (start_date, snapshot) = {
            let mut inner = lock(&self.inner);
            inner.require("start", &[WorkoutState::Idle])?;

            info!(target: "shots_engine::workout", "Starting {} workout session {}", session_type, session_id);

            let pipeline = if session_type.records_motion() {
                self.begin_motion(&mut inner)?
            } else {
                None
            };

            let now = inner.clock.now();
            let start_date = to_system_time(now);
            let details = SessionDetails::new(
                session_id,
                session_type,
                start_date,
                inner.config.heart_rate_seeds,
            );

            inner.pipeline = pipeline;
            inner.details = Some(details.clone());
            inner.run_started_at = Some(now);
            inner.state = WorkoutState::Running;
            inner.host.play(HapticCue::Start);
            self.events.publish(WorkoutEvent::Started(details.clone()));
            (start_date, details)
        };

        self.begin_recording(start_date, session_id.to_string());
        Ok(snapshot)
    }

    pub fn pause(&self) -> Result<SessionDetails> {
        let snapshot = {
            let mut inner = lock(&self.inner);
            inner.require("pause", &[WorkoutState::Running])?;
            if let Some(details) = inner.details.as_ref() {
                if !details.session_type.can_pause() {
                    error!(target: "shots_engine::workout", "Can't pause a manual workout");
                    return Err(ShotsError::invalid_transition(
                        "pause a manual workout",
                        inner.state,
                    ));
                }
            }

            if let Some(pipeline) = inner.pipeline.as_mut() {
                pipeline.pause();
            }
            let now = inner.clock.now();
            inner.fold_running_interval(now);
            inner.state = WorkoutState::Paused;
            inner.host.play(HapticCue::Stop);
            info!(target: "shots_engine::workout", "Workout paused");
            self.publish_with(inner.snapshot(), WorkoutEvent::Paused)?
        };

        if let Some(recorder) = &self.recorder {
            recorder.pause();
        }
        Ok(snapshot)
    }

    pub fn resume(&self) -> Result<SessionDetails> {
        let snapshot = {
            let mut inner = lock(&self.inner);
            inner.require("resume", &[WorkoutState::Paused])?;

            if let Some(pipeline) = inner.pipeline.as_mut() {
                pipeline.resume();
            }
            let now = inner.clock.now();
            inner.run_started_at = Some(now);
            inner.state = WorkoutState::Running;
            inner.host.play(HapticCue::Start);
            info!(target: "shots_engine::workout", "Workout resumed");
            self.publish_with(inner.snapshot(), WorkoutEvent::Resumed)?
        };

        if let Some(recorder) = &self.recorder {
            recorder.resume();
        }
        Ok(snapshot)
    }

    /// Handles the platform's combined pause-or-resume request.
    pub fn toggle_pause(&self) -> Result<SessionDetails> {
        let state = self.state();
        info!(target: "shots_engine::workout", "Received pause or resume request while {}", state);
        match state {
            WorkoutState::Running => self.pause(),
            WorkoutState::Paused => self.resume(),
            other => Err(ShotsError::invalid_transition("toggle pause", other)),
        }
    }

    pub fn stop(&self) -> Result<SessionDetails> {
        let snapshot = {
            let mut inner = lock(&self.inner);
            inner.require("stop", &[WorkoutState::Running, WorkoutState::Paused])?;
            let finished = inner.finish();
            self.publish_with(finished, WorkoutEvent::Stopped)?
        };

        info!(
            target: "shots_engine::workout",
            "Workout ended after {}s with {} arrows",
            snapshot.elapsed_seconds,
            snapshot.arrow_counter
        );
        self.end_recording(snapshot.end_date.unwrap_or_else(SystemTime::now));
        Ok(snapshot)
    }

    pub fn add_arrow(&self) -> Result<SessionDetails> {
        self.update_counters("add an arrow", SessionDetails::add_arrow)
    }

    pub fn remove_arrow(&self) -> Result<SessionDetails> {
        self.update_counters("remove an arrow", SessionDetails::remove_arrow)
    }

    /// Moves on to the next end (group of shots).
    pub fn advance_end(&self) -> Result<SessionDetails> {
        self.update_counters("advance the end", SessionDetails::advance_end)
    }

    /// Relays aggregated statistics from the recorder into the session.
    pub fn on_telemetry_update(
        &self,
        kind: TelemetryKind,
        statistics: &QuantityStatistics,
    ) -> Result<SessionDetails> {
        let snapshot = {
            let mut inner = lock(&self.inner);
            let state = inner.state;
            let Some(details) = inner.details.as_mut() else {
                return Err(ShotsError::invalid_transition("record telemetry", state));
            };
            details.apply_statistics(kind, statistics);
            let snapshot = details.clone();
            self.events.publish(WorkoutEvent::Updated(snapshot.clone()));
            snapshot
        };

        Ok(snapshot)
    }

    /// Locks touch input while the workout is running.
    pub fn lock_screen(&self) -> Result<SessionDetails> {
        let mut inner = lock(&self.inner);
        inner.require("lock the screen", &[WorkoutState::Running])?;
        inner.host.enable_input_lock();
        self.publish_with(inner.snapshot(), WorkoutEvent::Locked)
    }

    pub fn on_recorder_state_change(&self, from: RecorderSessionState, to: RecorderSessionState) {
        debug!(target: "shots_engine::workout", "Recorder session changed from {:?} to {:?}", from, to);
    }

    pub fn on_recorder_failure(&self, err: RecordingError) {
        error!(target: "shots_engine::workout", "Recorder session failed: {}", err);
        self.events.publish(WorkoutEvent::RecordingFailed(err));
    }

    fn update_counters(
        &self,
        operation: &'static str,
        update: fn(&mut SessionDetails),
    ) -> Result<SessionDetails> {
        let mut inner = lock(&self.inner);
        inner.require(operation, &[WorkoutState::Running, WorkoutState::Paused])?;
        let snapshot = inner.details.as_mut().map(|details| {
            update(details);
            details.clone()
        });
        self.publish_with(snapshot, WorkoutEvent::Updated)
    }

    /// Publishes `snapshot`. Callers hold the workout lock, so subscribers
    /// see events in the order the state changed.
    fn publish_with(
        &self,
        snapshot: Option<SessionDetails>,
        event: fn(SessionDetails) -> WorkoutEvent,
    ) -> Result<SessionDetails> {
        // Every state past Idle carries details, so `None` means a broken invariant.
        let snapshot = snapshot.ok_or_else(|| ShotsError::invalid_transition("publish", WorkoutState::Idle))?;
        self.events.publish(event(snapshot.clone()));
        Ok(snapshot)
    }

    fn begin_motion(&self, inner: &mut WorkoutInner<C>) -> Result<Option<Pipeline>> {
        let mut pipeline = MotionPipeline::new((self.source_factory)(), inner.config.sample_frequency)?;
        match pipeline.begin(inner.host.orientation()) {
            Ok(()) => Ok(Some(pipeline)),
            Err(err) => {
                warn!(target: "shots_engine::workout", "Continuing without motion capture: {}", err);
                Ok(None)
            }
        }
    }

    fn begin_recording(&self, start: SystemTime, session_id: String) {
        let Some(recorder) = &self.recorder else {
            warn!(target: "shots_engine::workout", "Saving workouts is disabled; nothing is recorded");
            return;
        };

        let inner = Arc::downgrade(&self.inner);
        let events = self.events.clone();
        recorder.begin_collection(
            start,
            Box::new(move |result| {
                if let Err(err) = result {
                    error!(target: "shots_engine::workout", "Error collecting workout data: {}", err);
                    abort_workout(&inner, &events, &session_id, err);
                }
            }),
        );
    }

    fn end_recording(&self, end: SystemTime) {
        let Some(recorder) = &self.recorder else {
            return;
        };

        let finalizer = Arc::clone(recorder);
        let events = self.events.clone();
        recorder.end_collection(
            end,
            Box::new(move |result| {
                if let Err(err) = result {
                    error!(target: "shots_engine::workout", "Couldn't finish collection: {}", err);
                    events.publish(WorkoutEvent::RecordingFailed(err));
                    return;
                }
                finalizer.finalize(Box::new(move |result| {
                    if let Err(err) = result {
                        error!(target: "shots_engine::workout", "Couldn't finish workout: {}", err);
                        events.publish(WorkoutEvent::RecordingFailed(err));
                    }
                }));
            }),
        );
    }
}

/// Ends a workout whose recording could not begin.
fn abort_workout<C: Clock>(
    inner: &Weak<Mutex<WorkoutInner<C>>>,
    events: &EventBus,
    session_id: &str,
    err: RecordingError,
) {
    let Some(inner) = inner.upgrade() else {
        return;
    };

    let snapshot = {
        let mut inner = lock(&inner);
        let same_session = inner
            .details
            .as_ref()
            .is_some_and(|d| d.session_id == session_id);
        if !same_session || !matches!(inner.state, WorkoutState::Running | WorkoutState::Paused) {
            debug!(target: "shots_engine::workout", "Ignoring recorder failure for a workout that is no longer active");
            events.publish(WorkoutEvent::RecordingFailed(err));
            return;
        }
        warn!(target: "shots_engine::workout", "Ending workout {} because it is not being recorded", session_id);
        inner.finish()
    };

    events.publish(WorkoutEvent::RecordingFailed(err));
    if let Some(snapshot) = snapshot {
        events.publish(WorkoutEvent::Stopped(snapshot));
    }
}
