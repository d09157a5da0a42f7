//! Boundaries to the platform services the workout core drives but does not
//! own: the device-motion sensor, the health-data recorder and the host
//! device (orientation, haptics, input lock).

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::errors::{RecordingError, SensorError};
use crate::imu::{DeviceOrientation, RawMotion};

/// Callback receiving each delivered reading, or the error that replaced it.
/// Runs on whatever thread the source delivers on.
pub type MotionHandler = Box<dyn FnMut(Result<RawMotion, SensorError>) + Send + 'static>;

/// Completion of an asynchronous recorder request.
pub type RecorderCompletion = Box<dyn FnOnce(Result<(), RecordingError>) + Send + 'static>;

/// Device-motion sensor.
pub trait MotionSource: Send + 'static {
    /// Whether the hardware can deliver device motion at all.
    fn is_available(&self) -> bool;

    fn set_update_interval(&mut self, interval: Duration) -> Result<(), SensorError>;

    /// Starts (or restarts) delivery at the configured interval.
    fn start_updates(&mut self, handler: MotionHandler);

    fn stop_updates(&mut self);
}

impl<S: MotionSource + ?Sized> MotionSource for Box<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn set_update_interval(&mut self, interval: Duration) -> Result<(), SensorError> {
        (**self).set_update_interval(interval)
    }

    fn start_updates(&mut self, handler: MotionHandler) {
        (**self).start_updates(handler)
    }

    fn stop_updates(&mut self) {
        (**self).stop_updates()
    }
}

/// Health-data recorder collecting vitals, distance and energy for a workout.
///
/// Completions may run synchronously inside the call or later on any thread.
pub trait WorkoutRecorder: Send + Sync + 'static {
    fn begin_collection(&self, start: SystemTime, completion: RecorderCompletion);

    fn pause(&self);

    fn resume(&self);

    fn end_collection(&self, end: SystemTime, completion: RecorderCompletion);

    fn finalize(&self, completion: RecorderCompletion);
}

/// Session state reported by the recorder itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecorderSessionState {
    NotStarted,
    Prepared,
    Running,
    Paused,
    Stopped,
    Ended,
}

/// Haptic feedback played on lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HapticCue {
    Start,
    Stop,
}

/// The wrist device hosting the workout.
pub trait HostDevice: Send + 'static {
    fn orientation(&self) -> DeviceOrientation;

    fn play(&mut self, cue: HapticCue);

    /// Locks touch input (water lock) until the wearer unlocks it.
    fn enable_input_lock(&mut self);
}
