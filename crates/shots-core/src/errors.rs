use thiserror::Error;

/// Errors reported by the motion source while delivering samples.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("device motion is not available on this device")]
    Unavailable,

    #[error("sensor delivery error: {0}")]
    Delivery(String),
}

/// Recorder operation that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RecordingStage {
    Begin,
    End,
    Finalize,
    Session,
}

/// Failure reported by the health-data recorder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("recording failed during {stage:?}: {message}")]
pub struct RecordingError {
    pub stage: RecordingStage,
    pub message: String,
}

impl RecordingError {
    pub fn new(stage: RecordingStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShotsError {
    #[error("cannot {operation} while the workout is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: String,
    },

    #[error("vectors must be 3D (acceleration has {acceleration} components, gravity has {gravity})")]
    Dimension {
        acceleration: usize,
        gravity: usize,
        /// The acceleration as passed in, left untransformed.
        unchanged: Vec<f64>,
    },

    #[error("sample frequency must be finite and positive, got {0}")]
    InvalidFrequency(f64),

    #[error("device motion is not available")]
    SensorUnavailable,

    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Recording(#[from] RecordingError),
}

impl ShotsError {
    pub fn invalid_transition(operation: &'static str, state: impl ToString) -> Self {
        ShotsError::InvalidTransition {
            operation,
            state: state.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShotsError>;
