use shots_core::ShotsError;
use thiserror::Error;

/// Errors that can occur while replaying a recorded session
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Raw motion file format error at line {line}: {message}")]
    RawMotionFormat { line: usize, message: String },

    #[error("Raw motion file not found: {0}")]
    RawMotionFileNotFound(String),

    #[error("No motion samples found in {0}")]
    NoSamples(String),

    #[error("Workout error: {0}")]
    Workout(#[from] ShotsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ReplayError>;
