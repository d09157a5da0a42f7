use serde::{Deserialize, Serialize};
use shots_core::session::SessionDetails;

/// Complete replay output in JSON format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayOutput {
    pub metadata: Metadata,
    pub session: SessionDetails,
    pub motion: Option<MotionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub session_name: String,
    pub motion_file: String,
    pub reading_count: usize,
    pub sample_frequency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionSummary {
    pub sample_count: usize,
    pub duration_seconds: f64,
    pub export_file: String,
    /// Mean gravity-aligned vertical acceleration, in g
    pub mean_vertical_acceleration: f64,
}
