use serde::{Deserialize, Serialize};

/// Quantity the recorder aggregates for a live workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    /// Walking/running distance, meters.
    Distance,
    /// Active energy burned, kilocalories.
    ActiveEnergy,
    /// Heart rate, beats per minute.
    HeartRate,
}

/// Aggregated statistics for one quantity since the workout began.
/// Cumulative quantities fill `sum`; discrete ones the remaining fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityStatistics {
    pub sum: Option<f64>,
    pub latest: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub average: Option<f64>,
}

impl QuantityStatistics {
    pub fn cumulative(sum: f64) -> Self {
        Self {
            sum: Some(sum),
            ..Self::default()
        }
    }

    pub fn discrete(latest: f64, minimum: f64, maximum: f64, average: f64) -> Self {
        Self {
            sum: None,
            latest: Some(latest),
            minimum: Some(minimum),
            maximum: Some(maximum),
            average: Some(average),
        }
    }
}
