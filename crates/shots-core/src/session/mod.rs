pub mod details;
pub mod kind;
pub mod telemetry;

pub use details::SessionDetails;
pub use kind::SessionType;
pub use telemetry::{QuantityStatistics, TelemetryKind};
