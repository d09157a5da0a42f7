pub mod json;

pub use json::{Metadata, MotionSummary, ReplayOutput};
