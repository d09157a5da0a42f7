pub mod export;
pub mod orientation;
pub mod pipeline;
pub mod sample;

pub use export::{render_samples, EXPORT_HEADER};
pub use orientation::DeviceOrientation;
pub use pipeline::{MotionPipeline, PipelineStatus};
pub use sample::{MotionSample, RawMotion};
