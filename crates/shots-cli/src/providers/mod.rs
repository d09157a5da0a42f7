pub mod replay;

pub use replay::{OfflineRecorder, ReplayClock, ReplayHost, ReplayMotionSource};
