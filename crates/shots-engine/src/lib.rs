//! Workout lifecycle for archery sessions: the [`WorkoutManager`] state
//! machine and the events it publishes.
//!
//! ```ignore
//! let manager = WorkoutManager::new(config, device_motion, health_recorder, watch)?;
//! let events = manager.subscribe();
//! manager.start("morning-round", SessionType::Free)?;
//! manager.add_arrow()?;
//! let details = manager.stop()?;
//! let export = manager.motion_export();
//! ```

pub mod events;
pub mod workout;

pub use events::{EventBus, WorkoutEvent};
pub use workout::{WorkoutManager, WorkoutState};
