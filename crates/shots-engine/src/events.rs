use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{unbounded, Receiver, Sender};
use shots_core::session::SessionDetails;
use shots_core::RecordingError;

/// Notification published by the workout manager. Every variant carries an
/// owned snapshot, so subscribers never share state with the manager.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutEvent {
    Started(SessionDetails),
    Paused(SessionDetails),
    Resumed(SessionDetails),
    Stopped(SessionDetails),
    Updated(SessionDetails),
    Locked(SessionDetails),
    RecordingFailed(RecordingError),
}

impl WorkoutEvent {
    pub fn details(&self) -> Option<&SessionDetails> {
        match self {
            WorkoutEvent::Started(d)
            | WorkoutEvent::Paused(d)
            | WorkoutEvent::Resumed(d)
            | WorkoutEvent::Stopped(d)
            | WorkoutEvent::Updated(d)
            | WorkoutEvent::Locked(d) => Some(d),
            WorkoutEvent::RecordingFailed(_) => None,
        }
    }
}

/// Fan-out of workout events to any number of channel subscribers.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<WorkoutEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<WorkoutEvent> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Delivers to every live subscriber; dropped receivers are forgotten.
    pub fn publish(&self, event: WorkoutEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
