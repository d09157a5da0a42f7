use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Open-ended practice with motion capture.
    Free,
    /// Practice towards an arrow goal, with motion capture.
    Goal,
    /// Arrows counted by hand; no motion capture and no pausing.
    Manual,
}

impl SessionType {
    pub fn records_motion(&self) -> bool {
        !matches!(self, SessionType::Manual)
    }

    pub fn can_pause(&self) -> bool {
        !matches!(self, SessionType::Manual)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Free => "free",
            SessionType::Goal => "goal",
            SessionType::Manual => "manual",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
