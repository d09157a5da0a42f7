use std::path::PathBuf;

/// A recorded raw-motion session to replay
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Path to the raw motion CSV
    pub motion_file: PathBuf,
    /// Session name (derived from the file name), used as the session id
    pub name: String,
}

impl SessionData {
    pub fn new(motion_file: PathBuf) -> Self {
        let name = motion_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed_session")
            .to_string();

        Self { motion_file, name }
    }
}
