pub mod config;
pub mod session_data;

pub use config::*;
pub use session_data::*;
