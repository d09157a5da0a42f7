pub mod parser;

pub use parser::RawMotionParser;
