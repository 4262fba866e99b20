//! A code-point reader for YAML sources

mod mark;
pub use mark::Mark;

mod reader;
pub use reader::Reader;
