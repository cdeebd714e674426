//! UI-facing state that is not tied to a single screen

pub mod state;

pub use state::{LogCategory, LogEntry, SessionLog};
