//! Session log shown alongside the wizard screens

use crate::execution::port::Stage;
use std::collections::VecDeque;

/// Fallback capacity when none is configured
const DEFAULT_LOG_ENTRIES: usize = 200;

/// Bounded log of diagnostic text for the current session
#[derive(Debug)]
pub struct SessionLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

/// An entry in the session log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub message: String,
    pub category: LogCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Wizard,
    StageOne,
    StageTwo,
    Error,
}

impl From<Stage> for LogCategory {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Knowledge => LogCategory::StageOne,
            Stage::Imitation => LogCategory::StageTwo,
        }
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_ENTRIES)
    }
}

impl SessionLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add an entry, evicting the oldest when full
    pub fn log(&mut self, message: impl Into<String>, category: LogCategory) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            message: message.into(),
            category,
        });
    }

    /// Add each non-blank line of a stage's output
    pub fn log_diagnostics(&mut self, stage: Stage, text: &str) {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.log(line, stage.into());
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
