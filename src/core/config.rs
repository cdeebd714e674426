//! Wizard configuration
//!
//! Everything the core needs from the outside world that is not chosen by the
//! user in a screen: how to launch the two pipeline stages, where compiled
//! knowledge lands, and how much diagnostic text to keep.

use crate::core::error::{Result, WizardError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A program plus its leading arguments
///
/// Stage arguments from the wizard are appended after `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Configuration for a wizard session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    // === PIPELINE ===
    /// Stage 1: compiles knowledge (text or file path) into the planner domain
    pub stage_one: CommandSpec,

    /// Stage 2: replays the recordings against the compiled domain
    ///
    /// Receives the comma-joined recording paths and the initial-state file.
    pub stage_two: CommandSpec,

    /// Literal second argument to stage 1 when the first is a file path
    ///
    /// The stage-1 program decides between "text" and "path" input by
    /// argument count, so the value itself is never read.
    pub file_sentinel: String,

    /// Upper bound for a single stage in seconds (0 = no limit)
    pub stage_timeout_secs: u64,

    // === OUTPUT ===
    /// Directory that receives `<task>_knowledge.txt`
    pub output_dir: String,

    // === LOGGING ===
    /// Number of diagnostic entries kept in the session log
    pub log_capacity: usize,

    /// Default tracing filter when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            stage_one: CommandSpec::new("python3", &["python_causal_compiler/compiler/run.py"]),
            stage_two: CommandSpec::new(
                "python3",
                &["python_causal_compiler/compiler/output/load_demo.py"],
            ),
            file_sentinel: "file".into(),
            stage_timeout_secs: 300,
            output_dir: ".".into(),
            log_capacity: 200,
            log_filter: "causal_wizard=info".into(),
        }
    }
}

impl WizardConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate().map_err(WizardError::Config)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.stage_one.program.trim().is_empty() {
            return Err("stage_one.program must not be empty".into());
        }
        if self.stage_two.program.trim().is_empty() {
            return Err("stage_two.program must not be empty".into());
        }
        if self.log_capacity == 0 {
            return Err("log_capacity must be at least 1".into());
        }
        Ok(())
    }

    pub fn stage_timeout(&self) -> Option<std::time::Duration> {
        (self.stage_timeout_secs > 0).then(|| std::time::Duration::from_secs(self.stage_timeout_secs))
    }
}
