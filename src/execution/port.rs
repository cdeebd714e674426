//! Boundary to the external learning pipeline

use crate::core::error::Result;
use std::fmt;
use std::future::Future;

/// The two pipeline invocations, always issued in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Stage 1: compile the knowledge into the planner domain
    Knowledge,
    /// Stage 2: run imitation over the recordings
    Imitation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Knowledge => write!(f, "stage 1 (knowledge)"),
            Stage::Imitation => write!(f, "stage 2 (imitation)"),
        }
    }
}

/// Arguments for one stage invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRequest {
    pub stage: Stage,
    pub args: Vec<String>,
}

/// What a finished stage reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub stage: Stage,
    /// Lossily decoded output, forwarded to the log and never parsed
    pub diagnostics: String,
}

/// Something that can execute pipeline stages
///
/// The returned future resolves when the stage has finished, which is the
/// completion signal the pipeline waits on before starting the next stage.
pub trait ExecutionPort: Send + Sync {
    fn run(&self, request: StageRequest) -> impl Future<Output = Result<StageOutput>> + Send;
}
