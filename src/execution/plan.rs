//! What `go` hands to the pipeline

use crate::core::types::FileRef;
use crate::execution::port::{Stage, StageRequest};

/// Knowledge input for stage 1; a session uses exactly one intake mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeSource {
    /// Rule text compiled from the builder
    Compiled(String),
    /// Path of an imported knowledge file
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub knowledge: KnowledgeSource,
    /// Comma-joined recording paths
    pub recordings_path: String,
    pub initial_state: String,
    pub file_sentinel: String,
}

impl ExecutionPlan {
    pub fn stage_one(&self) -> StageRequest {
        let args = match &self.knowledge {
            KnowledgeSource::Compiled(text) => vec![text.clone()],
            KnowledgeSource::File(path) => vec![path.clone(), self.file_sentinel.clone()],
        };
        StageRequest {
            stage: Stage::Knowledge,
            args,
        }
    }

    pub fn stage_two(&self) -> StageRequest {
        StageRequest {
            stage: Stage::Imitation,
            args: vec![self.recordings_path.clone(), self.initial_state.clone()],
        }
    }
}

/// Join recording paths with `,`; there is no trailing separator
pub fn recordings_path(recordings: &[FileRef]) -> String {
    let paths: Vec<&str> = recordings.iter().map(|r| r.path.as_str()).collect();
    paths.join(",")
}
