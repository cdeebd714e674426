//! Handoff from the wizard to the external learning pipeline
//!
//! `go` produces an `ExecutionPlan`; `pipeline::run` drives it through an
//! `ExecutionPort`:
//! ExecutionPlan -> stage 1 (knowledge) -> completion -> stage 2 (imitation)

pub mod cancel;
pub mod pipeline;
pub mod plan;
pub mod port;
pub mod process;

pub use cancel::CancellationToken;
pub use pipeline::PipelineReport;
pub use plan::{recordings_path, ExecutionPlan, KnowledgeSource};
pub use port::{ExecutionPort, Stage, StageOutput, StageRequest};
pub use process::ProcessPort;
