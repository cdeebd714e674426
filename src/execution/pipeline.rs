//! Sequencing of the two pipeline stages
//!
//! Stage 2 only starts once stage 1 has reported completion. Either stage can
//! be aborted through the run's cancellation token, and a failed stage ends
//! the run.

use crate::core::error::{Result, WizardError};
use crate::execution::cancel::CancellationToken;
use crate::execution::plan::ExecutionPlan;
use crate::execution::port::{ExecutionPort, StageOutput, StageRequest};

/// Everything a run produced, successful or not
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Outputs of the stages that finished, in order
    pub outputs: Vec<StageOutput>,
    /// Why the run stopped early, if it did
    pub error: Option<WizardError>,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Run stage 1 then stage 2 for `plan`
pub async fn run<P: ExecutionPort>(
    port: &P,
    plan: &ExecutionPlan,
    cancel: &CancellationToken,
) -> PipelineReport {
    let mut report = PipelineReport::default();

    for request in [plan.stage_one(), plan.stage_two()] {
        match run_stage(port, request, cancel).await {
            Ok(output) => report.outputs.push(output),
            Err(e) => {
                tracing::warn!("Pipeline stopped: {}", e);
                report.error = Some(e);
                break;
            }
        }
    }

    if report.is_success() {
        tracing::info!("Pipeline finished ({} stages)", report.outputs.len());
    }
    report
}

async fn run_stage<P: ExecutionPort>(
    port: &P,
    request: StageRequest,
    cancel: &CancellationToken,
) -> Result<StageOutput> {
    if cancel.is_cancelled() {
        return Err(WizardError::Cancelled);
    }

    let stage = request.stage;
    tracing::info!("Starting {}", stage);

    let output = tokio::select! {
        output = port.run(request) => output?,
        _ = cancel.cancelled() => return Err(WizardError::Cancelled),
    };

    for line in output.diagnostics.lines() {
        tracing::debug!(target: "causal_wizard::stage", "{}: {}", stage, line);
    }
    tracing::info!("Completed {}", stage);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::plan::KnowledgeSource;
    use crate::execution::port::Stage;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records start/finish events; stage 1 takes a while to finish
    #[derive(Default)]
    struct ScriptedPort {
        events: Mutex<Vec<String>>,
        fail: Option<Stage>,
        stage_one_delay: Duration,
    }

    impl ExecutionPort for ScriptedPort {
        async fn run(&self, request: StageRequest) -> Result<StageOutput> {
            self.events.lock().unwrap().push(format!("start {:?}", request.stage));
            if request.stage == Stage::Knowledge {
                tokio::time::sleep(self.stage_one_delay).await;
            }
            if self.fail == Some(request.stage) {
                return Err(WizardError::Stage {
                    stage: request.stage,
                    message: "exit code 1".into(),
                });
            }
            self.events.lock().unwrap().push(format!("finish {:?}", request.stage));
            Ok(StageOutput {
                stage: request.stage,
                diagnostics: request.args.join(" "),
            })
        }
    }

    fn plan() -> ExecutionPlan {
        ExecutionPlan {
            knowledge: KnowledgeSource::Compiled("RULES { a() := b() }".into()),
            recordings_path: "d/0.txt,d/1.txt".into(),
            initial_state: "scene.xml".into(),
            file_sentinel: "file".into(),
        }
    }

    #[tokio::test]
    async fn test_stage_two_waits_for_stage_one() {
        let port = ScriptedPort {
            stage_one_delay: Duration::from_millis(30),
            ..Default::default()
        };
        let report = run(&port, &plan(), &CancellationToken::new()).await;

        assert!(report.is_success());
        assert_eq!(
            *port.events.lock().unwrap(),
            vec![
                "start Knowledge",
                "finish Knowledge",
                "start Imitation",
                "finish Imitation"
            ]
        );
        assert_eq!(report.outputs[1].diagnostics, "d/0.txt,d/1.txt scene.xml");
    }

    #[tokio::test]
    async fn test_stage_one_failure_skips_stage_two() {
        let port = ScriptedPort {
            fail: Some(Stage::Knowledge),
            ..Default::default()
        };
        let report = run(&port, &plan(), &CancellationToken::new()).await;

        assert!(matches!(
            report.error,
            Some(WizardError::Stage {
                stage: Stage::Knowledge,
                ..
            })
        ));
        assert!(report.outputs.is_empty());
        assert_eq!(*port.events.lock().unwrap(), vec!["start Knowledge"]);
    }

    #[tokio::test]
    async fn test_cancel_during_stage_one() {
        let port = ScriptedPort {
            stage_one_delay: Duration::from_secs(30),
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let report = tokio::time::timeout(Duration::from_secs(5), run(&port, &plan(), &cancel))
            .await
            .expect("cancel should end the run");
        assert!(matches!(report.error, Some(WizardError::Cancelled)));
        assert!(!port
            .events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.contains("Imitation")));
    }

    #[tokio::test]
    async fn test_precancelled_run_starts_nothing() {
        let port = ScriptedPort::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = run(&port, &plan(), &cancel).await;
        assert!(matches!(report.error, Some(WizardError::Cancelled)));
        assert!(port.events.lock().unwrap().is_empty());
    }
}
