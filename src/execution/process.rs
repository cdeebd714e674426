//! Pipeline stages as child processes

use crate::core::config::{CommandSpec, WizardConfig};
use crate::core::error::{Result, WizardError};
use crate::execution::port::{ExecutionPort, Stage, StageOutput, StageRequest};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs each stage as the command configured for it
///
/// Request arguments are appended to the configured arguments. The child is
/// killed if the run is dropped or cancelled.
#[derive(Debug, Clone)]
pub struct ProcessPort {
    stage_one: CommandSpec,
    stage_two: CommandSpec,
    timeout: Option<Duration>,
}

impl ProcessPort {
    pub fn new(stage_one: CommandSpec, stage_two: CommandSpec) -> Self {
        Self {
            stage_one,
            stage_two,
            timeout: None,
        }
    }

    pub fn from_config(config: &WizardConfig) -> Self {
        Self {
            timeout: config.stage_timeout(),
            ..Self::new(config.stage_one.clone(), config.stage_two.clone())
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn command_for(&self, stage: Stage) -> &CommandSpec {
        match stage {
            Stage::Knowledge => &self.stage_one,
            Stage::Imitation => &self.stage_two,
        }
    }
}

impl ExecutionPort for ProcessPort {
    async fn run(&self, request: StageRequest) -> Result<StageOutput> {
        let stage = request.stage;
        let spec = self.command_for(stage);

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| WizardError::Stage {
                    stage,
                    message: format!("timed out after {}s", limit.as_secs()),
                })?,
            None => cmd.output().await,
        }
        .map_err(|e| WizardError::Stage {
            stage,
            message: format!("failed to launch {}: {e}", spec.program),
        })?;

        let diagnostics = format_diagnostics(&output.stdout, &output.stderr);
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(WizardError::Stage {
                stage,
                message: format!("exit code {code}: {}", diagnostics.trim()),
            });
        }

        Ok(StageOutput { stage, diagnostics })
    }
}

fn format_diagnostics(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.trim().is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }
    text
}
