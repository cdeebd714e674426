//! Wizard state machine
//!
//! Owns the active screen and every session-scoped field. Screen changes are
//! unconditional; input is only checked when the user asks to run (`go`).

use crate::core::config::WizardConfig;
use crate::core::error::{Result, WizardError};
use crate::core::types::{ActionStatus, FileRef, IntakeMode};
use crate::execution::pipeline::PipelineReport;
use crate::execution::plan::{recordings_path, ExecutionPlan, KnowledgeSource};
use crate::knowledge::indexer::build_param_list;
use crate::knowledge::model::KnowledgeModel;
use crate::rules::compiler::compile;
use crate::scene;
use crate::ui::state::{LogCategory, SessionLog};
use crate::wizard::screen::Screen;

/// A single authoring session
#[derive(Debug)]
pub struct WizardController {
    config: WizardConfig,
    screen: Screen,
    knowledge: KnowledgeModel,
    /// Picker values per cause, rebuilt on entering `CausalParameters`
    param_list: Vec<Vec<String>>,
    task_label: String,
    recordings: Vec<FileRef>,
    /// Set when the session imports knowledge instead of building it
    knowledge_file: Option<FileRef>,
    initial_state_files: Vec<FileRef>,
    scene_xml: Option<String>,
    error: Option<String>,
    status: ActionStatus,
    log: SessionLog,
}

impl WizardController {
    pub fn new(config: WizardConfig) -> Self {
        let log = SessionLog::with_capacity(config.log_capacity);
        Self {
            config,
            screen: Screen::InputTask,
            knowledge: KnowledgeModel::new(),
            param_list: Vec::new(),
            task_label: String::new(),
            recordings: Vec::new(),
            knowledge_file: None,
            initial_state_files: Vec::new(),
            scene_xml: None,
            error: None,
            status: ActionStatus::Ready,
            log,
        }
    }

    // === SCREENS ===

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_active(&self, screen: Screen) -> bool {
        self.screen == screen
    }

    /// Make `screen` the active screen, running its entry effect first
    pub fn show(&mut self, screen: Screen) {
        match screen {
            Screen::Review => {
                self.error = None;
                self.status = ActionStatus::Ready;
            }
            Screen::CausalParameters => {
                self.param_list =
                    build_param_list(self.knowledge.causes(), self.knowledge.custom_parameters());
            }
            _ => {}
        }
        tracing::debug!("Screen {} -> {}", self.screen, screen);
        self.screen = screen;
    }

    // === KNOWLEDGE ===

    pub fn knowledge(&self) -> &KnowledgeModel {
        &self.knowledge
    }

    pub fn knowledge_mut(&mut self) -> &mut KnowledgeModel {
        &mut self.knowledge
    }

    pub fn param_list(&self) -> &[Vec<String>] {
        &self.param_list
    }

    /// Compiled text of the current knowledge
    pub fn preview(&self) -> String {
        compile(self.knowledge.causes())
    }

    // === SESSION INPUT ===

    pub fn task_label(&self) -> &str {
        &self.task_label
    }

    pub fn set_task_label(&mut self, label: impl Into<String>) {
        self.task_label = label.into();
    }

    pub fn recordings(&self) -> &[FileRef] {
        &self.recordings
    }

    /// Replace the recording selection; entries with a blank path are dropped
    pub fn set_recordings(&mut self, recordings: Vec<FileRef>) {
        let selected = recordings.len();
        self.recordings = recordings
            .into_iter()
            .filter(|r| !r.path.trim().is_empty())
            .collect();
        if self.recordings.len() < selected {
            tracing::warn!(
                "Ignored {} recordings with an empty path",
                selected - self.recordings.len()
            );
        }
        tracing::debug!("Selected {} recordings", self.recordings.len());
    }

    pub fn intake(&self) -> IntakeMode {
        if self.knowledge_file.is_some() {
            IntakeMode::FileImport
        } else {
            IntakeMode::Builder
        }
    }

    pub fn knowledge_file(&self) -> Option<&FileRef> {
        self.knowledge_file.as_ref()
    }

    /// Switch to file import using the first selected file
    ///
    /// An empty selection switches back to the builder.
    pub fn import_knowledge(&mut self, files: Vec<FileRef>) {
        self.knowledge_file = files.into_iter().next();
        tracing::debug!("Knowledge intake: {:?}", self.intake());
    }

    pub fn use_builder(&mut self) {
        self.knowledge_file = None;
    }

    pub fn initial_state_files(&self) -> &[FileRef] {
        &self.initial_state_files
    }

    pub fn set_initial_state_files(&mut self, files: Vec<FileRef>) {
        self.initial_state_files = files;
    }

    /// Build scene XML from a description entered on the XML page
    ///
    /// The shell decides where to save it and then registers the saved file
    /// through `set_initial_state_files`.
    pub fn generate_scene(&mut self, description: &str) -> Result<&str> {
        match scene::generate(description) {
            Ok(xml) => {
                self.error = None;
                Ok(self.scene_xml.insert(xml).as_str())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.log.log(e.to_string(), LogCategory::Error);
                Err(e)
            }
        }
    }

    pub fn scene_xml(&self) -> Option<&str> {
        self.scene_xml.as_deref()
    }

    // === STATUS ===

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> ActionStatus {
        self.status
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    // === RUN ===

    /// Validate input and hand the session to the pipeline
    ///
    /// Without recordings the error indicator is set and the active screen
    /// is left alone. Once on `Final` only `start_over` allows another run. Otherwise the returned plan is ready for
    /// `execution::pipeline::run` and the wizard moves to `Final`.
    pub fn go(&mut self) -> Result<ExecutionPlan> {
        if self.screen.is_terminal() {
            tracing::warn!("Run refused on {}: session already ran", self.screen);
            return Err(WizardError::AlreadyRun);
        }
        if self.recordings.is_empty() {
            let error = WizardError::NoRecordings;
            tracing::warn!("Run blocked: {}", error);
            self.error = Some(error.to_string());
            self.status = ActionStatus::Blocked;
            return Err(error);
        }
        self.error = None;

        let knowledge = match &self.knowledge_file {
            Some(file) => KnowledgeSource::File(file.path.clone()),
            None => {
                let blanks = self.knowledge.blank_labels();
                if !blanks.is_empty() {
                    tracing::warn!("Compiling knowledge with {} blank labels", blanks.len());
                }
                KnowledgeSource::Compiled(self.preview())
            }
        };

        let initial_state = match self.initial_state_files.first() {
            Some(file) => file.path.clone(),
            None => {
                tracing::warn!("No initial-state file selected");
                String::new()
            }
        };

        let plan = ExecutionPlan {
            knowledge,
            recordings_path: recordings_path(&self.recordings),
            initial_state,
            file_sentinel: self.config.file_sentinel.clone(),
        };

        tracing::info!(
            "Run started for task '{}' with {} recordings",
            self.task_label,
            self.recordings.len()
        );
        self.log.log("Run started", LogCategory::Wizard);
        self.status = ActionStatus::Running;
        self.show(Screen::Final);
        Ok(plan)
    }

    /// Record how a pipeline run ended
    pub fn finish_run(&mut self, report: PipelineReport) {
        for output in &report.outputs {
            self.log.log_diagnostics(output.stage, &output.diagnostics);
        }
        match report.error {
            None => {
                self.status = ActionStatus::Succeeded;
                self.log.log("Run finished", LogCategory::Wizard);
                tracing::info!("Run finished");
            }
            Some(e) => {
                self.status = ActionStatus::Failed;
                self.error = Some(e.to_string());
                self.log.log(e.to_string(), LogCategory::Error);
                tracing::error!("Run failed: {}", e);
            }
        }
    }

    /// Discard the whole session and start again at `InputTask`
    pub fn start_over(&mut self) {
        tracing::info!("Starting over");
        *self = Self::new(self.config.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::port::{Stage, StageOutput};
    use crate::knowledge::model::Relationship;

    fn wizard() -> WizardController {
        WizardController::new(WizardConfig::default())
    }

    fn recordings() -> Vec<FileRef> {
        vec![
            FileRef::new("0.txt", "demo/0.txt"),
            FileRef::new("1.txt", "demo/1.txt"),
        ]
    }

    #[test]
    fn test_starts_on_input_task() {
        let wizard = wizard();
        assert_eq!(wizard.screen(), Screen::InputTask);
        assert_eq!(wizard.knowledge().len(), 1);
        assert_eq!(wizard.status(), ActionStatus::Ready);
        assert!(wizard.error().is_none());
    }

    #[test]
    fn test_show_activates_exactly_one_screen() {
        let mut wizard = wizard();
        for from in Screen::ALL {
            for to in Screen::ALL {
                wizard.show(from);
                wizard.show(to);
                let active: Vec<_> = Screen::ALL.into_iter().filter(|s| wizard.is_active(*s)).collect();
                assert_eq!(active, vec![to]);
            }
        }
    }

    #[test]
    fn test_review_clears_error_and_status() {
        let mut wizard = wizard();
        assert!(wizard.go().is_err());
        assert_eq!(wizard.status(), ActionStatus::Blocked);

        wizard.show(Screen::Review);
        assert!(wizard.error().is_none());
        assert_eq!(wizard.status(), ActionStatus::Ready);
    }

    #[test]
    fn test_causal_parameters_rebuilds_param_list() {
        let mut wizard = wizard();
        let model = wizard.knowledge_mut();
        let action = model.add_action(0);
        let param = model.add_action_parameter(0, action);
        model.set_action_parameter(0, action, param, "object", "obj");
        let custom = model.add_custom_parameter();
        model.set_custom_parameter(custom, "dest");

        assert!(wizard.param_list().is_empty());
        wizard.show(Screen::CausalParameters);
        assert_eq!(wizard.param_list(), &[vec!["obj".to_string(), "dest".to_string()]]);

        // derived state only refreshes on entry
        wizard.knowledge_mut().add_cause();
        assert_eq!(wizard.param_list().len(), 1);
        wizard.show(Screen::CausalParameters);
        assert_eq!(wizard.param_list().len(), 2);
    }

    #[test]
    fn test_go_without_recordings_stays_put() {
        let mut wizard = wizard();
        wizard.show(Screen::Review);
        let err = wizard.go().unwrap_err();
        assert!(matches!(err, WizardError::NoRecordings));
        assert_eq!(wizard.screen(), Screen::Review);
        assert!(!wizard.error().unwrap().is_empty());
        assert_eq!(wizard.status(), ActionStatus::Blocked);
    }

    #[test]
    fn test_go_with_builder_knowledge() {
        let mut wizard = wizard();
        let model = wizard.knowledge_mut();
        model.set_cause_label(0, "stack");
        model.set_relationship(0, Relationship::conditional("TYPE(obj)=block"));
        let action = model.add_action(0);
        model.set_action_label(0, action, "place");
        wizard.set_recordings(recordings());
        wizard.set_initial_state_files(vec![FileRef::new("scene", "scenes/start.xml")]);
        wizard.show(Screen::Review);

        let plan = wizard.go().unwrap();
        assert_eq!(wizard.screen(), Screen::Final);
        assert!(wizard.error().is_none());
        assert_eq!(wizard.status(), ActionStatus::Running);
        assert_eq!(
            plan.knowledge,
            KnowledgeSource::Compiled("RULES { if(TYPE(obj)=block):stack() := place() }".into())
        );
        assert_eq!(plan.recordings_path, "demo/0.txt,demo/1.txt");
        assert_eq!(plan.initial_state, "scenes/start.xml");
    }

    #[test]
    fn test_go_clears_previous_error() {
        let mut wizard = wizard();
        assert!(wizard.go().is_err());
        wizard.set_recordings(recordings());
        wizard.go().unwrap();
        assert!(wizard.error().is_none());
        assert_eq!(wizard.screen(), Screen::Final);
    }

    #[test]
    fn test_go_refused_after_final_until_start_over() {
        let mut wizard = wizard();
        wizard.set_recordings(recordings());
        wizard.go().unwrap();
        assert_eq!(wizard.screen(), Screen::Final);

        let err = wizard.go().unwrap_err();
        assert!(matches!(err, WizardError::AlreadyRun));
        assert_eq!(wizard.screen(), Screen::Final);
        assert_eq!(wizard.status(), ActionStatus::Running);

        wizard.start_over();
        wizard.set_recordings(recordings());
        assert!(wizard.go().is_ok());
    }

    #[test]
    fn test_blank_recording_paths_are_dropped() {
        let mut wizard = wizard();
        wizard.set_recordings(vec![
            FileRef::new("0", "d/0.txt"),
            FileRef::new("1", ""),
            FileRef::new("2", "d/2.txt"),
        ]);
        assert_eq!(wizard.recordings().len(), 2);
        assert_eq!(wizard.go().unwrap().recordings_path, "d/0.txt,d/2.txt");
    }

    #[test]
    fn test_only_blank_recordings_block_go() {
        let mut wizard = wizard();
        wizard.set_recordings(vec![FileRef::new("0", "  ")]);
        assert!(matches!(wizard.go(), Err(WizardError::NoRecordings)));
    }

    #[test]
    fn test_go_with_imported_knowledge_uses_path() {
        let mut wizard = wizard();
        wizard.import_knowledge(vec![FileRef::new("k", "tasks/paint_knowledge.txt")]);
        wizard.set_recordings(recordings());
        assert_eq!(wizard.intake(), IntakeMode::FileImport);

        let plan = wizard.go().unwrap();
        assert_eq!(plan.knowledge, KnowledgeSource::File("tasks/paint_knowledge.txt".into()));
        assert_eq!(plan.stage_one().args, vec!["tasks/paint_knowledge.txt", "file"]);
    }

    #[test]
    fn test_empty_import_falls_back_to_builder() {
        let mut wizard = wizard();
        wizard.import_knowledge(vec![FileRef::new("k", "k.txt")]);
        wizard.import_knowledge(Vec::new());
        assert_eq!(wizard.intake(), IntakeMode::Builder);
    }

    #[test]
    fn test_finish_run_success() {
        let mut wizard = wizard();
        wizard.set_recordings(recordings());
        wizard.go().unwrap();
        wizard.finish_run(PipelineReport {
            outputs: vec![StageOutput {
                stage: Stage::Knowledge,
                diagnostics: "compiled 1 cause\n".into(),
            }],
            error: None,
        });
        assert_eq!(wizard.status(), ActionStatus::Succeeded);
        assert_eq!(wizard.screen(), Screen::Final);
        assert!(wizard
            .log()
            .entries()
            .any(|e| e.category == LogCategory::StageOne && e.message == "compiled 1 cause"));
    }

    #[test]
    fn test_finish_run_failure_is_visible() {
        let mut wizard = wizard();
        wizard.set_recordings(recordings());
        wizard.go().unwrap();
        wizard.finish_run(PipelineReport {
            outputs: Vec::new(),
            error: Some(WizardError::Stage {
                stage: Stage::Knowledge,
                message: "exit code 1".into(),
            }),
        });
        assert_eq!(wizard.status(), ActionStatus::Failed);
        assert!(wizard.error().unwrap().contains("exit code 1"));
        assert_eq!(wizard.screen(), Screen::Final);
    }

    #[test]
    fn test_start_over_resets_everything() {
        let mut wizard = wizard();
        wizard.set_task_label("paint");
        wizard.knowledge_mut().add_cause();
        wizard.set_recordings(recordings());
        wizard.import_knowledge(vec![FileRef::new("k", "k.txt")]);
        wizard.generate_scene("block,location,0,0,0").unwrap();
        wizard.go().unwrap();

        wizard.start_over();
        assert_eq!(wizard.screen(), Screen::InputTask);
        assert_eq!(wizard.knowledge(), &KnowledgeModel::new());
        assert!(wizard.recordings().is_empty());
        assert!(wizard.knowledge_file().is_none());
        assert!(wizard.scene_xml().is_none());
        assert!(wizard.task_label().is_empty());
        assert!(wizard.error().is_none());
        assert_eq!(wizard.status(), ActionStatus::Ready);
        assert!(wizard.log().is_empty());
    }

    #[test]
    fn test_scene_error_sets_indicator() {
        let mut wizard = wizard();
        wizard.show(Screen::XmlPage);
        assert!(wizard.generate_scene("block,id,b1").is_err());
        assert!(wizard.error().is_some());
        assert_eq!(wizard.screen(), Screen::XmlPage);
    }
}
