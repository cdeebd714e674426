//! Causal knowledge tree and its tail-only editing operations
//!
//! Every ordered collection here grows at the tail and shrinks from the tail.
//! Indices handed out by the wizard stay valid for as long as the element
//! exists because nothing is ever inserted or removed in the middle.

use serde::{Deserialize, Serialize};

/// Whether a cause fires unconditionally or behind a guard expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipKind {
    #[default]
    Direct,
    Conditional,
}

impl RelationshipKind {
    /// Read the kind chosen in the relationship screen
    ///
    /// Anything other than "conditional" counts as direct, including an
    /// unset selection.
    pub fn parse(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("conditional") {
            Self::Conditional
        } else {
            Self::Direct
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub kind: RelationshipKind,
    /// Opaque guard expression, only read when `kind` is conditional
    #[serde(default)]
    pub condition: String,
}

impl Relationship {
    pub fn direct() -> Self {
        Self::default()
    }

    pub fn conditional(condition: impl Into<String>) -> Self {
        Self {
            kind: RelationshipKind::Conditional,
            condition: condition.into(),
        }
    }

    pub fn is_conditional(&self) -> bool {
        self.kind == RelationshipKind::Conditional
    }
}

/// Formal parameter of a cause head
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalParameter {
    pub name: String,
}

/// Argument of an action call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameter {
    #[serde(default)]
    pub kind: String,
    /// Token emitted verbatim in the compiled call
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub label: String,
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,
}

/// One rule head with its guard, formal parameters and produced actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    pub label: String,
    #[serde(default)]
    pub relationship: Relationship,
    #[serde(default)]
    pub parameters: Vec<CausalParameter>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Extra parameter name offered to every cause's picker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomParameter {
    pub value: String,
}

/// A label left empty in the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankLabel {
    Cause(usize),
    Action { cause: usize, action: usize },
}

/// The knowledge being authored: causes plus the global custom-parameter pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeModel {
    #[serde(default)]
    causes: Vec<Cause>,
    #[serde(default)]
    custom_parameters: Vec<CustomParameter>,
}

impl Default for KnowledgeModel {
    fn default() -> Self {
        Self::new()
    }
}

#[track_caller]
fn invalid_index(what: &str, index: usize, len: usize) -> ! {
    panic!("InvalidIndex: {what} index {index} out of range (len {len})")
}

impl KnowledgeModel {
    /// Fresh session state: a single placeholder cause
    pub fn new() -> Self {
        Self {
            causes: vec![Cause::default()],
            custom_parameters: Vec::new(),
        }
    }

    pub fn causes(&self) -> &[Cause] {
        &self.causes
    }

    pub fn custom_parameters(&self) -> &[CustomParameter] {
        &self.custom_parameters
    }

    pub fn len(&self) -> usize {
        self.causes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    // === CAUSES ===

    /// Append a placeholder cause, returning its index
    pub fn add_cause(&mut self) -> usize {
        self.causes.push(Cause::default());
        tracing::debug!("Added cause #{}", self.causes.len() - 1);
        self.causes.len() - 1
    }

    /// Remove the most recently added cause
    ///
    /// The session's first cause is the root placeholder and is never
    /// removed, so this is a no-op while only one cause remains.
    pub fn remove_cause(&mut self) -> Option<Cause> {
        if self.causes.len() <= 1 {
            return None;
        }
        let removed = self.causes.pop();
        tracing::debug!("Removed cause #{}", self.causes.len());
        removed
    }

    #[track_caller]
    pub fn cause(&self, cause: usize) -> &Cause {
        self.causes
            .get(cause)
            .unwrap_or_else(|| invalid_index("cause", cause, self.causes.len()))
    }

    #[track_caller]
    pub fn cause_mut(&mut self, cause: usize) -> &mut Cause {
        let len = self.causes.len();
        self.causes
            .get_mut(cause)
            .unwrap_or_else(|| invalid_index("cause", cause, len))
    }

    pub fn set_cause_label(&mut self, cause: usize, label: impl Into<String>) {
        self.cause_mut(cause).label = label.into();
    }

    pub fn set_relationship(&mut self, cause: usize, relationship: Relationship) {
        self.cause_mut(cause).relationship = relationship;
    }

    // === ACTIONS ===

    pub fn add_action(&mut self, cause: usize) -> usize {
        let actions = &mut self.cause_mut(cause).actions;
        actions.push(Action::default());
        actions.len() - 1
    }

    pub fn remove_action(&mut self, cause: usize) -> Option<Action> {
        self.cause_mut(cause).actions.pop()
    }

    #[track_caller]
    pub fn action_mut(&mut self, cause: usize, action: usize) -> &mut Action {
        let actions = &mut self.cause_mut(cause).actions;
        let len = actions.len();
        actions
            .get_mut(action)
            .unwrap_or_else(|| invalid_index("action", action, len))
    }

    pub fn set_action_label(&mut self, cause: usize, action: usize, label: impl Into<String>) {
        self.action_mut(cause, action).label = label.into();
    }

    // === CAUSAL PARAMETERS ===

    pub fn add_causal_parameter(&mut self, cause: usize) -> usize {
        let parameters = &mut self.cause_mut(cause).parameters;
        parameters.push(CausalParameter::default());
        parameters.len() - 1
    }

    pub fn remove_causal_parameter(&mut self, cause: usize) -> Option<CausalParameter> {
        self.cause_mut(cause).parameters.pop()
    }

    #[track_caller]
    pub fn causal_parameter_mut(&mut self, cause: usize, parameter: usize) -> &mut CausalParameter {
        let parameters = &mut self.cause_mut(cause).parameters;
        let len = parameters.len();
        parameters
            .get_mut(parameter)
            .unwrap_or_else(|| invalid_index("causal parameter", parameter, len))
    }

    pub fn set_causal_parameter(&mut self, cause: usize, parameter: usize, name: impl Into<String>) {
        self.causal_parameter_mut(cause, parameter).name = name.into();
    }

    // === ACTION PARAMETERS ===

    pub fn add_action_parameter(&mut self, cause: usize, action: usize) -> usize {
        let parameters = &mut self.action_mut(cause, action).parameters;
        parameters.push(ActionParameter::default());
        parameters.len() - 1
    }

    pub fn remove_action_parameter(&mut self, cause: usize, action: usize) -> Option<ActionParameter> {
        self.action_mut(cause, action).parameters.pop()
    }

    #[track_caller]
    pub fn action_parameter_mut(
        &mut self,
        cause: usize,
        action: usize,
        parameter: usize,
    ) -> &mut ActionParameter {
        let parameters = &mut self.action_mut(cause, action).parameters;
        let len = parameters.len();
        parameters
            .get_mut(parameter)
            .unwrap_or_else(|| invalid_index("action parameter", parameter, len))
    }

    pub fn set_action_parameter(
        &mut self,
        cause: usize,
        action: usize,
        parameter: usize,
        kind: impl Into<String>,
        value: impl Into<String>,
    ) {
        let slot = self.action_parameter_mut(cause, action, parameter);
        slot.kind = kind.into();
        slot.value = value.into();
    }

    // === CUSTOM PARAMETERS ===

    pub fn add_custom_parameter(&mut self) -> usize {
        self.custom_parameters.push(CustomParameter::default());
        self.custom_parameters.len() - 1
    }

    pub fn remove_custom_parameter(&mut self) -> Option<CustomParameter> {
        self.custom_parameters.pop()
    }

    #[track_caller]
    pub fn custom_parameter_mut(&mut self, parameter: usize) -> &mut CustomParameter {
        let len = self.custom_parameters.len();
        self.custom_parameters
            .get_mut(parameter)
            .unwrap_or_else(|| invalid_index("custom parameter", parameter, len))
    }

    pub fn set_custom_parameter(&mut self, parameter: usize, value: impl Into<String>) {
        self.custom_parameter_mut(parameter).value = value.into();
    }

    /// Causes and actions whose label is still empty
    pub fn blank_labels(&self) -> Vec<BlankLabel> {
        let mut blanks = Vec::new();
        for (i, cause) in self.causes.iter().enumerate() {
            if cause.label.trim().is_empty() {
                blanks.push(BlankLabel::Cause(i));
            }
            for (j, action) in cause.actions.iter().enumerate() {
                if action.label.trim().is_empty() {
                    blanks.push(BlankLabel::Action { cause: i, action: j });
                }
            }
        }
        blanks
    }

    /// Read a knowledge snapshot previously written with `to_json`
    ///
    /// A snapshot without causes gets the placeholder cause back.
    pub fn from_json(content: &str) -> crate::core::error::Result<Self> {
        let mut model: Self = serde_json::from_str(content)?;
        if model.causes.is_empty() {
            tracing::warn!("Knowledge snapshot has no causes, adding placeholder");
            model.causes.push(Cause::default());
        }
        Ok(model)
    }

    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
