//! Per-cause parameter picker lists

use crate::knowledge::model::{Cause, CustomParameter};
use std::collections::HashSet;

/// Build the values offered when wiring each cause's formal parameters
///
/// One list per cause, in cause order: every action-parameter value of the
/// cause in traversal order, then the custom pool, with later duplicates
/// dropped.
pub fn build_param_list(knowledge: &[Cause], custom_params: &[CustomParameter]) -> Vec<Vec<String>> {
    knowledge
        .iter()
        .map(|cause| cause_params(cause, custom_params))
        .collect()
}

fn cause_params(cause: &Cause, custom_params: &[CustomParameter]) -> Vec<String> {
    let action_values = cause
        .actions
        .iter()
        .flat_map(|action| action.parameters.iter())
        .map(|param| param.value.as_str());
    let custom_values = custom_params.iter().map(|param| param.value.as_str());

    let mut seen = HashSet::new();
    action_values
        .chain(custom_values)
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}
