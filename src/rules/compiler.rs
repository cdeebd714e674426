//! Serialize knowledge into the RULES language
//!
//! ```text
//! RULES { [if(<condition>):]<head>(<params>) := <action>(<values>),... ;... }
//! ```
//!
//! The compiler does no validation: labels are emitted as written, and an
//! empty list renders as `()`.

use crate::knowledge::model::{Action, Cause};

const OPEN: &str = "RULES { ";
const CLOSE: &str = " }";
const CLAUSE_SEPARATOR: &str = ";";

/// Compile causes into rule-language text
pub fn compile(knowledge: &[Cause]) -> String {
    let clauses: Vec<String> = knowledge.iter().map(compile_clause).collect();
    format!("{OPEN}{}{CLOSE}", clauses.join(CLAUSE_SEPARATOR))
}

fn compile_clause(cause: &Cause) -> String {
    let guard = if cause.relationship.is_conditional() {
        format!("if({}):", cause.relationship.condition)
    } else {
        String::new()
    };
    let params: Vec<&str> = cause.parameters.iter().map(|p| p.name.as_str()).collect();
    let actions: Vec<String> = cause.actions.iter().map(compile_action).collect();

    format!(
        "{guard}{}({}) := {}",
        cause.label,
        params.join(","),
        actions.join(",")
    )
}

fn compile_action(action: &Action) -> String {
    let values: Vec<&str> = action.parameters.iter().map(|p| p.value.as_str()).collect();
    format!("{}({})", action.label, values.join(","))
}
