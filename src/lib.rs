//! Causal Wizard - guided authoring of causal knowledge for imitation learning

pub mod core;
pub mod execution;
pub mod knowledge;
pub mod rules;
pub mod scene;
pub mod ui;
pub mod wizard;
