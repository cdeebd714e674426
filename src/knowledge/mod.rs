//! Causal knowledge authored in the builder screens

pub mod indexer;
pub mod model;

pub use indexer::build_param_list;
pub use model::{
    Action, ActionParameter, BlankLabel, CausalParameter, Cause, CustomParameter, KnowledgeModel,
    Relationship, RelationshipKind,
};
