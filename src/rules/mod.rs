//! RULES-language output for authored knowledge

pub mod compiler;
pub mod persist;

pub use compiler::compile;
pub use persist::{knowledge_file_name, save_knowledge, save_scene, scene_file_name};
