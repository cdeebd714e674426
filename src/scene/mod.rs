//! Initial-state scenes for the imitation stage

pub mod tabletop;

pub use tabletop::{generate, TABLETOP_NAMESPACE};
