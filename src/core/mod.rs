pub mod config;
pub mod error;
pub mod types;

pub use config::{CommandSpec, WizardConfig};
pub use error::{Result, WizardError};
pub use types::{ActionStatus, FileRef, IntakeMode};
