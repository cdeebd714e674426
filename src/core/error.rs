use thiserror::Error;

use crate::execution::port::Stage;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Select at least one recording before running")]
    NoRecordings,

    #[error("This session has already run; start over to run again")]
    AlreadyRun,

    #[error("{stage} failed: {message}")]
    Stage { stage: Stage, message: String },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Scene error: {0}")]
    Scene(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WizardError>;
