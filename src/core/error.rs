use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("failed to persist stage record {path}")]
    Persist {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl GuardError {
    /// True for failures of the stage-record write path, the one condition
    /// the hook surfaces as a hard error.
    pub fn is_persist(&self) -> bool {
        matches!(self, GuardError::Persist { .. })
    }
}
