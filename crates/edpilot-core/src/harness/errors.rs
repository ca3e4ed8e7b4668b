use std::path::PathBuf;

use crate::errors::{ConfigError, HarnessError};
use crate::launch::LaunchError;

/// Errors raised while constructing a harness, before anything is spawned
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

impl HarnessError for SetupError {
    fn error_code(&self) -> &'static str {
        match self {
            SetupError::Config(e) => e.error_code(),
            SetupError::Launch(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            SetupError::Config(e) => e.is_user_error(),
            SetupError::Launch(e) => e.is_user_error(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("Failed to prepare workspace '{}': {source}", path.display())]
    WorkspaceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Editor launch failed for '{name}': {reason}")]
    LaunchFailed { name: String, reason: String },
}

impl HarnessError for FixtureError {
    fn error_code(&self) -> &'static str {
        match self {
            FixtureError::Setup(e) => e.error_code(),
            FixtureError::WorkspaceFailed { .. } => "FIXTURE_WORKSPACE_FAILED",
            FixtureError::LaunchFailed { .. } => "FIXTURE_LAUNCH_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            FixtureError::Setup(e) => e.is_user_error(),
            _ => false,
        }
    }
}
