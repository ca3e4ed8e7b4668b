use std::path::PathBuf;

use crate::errors::HarnessError;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Editor executable not found at '{}'", path.display())]
    ExecutableNotFound { path: PathBuf },

    #[error(
        "Editor executable not found: '{command}' is not on PATH and no known install location exists"
    )]
    CommandNotFound { command: String },

    #[error("Extension path not found: '{}'", path.display())]
    ExtensionPathNotFound { path: PathBuf },

    #[error("Failed to prepare '{}': {source}", path.display())]
    PrepareFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn '{}': {source}", path.display())]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' did not exit within {timeout_ms}ms", path.display())]
    ProbeTimedOut { path: PathBuf, timeout_ms: u64 },
}

impl HarnessError for LaunchError {
    fn error_code(&self) -> &'static str {
        match self {
            LaunchError::ExecutableNotFound { .. } => "LAUNCH_EXECUTABLE_NOT_FOUND",
            LaunchError::CommandNotFound { .. } => "LAUNCH_COMMAND_NOT_FOUND",
            LaunchError::ExtensionPathNotFound { .. } => "LAUNCH_EXTENSION_PATH_NOT_FOUND",
            LaunchError::PrepareFailed { .. } => "LAUNCH_PREPARE_FAILED",
            LaunchError::SpawnFailed { .. } => "LAUNCH_SPAWN_FAILED",
            LaunchError::ProbeTimedOut { .. } => "LAUNCH_PROBE_TIMED_OUT",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            LaunchError::ExecutableNotFound { .. }
                | LaunchError::CommandNotFound { .. }
                | LaunchError::ExtensionPathNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_executable_not_found_error() {
        let error = LaunchError::ExecutableNotFound {
            path: PathBuf::from("/nope/code"),
        };
        assert_eq!(
            error.to_string(),
            "Editor executable not found at '/nope/code'"
        );
        assert_eq!(error.error_code(), "LAUNCH_EXECUTABLE_NOT_FOUND");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_command_not_found_error() {
        let error = LaunchError::CommandNotFound {
            command: "code".to_string(),
        };
        assert!(error.to_string().contains("not found"));
        assert!(error.is_user_error());
    }

    #[test]
    fn test_spawn_failed_has_source() {
        let error = LaunchError::SpawnFailed {
            path: PathBuf::from("/bin/editor"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(error.source().is_some());
        assert_eq!(error.error_code(), "LAUNCH_SPAWN_FAILED");
        assert!(!error.is_user_error());
    }
}
