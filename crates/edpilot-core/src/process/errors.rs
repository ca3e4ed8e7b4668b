use crate::errors::HarnessError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Process '{pid}' not found")]
    NotFound { pid: u32 },

    #[error("Failed to kill process '{pid}': {message}")]
    KillFailed { pid: u32, message: String },

    #[error("Failed to signal process '{pid}': {message}")]
    SignalFailed { pid: u32, message: String },

    #[error("Refusing to sweep processes with an empty name")]
    EmptyProcessName,
}

impl HarnessError for ProcessError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessError::NotFound { .. } => "PROCESS_NOT_FOUND",
            ProcessError::KillFailed { .. } => "PROCESS_KILL_FAILED",
            ProcessError::SignalFailed { .. } => "PROCESS_SIGNAL_FAILED",
            ProcessError::EmptyProcessName => "PROCESS_EMPTY_NAME",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ProcessError::NotFound { .. } | ProcessError::EmptyProcessName
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = ProcessError::NotFound { pid: 42 };
        assert_eq!(error.to_string(), "Process '42' not found");
        assert_eq!(error.error_code(), "PROCESS_NOT_FOUND");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_kill_failed_error() {
        let error = ProcessError::KillFailed {
            pid: 7,
            message: "denied".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to kill process '7': denied");
        assert!(!error.is_user_error());
    }
}
