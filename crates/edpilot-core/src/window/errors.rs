use crate::errors::HarnessError;

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Failed to enumerate windows: {message}")]
    EnumerationFailed { message: String },

    #[error("No window titled '*{title}*' found for processes {pids:?}")]
    WindowNotFound { title: String, pids: Vec<u32> },

    #[error("Window '*{title}*' not found after {timeout_ms}ms")]
    WaitTimeout { title: String, timeout_ms: u64 },
}

impl HarnessError for WindowError {
    fn error_code(&self) -> &'static str {
        match self {
            WindowError::EnumerationFailed { .. } => "WINDOW_ENUMERATION_FAILED",
            WindowError::WindowNotFound { .. } => "WINDOW_NOT_FOUND",
            WindowError::WaitTimeout { .. } => "WINDOW_WAIT_TIMEOUT",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            WindowError::WindowNotFound { .. } | WindowError::WaitTimeout { .. }
        )
    }
}
