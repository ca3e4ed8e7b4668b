use std::path::PathBuf;

use crate::errors::HarnessError;

#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("Window {id} not found for capture")]
    WindowNotFound { id: u32 },

    #[error("No primary monitor found")]
    NoPrimaryMonitor,

    #[error("Screen capture failed: {message}")]
    CaptureFailed { message: String },

    #[error("Invalid screenshot filename: '{filename}'")]
    InvalidFilename { filename: String },

    #[error("Failed to create screenshot directory '{}': {source}", path.display())]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save screenshot to '{}': {message}", path.display())]
    SaveFailed { path: PathBuf, message: String },
}

impl HarnessError for ScreenshotError {
    fn error_code(&self) -> &'static str {
        match self {
            ScreenshotError::WindowNotFound { .. } => "SCREENSHOT_WINDOW_NOT_FOUND",
            ScreenshotError::NoPrimaryMonitor => "SCREENSHOT_NO_PRIMARY_MONITOR",
            ScreenshotError::CaptureFailed { .. } => "SCREENSHOT_CAPTURE_FAILED",
            ScreenshotError::InvalidFilename { .. } => "SCREENSHOT_INVALID_FILENAME",
            ScreenshotError::DirectoryCreateFailed { .. } => "SCREENSHOT_DIRECTORY_CREATE_FAILED",
            ScreenshotError::SaveFailed { .. } => "SCREENSHOT_SAVE_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ScreenshotError::InvalidFilename { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_window_not_found_error() {
        let error = ScreenshotError::WindowNotFound { id: 12 };
        assert_eq!(error.to_string(), "Window 12 not found for capture");
        assert_eq!(error.error_code(), "SCREENSHOT_WINDOW_NOT_FOUND");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_directory_create_failed_has_source() {
        let error = ScreenshotError::DirectoryCreateFailed {
            path: PathBuf::from("/ro/shots"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(error.source().is_some());
        assert!(error.to_string().contains("/ro/shots"));
    }
}
