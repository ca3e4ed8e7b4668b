use crate::errors::HarnessError;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Invalid key combination '{combo}': {reason}")]
    InvalidKeyCombo { combo: String, reason: String },

    #[error("Unknown key name: '{name}'")]
    UnknownKey { name: String },

    #[error("Key '{key}' cannot be sent with {tool}")]
    UnsupportedKey { key: String, tool: String },

    #[error("'{tool}' is required for keyboard input but was not found on PATH")]
    ToolUnavailable { tool: String },

    #[error("{tool} failed: {message}")]
    ScriptFailed { tool: String, message: String },

    #[error("Failed to focus window '{title}': {reason}")]
    FocusFailed { title: String, reason: String },

    #[error("Keyboard input is not supported on {platform}")]
    UnsupportedPlatform { platform: String },
}

impl HarnessError for InputError {
    fn error_code(&self) -> &'static str {
        match self {
            InputError::InvalidKeyCombo { .. } => "INPUT_INVALID_KEY_COMBO",
            InputError::UnknownKey { .. } => "INPUT_UNKNOWN_KEY",
            InputError::UnsupportedKey { .. } => "INPUT_UNSUPPORTED_KEY",
            InputError::ToolUnavailable { .. } => "INPUT_TOOL_UNAVAILABLE",
            InputError::ScriptFailed { .. } => "INPUT_SCRIPT_FAILED",
            InputError::FocusFailed { .. } => "INPUT_FOCUS_FAILED",
            InputError::UnsupportedPlatform { .. } => "INPUT_UNSUPPORTED_PLATFORM",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            InputError::InvalidKeyCombo { .. }
                | InputError::UnknownKey { .. }
                | InputError::UnsupportedKey { .. }
                | InputError::ToolUnavailable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_combo_error() {
        let error = InputError::InvalidKeyCombo {
            combo: "ctrl+".to_string(),
            reason: "missing key".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid key combination 'ctrl+': missing key"
        );
        assert_eq!(error.error_code(), "INPUT_INVALID_KEY_COMBO");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_tool_unavailable_error() {
        let error = InputError::ToolUnavailable {
            tool: "xdotool".to_string(),
        };
        assert!(error.to_string().contains("xdotool"));
        assert!(error.is_user_error());
    }

    #[test]
    fn test_script_failed_is_not_user_error() {
        let error = InputError::ScriptFailed {
            tool: "osascript".to_string(),
            message: "execution error".to_string(),
        };
        assert_eq!(error.to_string(), "osascript failed: execution error");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InputError>();
    }
}
