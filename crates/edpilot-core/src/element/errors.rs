use crate::errors::HarnessError;

#[derive(Debug, thiserror::Error)]
pub enum ElementError {
    #[error("Window has no PID available (required for element queries)")]
    NoPidAvailable,

    #[error("'{tool}' is required for element queries but was not found on PATH")]
    ToolUnavailable { tool: String },

    #[error("Element query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Element queries are not supported on {platform}")]
    UnsupportedPlatform { platform: String },
}

impl HarnessError for ElementError {
    fn error_code(&self) -> &'static str {
        match self {
            ElementError::NoPidAvailable => "ELEMENT_NO_PID",
            ElementError::ToolUnavailable { .. } => "ELEMENT_TOOL_UNAVAILABLE",
            ElementError::QueryFailed { .. } => "ELEMENT_QUERY_FAILED",
            ElementError::UnsupportedPlatform { .. } => "ELEMENT_UNSUPPORTED_PLATFORM",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ElementError::ToolUnavailable { .. } | ElementError::UnsupportedPlatform { .. }
        )
    }
}
