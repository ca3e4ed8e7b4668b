use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ReadinessConfig;

/// Lifecycle of a single harness run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarnessState {
    Unstarted,
    Launching,
    /// Process alive and its window located
    RunningAttached,
    /// Process alive, window not located (degraded mode)
    RunningUnattached,
    Closing,
    Closed,
}

impl HarnessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HarnessState::Unstarted => "unstarted",
            HarnessState::Launching => "launching",
            HarnessState::RunningAttached => "running_attached",
            HarnessState::RunningUnattached => "running_unattached",
            HarnessState::Closing => "closing",
            HarnessState::Closed => "closed",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self,
            HarnessState::RunningAttached | HarnessState::RunningUnattached
        )
    }
}

impl fmt::Display for HarnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable evidence that the extension has finished loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessSignal {
    /// A file that the extension creates on activation
    MarkerFile(PathBuf),
    /// A substring that shows up in the editor's captured stdout or stderr
    LogLine(String),
}

impl ReadinessSignal {
    /// Build the configured signal, if any.
    ///
    /// A relative marker path is resolved against `extension`. When both
    /// fields are set the marker file wins.
    pub fn from_config(config: &ReadinessConfig, extension: &Path) -> Option<Self> {
        if let Some(marker) = &config.marker_file {
            let path = if marker.is_absolute() {
                marker.clone()
            } else {
                extension.join(marker)
            };
            return Some(ReadinessSignal::MarkerFile(path));
        }
        config
            .log_line
            .as_ref()
            .map(|line| ReadinessSignal::LogLine(line.clone()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReadinessSignal::MarkerFile(_) => "marker_file",
            ReadinessSignal::LogLine(_) => "log_line",
        }
    }
}

/// Pauses between UI interactions, giving the editor time to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionDelays {
    /// After focusing the window, before sending keys
    pub focus: Duration,
    /// After opening the command palette
    pub palette: Duration,
    /// Between the palette opening and typing the command
    pub before_typing: Duration,
    /// Between typing the command and pressing Enter
    pub after_typing: Duration,
    /// After pressing Enter
    pub after_enter: Duration,
}

impl InteractionDelays {
    /// No pauses at all
    pub fn none() -> Self {
        Self {
            focus: Duration::ZERO,
            palette: Duration::ZERO,
            before_typing: Duration::ZERO,
            after_typing: Duration::ZERO,
            after_enter: Duration::ZERO,
        }
    }
}

impl Default for InteractionDelays {
    fn default() -> Self {
        Self {
            focus: Duration::from_millis(200),
            palette: Duration::from_secs(1),
            before_typing: Duration::from_millis(500),
            after_typing: Duration::from_secs(1),
            after_enter: Duration::from_secs(2),
        }
    }
}
