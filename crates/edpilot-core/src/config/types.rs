//! Configuration type definitions for edpilot.
//!
//! These types are deserialized from TOML config files. Every field is
//! optional on disk; accessors fall back to the values in [`super::defaults`].
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! executable = "/usr/share/code/code"
//! window_title = "Visual Studio Code"
//! extra_args = ["--verbose"]
//!
//! [paths]
//! extension_path = "/home/me/src/my-extension"
//!
//! [timing]
//! launch_wait_ms = 10000
//! poll_interval_ms = 2000
//!
//! [cleanup]
//! policy = "process_tree_then_name"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Main configuration loaded from TOML config files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarnessConfig {
    /// The editor application under test
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Filesystem locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Sleeps, poll intervals and timeouts
    #[serde(default)]
    pub timing: TimingConfig,

    /// Explicit readiness signal for `wait_for_extension`
    #[serde(default)]
    pub readiness: ReadinessConfig,

    /// What `close()` is allowed to kill
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Key bindings of the editor
    #[serde(default)]
    pub keys: KeysConfig,
}

/// The editor application under test.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplicationConfig {
    /// Explicit path to the editor executable. Must exist when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,

    /// Command name looked up on PATH when no executable is set.
    /// Default: "code".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Process name used by the cleanup sweep.
    /// Default: file name of the resolved executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,

    /// Title fragment identifying the editor window.
    /// Default: "Visual Studio Code".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_title: Option<String>,

    /// Extra arguments appended to the launch command line.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl ApplicationConfig {
    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or(defaults::DEFAULT_COMMAND)
    }

    pub fn window_title(&self) -> &str {
        self.window_title
            .as_deref()
            .unwrap_or(defaults::DEFAULT_WINDOW_TITLE)
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    /// Extension under development. Default: current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_path: Option<PathBuf>,

    /// Screenshot output directory.
    /// Default: `<extension_path>/test/e2e/screenshots`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots_dir: Option<PathBuf>,

    /// Captured stdout/stderr directory.
    /// Default: `<extension_path>/.test-harness/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_dir: Option<PathBuf>,
}

/// Sleeps, poll intervals and timeouts, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimingConfig {
    /// Fixed wait after spawning before the liveness check. Default: 10000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_wait_ms: Option<u64>,

    /// Window attach timeout. Default: 30000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,

    /// Initial sleep in `wait_for_extension`. Default: 5000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stabilize_ms: Option<u64>,

    /// Poll interval in `wait_for_extension`. Default: 2000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,

    /// Elapsed time after which a live process counts as ready. Default: 10000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_threshold_ms: Option<u64>,

    /// Default timeout for `wait_for_extension`. Default: 30000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_timeout_ms: Option<u64>,

    /// Wait after the terminate signal before escalating. Default: 3000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminate_grace_ms: Option<u64>,

    /// Wait after the kill signal. Default: 2000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_grace_ms: Option<u64>,
}

impl TimingConfig {
    pub fn launch_wait(&self) -> Duration {
        ms(self.launch_wait_ms, defaults::DEFAULT_LAUNCH_WAIT_MS)
    }

    pub fn connect_timeout(&self) -> Duration {
        ms(self.connect_timeout_ms, defaults::DEFAULT_CONNECT_TIMEOUT_MS)
    }

    pub fn stabilize(&self) -> Duration {
        ms(self.stabilize_ms, defaults::DEFAULT_STABILIZE_MS)
    }

    pub fn poll_interval(&self) -> Duration {
        ms(self.poll_interval_ms, defaults::DEFAULT_POLL_INTERVAL_MS)
    }

    pub fn ready_threshold(&self) -> Duration {
        ms(self.ready_threshold_ms, defaults::DEFAULT_READY_THRESHOLD_MS)
    }

    pub fn extension_timeout(&self) -> Duration {
        ms(
            self.extension_timeout_ms,
            defaults::DEFAULT_EXTENSION_TIMEOUT_MS,
        )
    }

    pub fn terminate_grace(&self) -> Duration {
        ms(self.terminate_grace_ms, defaults::DEFAULT_TERMINATE_GRACE_MS)
    }

    pub fn kill_grace(&self) -> Duration {
        ms(self.kill_grace_ms, defaults::DEFAULT_KILL_GRACE_MS)
    }
}

fn ms(value: Option<u64>, default: u64) -> Duration {
    Duration::from_millis(value.unwrap_or(default))
}

/// Explicit readiness signal.
///
/// When neither field is set, `wait_for_extension` uses the elapsed-time
/// heuristic.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReadinessConfig {
    /// File whose appearance marks the extension as loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_file: Option<PathBuf>,

    /// Substring that marks readiness once it shows up in captured output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_line: Option<String>,
}

/// Cleanup scope for `close()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Kill only the process tree this harness spawned.
    ProcessTree,
    /// Kill the spawned tree, then every process sharing the executable name.
    #[default]
    ProcessTreeThenName,
}

impl CleanupPolicy {
    pub fn sweeps_by_name(&self) -> bool {
        matches!(self, CleanupPolicy::ProcessTreeThenName)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CleanupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<CleanupPolicy>,
}

impl CleanupConfig {
    pub fn policy(&self) -> CleanupPolicy {
        self.policy.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeysConfig {
    /// Default: "ctrl+shift+p" ("cmd+shift+p" on macOS).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_palette: Option<String>,
}

impl KeysConfig {
    pub fn command_palette(&self) -> &str {
        self.command_palette
            .as_deref()
            .unwrap_or(defaults::DEFAULT_COMMAND_PALETTE_KEYS)
    }
}
