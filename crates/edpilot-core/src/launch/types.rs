use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Options for a single `Harness::launch_with` call
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    workspace: Option<PathBuf>,
    new_window: bool,
    wait: Duration,
}

impl LaunchOptions {
    pub fn new(wait: Duration) -> Self {
        Self {
            workspace: None,
            new_window: true,
            wait,
        }
    }

    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    pub fn with_new_window(mut self, new_window: bool) -> Self {
        self.new_window = new_window;
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn workspace(&self) -> Option<&Path> {
        self.workspace.as_deref()
    }

    pub fn new_window(&self) -> bool {
        self.new_window
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::new(Duration::from_millis(defaults::DEFAULT_LAUNCH_WAIT_MS))
    }
}

/// Directories derived from the extension path, fixed for the harness lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPaths {
    extension: PathBuf,
    user_data_dir: PathBuf,
    extensions_dir: PathBuf,
    default_workspace: PathBuf,
}

impl LaunchPaths {
    pub fn new(extension: impl Into<PathBuf>) -> Self {
        let extension = extension.into();
        Self {
            user_data_dir: extension.join(defaults::TEST_PROFILE_DIR),
            extensions_dir: extension.join(defaults::TEST_EXTENSIONS_DIR),
            default_workspace: extension.join(defaults::DEFAULT_TEST_WORKSPACE),
            extension,
        }
    }

    pub fn extension(&self) -> &Path {
        &self.extension
    }

    pub fn user_data_dir(&self) -> &Path {
        &self.user_data_dir
    }

    pub fn extensions_dir(&self) -> &Path {
        &self.extensions_dir
    }

    pub fn default_workspace(&self) -> &Path {
        &self.default_workspace
    }
}

/// Diagnostic captured when the editor exits before the launch wait ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchFailure {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl fmt::Display for LaunchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "Editor exited early with code: {}", code)?,
            None => write!(f, "Editor exited early, terminated by signal")?,
        }
        if !self.stdout.trim().is_empty() {
            write!(f, "\nStdout: {}", self.stdout.trim_end())?;
        }
        if !self.stderr.trim().is_empty() {
            write!(f, "\nStderr: {}", self.stderr.trim_end())?;
        }
        Ok(())
    }
}

/// Result of running the editor with `--version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionProbe {
    pub executable: PathBuf,
    pub exit_code: Option<i32>,
    pub version: Option<String>,
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_defaults() {
        let options = LaunchOptions::default();
        assert!(options.workspace().is_none());
        assert!(options.new_window());
        assert_eq!(options.wait(), Duration::from_secs(10));
    }

    #[test]
    fn test_launch_options_builder() {
        let options = LaunchOptions::new(Duration::from_millis(250))
            .with_workspace("/tmp/ws")
            .with_new_window(false);
        assert_eq!(options.workspace(), Some(Path::new("/tmp/ws")));
        assert!(!options.new_window());
        assert_eq!(options.wait(), Duration::from_millis(250));

        let options = options.with_wait(Duration::from_secs(2));
        assert_eq!(options.wait(), Duration::from_secs(2));
    }

    #[test]
    fn test_launch_paths_are_isolated_under_extension() {
        let paths = LaunchPaths::new("/work/ext");
        assert_eq!(
            paths.user_data_dir(),
            Path::new("/work/ext/.vscode-test-profile")
        );
        assert_eq!(
            paths.extensions_dir(),
            Path::new("/work/ext/.vscode-test-extensions")
        );
        assert_eq!(
            paths.default_workspace(),
            Path::new("/work/ext/.test-workspace")
        );
    }

    #[test]
    fn test_launch_failure_display_includes_exit_code() {
        let failure = LaunchFailure {
            exit_code: Some(3),
            stdout: String::new(),
            stderr: "bad flag\n".to_string(),
        };
        let text = failure.to_string();
        assert!(text.contains("code: 3"));
        assert!(text.contains("Stderr: bad flag"));
        assert!(!text.contains("Stdout"));
    }

    #[test]
    fn test_launch_failure_display_signal() {
        let failure = LaunchFailure {
            exit_code: None,
            stdout: "partial".to_string(),
            stderr: String::new(),
        };
        let text = failure.to_string();
        assert!(text.contains("signal"));
        assert!(text.contains("Stdout: partial"));
    }
}
