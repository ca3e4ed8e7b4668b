//! Built-in fallback values for every optional config field.

/// Editor command looked up on PATH when no executable is configured
pub const DEFAULT_COMMAND: &str = "code";

/// Title fragment identifying the editor's top-level window
pub const DEFAULT_WINDOW_TITLE: &str = "Visual Studio Code";

/// Key combination that opens the editor's command palette
#[cfg(target_os = "macos")]
pub const DEFAULT_COMMAND_PALETTE_KEYS: &str = "cmd+shift+p";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_COMMAND_PALETTE_KEYS: &str = "ctrl+shift+p";

pub const DEFAULT_LAUNCH_WAIT_MS: u64 = 10_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_STABILIZE_MS: u64 = 5_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_READY_THRESHOLD_MS: u64 = 10_000;
pub const DEFAULT_EXTENSION_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_TERMINATE_GRACE_MS: u64 = 3_000;
pub const DEFAULT_KILL_GRACE_MS: u64 = 2_000;

/// Directory (relative to the extension path) holding screenshots
pub const DEFAULT_SCREENSHOTS_DIR: &str = "test/e2e/screenshots";

/// Directory (relative to the extension path) holding captured process output
pub const DEFAULT_LOGS_DIR: &str = ".test-harness/logs";

/// Workspace opened when the caller does not supply one
pub const DEFAULT_TEST_WORKSPACE: &str = ".test-workspace";

/// Isolated profile directories so the run never touches the real user profile
pub const TEST_PROFILE_DIR: &str = ".vscode-test-profile";
pub const TEST_EXTENSIONS_DIR: &str = ".vscode-test-extensions";

/// Well-known install locations checked after the PATH lookup fails
pub fn default_executable_candidates() -> Vec<std::path::PathBuf> {
    let mut candidates = Vec::new();

    if cfg!(target_os = "windows") {
        if let Some(local) = dirs::data_local_dir() {
            candidates.push(local.join("Programs/Microsoft VS Code/Code.exe"));
            candidates.push(local.join("Programs/Microsoft VS Code Insiders/Code - Insiders.exe"));
        }
        candidates.push("C:\\Program Files\\Microsoft VS Code\\Code.exe".into());
        candidates.push("C:\\Program Files (x86)\\Microsoft VS Code\\Code.exe".into());
    } else if cfg!(target_os = "macos") {
        candidates.push("/Applications/Visual Studio Code.app/Contents/MacOS/Electron".into());
        if let Some(home) = dirs::home_dir() {
            candidates
                .push(home.join("Applications/Visual Studio Code.app/Contents/MacOS/Electron"));
        }
    } else {
        candidates.push("/usr/share/code/code".into());
        candidates.push("/usr/bin/code".into());
        candidates.push("/snap/bin/code".into());
    }

    candidates
}
