use std::ffi::OsStr;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::errors::InputError;
use super::scripts;
use super::types::KeyCombo;
use crate::window::WindowInfo;

/// Delay after focusing a window before sending events
const FOCUS_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Per-character delay for `xdotool type`
const XDOTOOL_TYPE_DELAY_MS: &str = "12";

/// The automation tool driving keyboard input on this platform
fn platform_tool() -> Result<&'static str, InputError> {
    if cfg!(target_os = "macos") {
        Ok("osascript")
    } else if cfg!(target_os = "windows") {
        Ok("powershell")
    } else if cfg!(target_os = "linux") {
        Ok("xdotool")
    } else {
        Err(InputError::UnsupportedPlatform {
            platform: std::env::consts::OS.to_string(),
        })
    }
}

/// Run an automation tool to completion, mapping failures to `InputError`
fn run_tool<I, S>(tool: &str, args: I) -> Result<(), InputError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    which::which(tool).map_err(|_| InputError::ToolUnavailable {
        tool: tool.to_string(),
    })?;

    let output = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            warn!(event = "core.input.tool_spawn_failed", tool = tool, error = %e);
            InputError::ScriptFailed {
                tool: tool.to_string(),
                message: format!("Failed to execute {}: {}", tool, e),
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            event = "core.input.tool_failed",
            tool = tool,
            exit_code = ?output.status.code(),
            stderr = %stderr.trim()
        );
        return Err(InputError::ScriptFailed {
            tool: tool.to_string(),
            message: if stderr.trim().is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            },
        });
    }

    Ok(())
}

fn run_osascript(script: &str) -> Result<(), InputError> {
    run_tool("osascript", ["-e", script])
}

fn run_powershell(script: &str) -> Result<(), InputError> {
    run_tool(
        "powershell",
        ["-NoProfile", "-NonInteractive", "-Command", script],
    )
}

/// Bring a window to the foreground
///
/// # Errors
///
/// Returns `InputError::FocusFailed` if the platform tool reports failure,
/// or `InputError::ToolUnavailable` if the tool is not installed.
pub fn focus_window(window: &WindowInfo) -> Result<(), InputError> {
    debug!(
        event = "core.input.focus_started",
        title = window.title(),
        window_id = window.id()
    );

    let tool = platform_tool()?;
    let result = match tool {
        "osascript" => run_osascript(&scripts::applescript_focus(window.app_name())),
        "powershell" => run_powershell(&scripts::powershell_focus(window.pid(), window.title())),
        _ => run_tool(
            tool,
            ["windowactivate", "--sync", window.id().to_string().as_str()],
        ),
    };

    result.map_err(|e| match e {
        InputError::ScriptFailed { message, .. } => InputError::FocusFailed {
            title: window.title().to_string(),
            reason: message,
        },
        other => other,
    })?;

    thread::sleep(FOCUS_SETTLE_DELAY);
    debug!(event = "core.input.focus_completed", window_id = window.id());
    Ok(())
}

/// Press a key combination in whatever window has keyboard focus
pub fn send_key_combo(combo: &KeyCombo) -> Result<(), InputError> {
    info!(event = "core.input.key_started", combo = %combo);

    match platform_tool()? {
        "osascript" => run_osascript(&scripts::applescript_key(combo)?)?,
        "powershell" => {
            run_powershell(&scripts::powershell_sendkeys(&scripts::sendkeys_sequence(
                combo,
            )?))?
        }
        tool => run_tool(
            tool,
            ["key", "--clearmodifiers", scripts::xdotool_key(combo).as_str()],
        )?,
    }

    info!(event = "core.input.key_completed", combo = %combo);
    Ok(())
}

/// Type literal text into whatever window has keyboard focus
pub fn type_text(text: &str) -> Result<(), InputError> {
    info!(event = "core.input.type_started", text_len = text.len());

    match platform_tool()? {
        "osascript" => run_osascript(&scripts::applescript_type(text))?,
        "powershell" => {
            run_powershell(&scripts::powershell_sendkeys(&scripts::sendkeys_text(text)))?
        }
        tool => run_tool(
            tool,
            [
                "type",
                "--clearmodifiers",
                "--delay",
                XDOTOOL_TYPE_DELAY_MS,
                "--",
                text,
            ],
        )?,
    }

    info!(event = "core.input.type_completed", text_len = text.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_tool_is_known_on_supported_platforms() {
        let tool = platform_tool();
        if cfg!(target_os = "linux") {
            assert_eq!(tool.unwrap(), "xdotool");
        } else if cfg!(target_os = "macos") {
            assert_eq!(tool.unwrap(), "osascript");
        } else if cfg!(target_os = "windows") {
            assert_eq!(tool.unwrap(), "powershell");
        }
    }

    #[test]
    fn test_run_tool_missing_binary() {
        let result = run_tool("edpilot-no-such-tool-xyz", ["--help"]);
        assert!(matches!(result, Err(InputError::ToolUnavailable { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_tool_reports_stderr_on_failure() {
        let result = run_tool("sh", ["-c", "echo boom >&2; exit 2"]);
        match result {
            Err(InputError::ScriptFailed { tool, message }) => {
                assert_eq!(tool, "sh");
                assert_eq!(message, "boom");
            }
            other => panic!("expected ScriptFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_tool_success() {
        assert!(run_tool("sh", ["-c", "exit 0"]).is_ok());
    }
}
