use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use super::errors::ElementError;
use crate::window::WindowInfo;

/// Collect the visible text of every descendant element of a window.
///
/// Text includes element names, values and descriptions, one entry per
/// non-empty string.
///
/// # Errors
///
/// Returns `ElementError::UnsupportedPlatform` on Linux, where no element
/// query tool is wired up, and `ElementError::QueryFailed` when the platform
/// tool fails.
pub fn element_texts(window: &WindowInfo) -> Result<Vec<String>, ElementError> {
    info!(
        event = "core.element.query_started",
        title = window.title(),
        window_id = window.id()
    );

    let stdout = if cfg!(target_os = "macos") {
        run_query("osascript", &["-e", macos_query_script(window).as_str()])?
    } else if cfg!(target_os = "windows") {
        let pid = window.pid().ok_or(ElementError::NoPidAvailable)?;
        run_query(
            "powershell",
            &[
                "-NoProfile",
                "-NonInteractive",
                "-Command",
                windows_query_script(pid).as_str(),
            ],
        )?
    } else {
        return Err(ElementError::UnsupportedPlatform {
            platform: std::env::consts::OS.to_string(),
        });
    };

    let texts = parse_query_output(&stdout);
    info!(event = "core.element.query_completed", count = texts.len());
    Ok(texts)
}

/// Case-insensitive substring match against any collected text
pub fn texts_contain(texts: &[String], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    texts.iter().any(|t| t.to_lowercase().contains(&needle))
}

fn run_query(tool: &str, args: &[&str]) -> Result<String, ElementError> {
    which::which(tool).map_err(|_| ElementError::ToolUnavailable {
        tool: tool.to_string(),
    })?;

    let output = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ElementError::QueryFailed {
            reason: format!("Failed to execute {}: {}", tool, e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            event = "core.element.query_failed",
            tool = tool,
            stderr = %stderr.trim()
        );
        return Err(ElementError::QueryFailed {
            reason: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_query_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "missing value")
        .map(str::to_string)
        .collect()
}

/// AppleScript walking the front window of the owning process
fn macos_query_script(window: &WindowInfo) -> String {
    let process = match window.pid() {
        Some(pid) => format!("first process whose unix id is {}", pid),
        None => format!(
            "process \"{}\"",
            window.app_name().replace('\\', "\\\\").replace('"', "\\\"")
        ),
    };
    debug!(event = "core.element.script_built", target = %process);

    format!(
        r#"set out to {{}}
tell application "System Events"
    tell ({process})
        repeat with e in (entire contents of front window)
            try
                set end of out to (name of e as text)
            end try
            try
                set end of out to (value of e as text)
            end try
            try
                set end of out to (description of e as text)
            end try
        end repeat
    end tell
end tell
set AppleScript's text item delimiters to linefeed
return out as text"#
    )
}

/// PowerShell UI Automation walk of every top-level window owned by `pid`
fn windows_query_script(pid: u32) -> String {
    format!(
        r#"[Console]::OutputEncoding = [System.Text.Encoding]::UTF8
Add-Type -AssemblyName UIAutomationClient
Add-Type -AssemblyName UIAutomationTypes
$ae = [System.Windows.Automation.AutomationElement]
$cond = New-Object System.Windows.Automation.PropertyCondition($ae::ProcessIdProperty, {pid})
$windows = $ae::RootElement.FindAll([System.Windows.Automation.TreeScope]::Children, $cond)
foreach ($w in $windows) {{
    $all = $w.FindAll([System.Windows.Automation.TreeScope]::Descendants, [System.Windows.Automation.Condition]::TrueCondition)
    foreach ($e in $all) {{
        $name = $e.Current.Name
        if ($name) {{ Write-Output $name }}
    }}
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(pid: Option<u32>) -> WindowInfo {
        WindowInfo::new(
            7,
            "ws - Visual Studio Code".to_string(),
            "Code".to_string(),
            0,
            0,
            800,
            600,
            false,
            pid,
        )
    }

    #[test]
    fn test_texts_contain_is_case_insensitive() {
        let texts = vec!["Explorer".to_string(), "Hello World".to_string()];
        assert!(texts_contain(&texts, "hello"));
        assert!(texts_contain(&texts, "EXPLORER"));
        assert!(!texts_contain(&texts, "Terminal"));
        assert!(!texts_contain(&[], "anything"));
    }

    #[test]
    fn test_parse_query_output_drops_blanks() {
        let texts = parse_query_output("Explorer\n\n  \nmissing value\n  Outline  \r\n");
        assert_eq!(texts, vec!["Explorer".to_string(), "Outline".to_string()]);
    }

    #[test]
    fn test_macos_script_targets_pid_when_known() {
        let script = macos_query_script(&window(Some(4242)));
        assert!(script.contains("first process whose unix id is 4242"));
        assert!(script.contains("entire contents of front window"));

        let script = macos_query_script(&window(None));
        assert!(script.contains("process \"Code\""));
    }

    #[test]
    fn test_windows_script_filters_by_pid() {
        let script = windows_query_script(99);
        assert!(script.contains("ProcessIdProperty, 99)"));
        assert!(script.contains("TreeScope]::Descendants"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_element_texts_unsupported_on_linux() {
        let result = element_texts(&window(Some(1)));
        assert!(matches!(
            result,
            Err(ElementError::UnsupportedPlatform { .. })
        ));
    }
}
