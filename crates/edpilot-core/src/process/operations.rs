use std::collections::{HashSet, VecDeque};

use sysinfo::{Pid as SysinfoPid, Process, ProcessesToUpdate, Signal, System};
use tracing::{debug, info, warn};

use crate::process::errors::ProcessError;
use crate::process::types::{ProcessInfo, ProcessStatus};

/// Minimum length required for prefix matching to prevent false positives
/// with short names like "sh", "vi", "go"
const MIN_PREFIX_MATCH_LENGTH: usize = 5;

fn refreshed_system(pids: Option<&[SysinfoPid]>) -> System {
    let mut system = System::new();
    match pids {
        Some(pids) => system.refresh_processes(ProcessesToUpdate::Some(pids), true),
        None => system.refresh_processes(ProcessesToUpdate::All, true),
    };
    system
}

fn to_info(pid: SysinfoPid, process: &Process) -> ProcessInfo {
    ProcessInfo {
        pid: pid.as_u32(),
        parent_pid: process.parent().map(|p| p.as_u32()),
        name: process.name().to_string_lossy().to_string(),
        status: ProcessStatus::from(process.status()),
    }
}

/// Check if a process with the given PID is currently running.
///
/// Zombie entries count as not running.
pub fn is_process_running(pid: u32) -> Result<bool, ProcessError> {
    let pid_obj = SysinfoPid::from_u32(pid);
    let system = refreshed_system(Some(&[pid_obj]));
    Ok(system
        .process(pid_obj)
        .is_some_and(|p| ProcessStatus::from(p.status()).is_alive()))
}

/// Collect `root` and all of its descendants, parents before children.
///
/// Returns an empty list if `root` is not running.
pub fn process_tree(root: u32) -> Vec<u32> {
    let system = refreshed_system(None);
    let root_pid = SysinfoPid::from_u32(root);
    if system.process(root_pid).is_none() {
        return Vec::new();
    }

    let mut tree = vec![root];
    let mut seen: HashSet<u32> = HashSet::from([root]);
    let mut queue = VecDeque::from([root_pid]);

    while let Some(parent) = queue.pop_front() {
        for (pid, process) in system.processes() {
            if process.parent() == Some(parent) && seen.insert(pid.as_u32()) {
                tree.push(pid.as_u32());
                queue.push_back(*pid);
            }
        }
    }

    debug!(
        event = "core.process.tree_collected",
        root = root,
        count = tree.len()
    );
    tree
}

/// Ask a process to exit.
///
/// Sends SIGTERM where the platform supports it and falls back to a hard
/// kill where it does not (Windows).
pub fn terminate_process(pid: u32) -> Result<(), ProcessError> {
    let pid_obj = SysinfoPid::from_u32(pid);
    let system = refreshed_system(Some(&[pid_obj]));
    let process = system
        .process(pid_obj)
        .ok_or(ProcessError::NotFound { pid })?;

    match process.kill_with(Signal::Term) {
        Some(true) => Ok(()),
        Some(false) => Err(ProcessError::SignalFailed {
            pid,
            message: "terminate signal was not delivered".to_string(),
        }),
        None => {
            debug!(event = "core.process.term_unsupported", pid = pid);
            if process.kill() {
                Ok(())
            } else {
                Err(ProcessError::KillFailed {
                    pid,
                    message: "Process kill signal failed".to_string(),
                })
            }
        }
    }
}

/// Forcefully kill a process
pub fn kill_process(pid: u32) -> Result<(), ProcessError> {
    let pid_obj = SysinfoPid::from_u32(pid);
    let system = refreshed_system(Some(&[pid_obj]));

    match system.process(pid_obj) {
        Some(process) => {
            if process.kill() {
                Ok(())
            } else {
                Err(ProcessError::KillFailed {
                    pid,
                    message: "Process kill signal failed".to_string(),
                })
            }
        }
        None => Err(ProcessError::NotFound { pid }),
    }
}

/// Extract the base name from a path, handling both Unix (/) and Windows (\) separators
fn extract_base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Suffixes of Windows executables and the PATH launcher shims that start them
const EXECUTABLE_SUFFIXES: &[&str] = &[".exe", ".cmd", ".bat"];

/// Lowercase base name with any executable or launcher suffix removed
fn normalize_name(name: &str) -> String {
    let base = extract_base_name(name).to_lowercase();
    EXECUTABLE_SUFFIXES
        .iter()
        .find_map(|suffix| base.strip_suffix(suffix))
        .map(str::to_string)
        .unwrap_or(base)
}

/// Check if a process name matches an expected executable name
///
/// 1. Base name match, case-insensitive, ignoring `.exe`, `.cmd` and `.bat`
/// 2. Prefix match only for names >= 5 characters (Linux truncates
///    process names, and "sh" must never match "bash")
pub fn process_name_matches(actual_name: &str, expected_name: &str) -> bool {
    let actual = normalize_name(actual_name);
    let expected = normalize_name(expected_name);

    if actual.is_empty() || expected.is_empty() {
        return false;
    }

    if actual == expected {
        return true;
    }

    if expected.len() >= MIN_PREFIX_MATCH_LENGTH && actual.starts_with(&expected) {
        return true;
    }

    // Truncated comm names: actual is a long-enough prefix of expected
    actual.len() >= 15 && expected.starts_with(&actual)
}

fn process_matches(process: &Process, expected_name: &str) -> bool {
    if process_name_matches(&process.name().to_string_lossy(), expected_name) {
        return true;
    }
    process
        .exe()
        .and_then(|exe| exe.file_name())
        .is_some_and(|file| process_name_matches(&file.to_string_lossy(), expected_name))
}

/// Find all live processes whose name matches `name`
pub fn find_processes_by_name(name: &str) -> Vec<ProcessInfo> {
    let system = refreshed_system(None);
    system
        .processes()
        .iter()
        .filter(|(_, process)| process_matches(process, name))
        .map(|(pid, process)| to_info(*pid, process))
        .filter(|info| info.status.is_alive())
        .collect()
}

/// Forcefully kill every process whose name matches `name`.
///
/// The current process is never killed. Returns the number of processes
/// the kill signal was delivered to.
pub fn kill_processes_by_name(name: &str) -> Result<usize, ProcessError> {
    if name.trim().is_empty() {
        return Err(ProcessError::EmptyProcessName);
    }

    info!(event = "core.process.sweep_started", name = name);

    let own_pid = std::process::id();
    let system = refreshed_system(None);
    let mut killed = 0;

    for (pid, process) in system.processes() {
        if pid.as_u32() == own_pid || !process_matches(process, name) {
            continue;
        }
        if !ProcessStatus::from(process.status()).is_alive() {
            continue;
        }
        if process.kill() {
            killed += 1;
        } else {
            warn!(
                event = "core.process.sweep_kill_failed",
                pid = pid.as_u32(),
                name = name
            );
        }
    }

    info!(
        event = "core.process.sweep_completed",
        name = name,
        killed = killed
    );
    Ok(killed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};
    use std::time::Duration;

    #[test]
    fn test_is_process_running_with_invalid_pid() {
        let result = is_process_running(999999);
        assert!(result.is_ok());
        assert!(!result.unwrap());
    }

    #[test]
    fn test_kill_process_with_invalid_pid() {
        let result = kill_process(999999);
        assert!(matches!(
            result,
            Err(ProcessError::NotFound { pid: 999999 })
        ));
    }

    #[test]
    fn test_process_tree_of_missing_root_is_empty() {
        assert!(process_tree(999999).is_empty());
    }

    #[test]
    fn test_process_tree_contains_own_process() {
        let own = std::process::id();
        let tree = process_tree(own);
        assert_eq!(tree.first(), Some(&own));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_lifecycle() {
        let mut child = Command::new("sleep")
            .arg("10")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn test process");

        let pid = child.id();

        assert!(is_process_running(pid).expect("Failed to check process"));

        terminate_process(pid).expect("terminate should deliver SIGTERM");
        let status = child.wait().expect("child should be reaped");
        assert!(!status.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_tree_includes_children() {
        let mut child = Command::new("sh")
            .args(["-c", "sleep 10 & wait"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn test process");

        std::thread::sleep(Duration::from_millis(300));

        let tree = process_tree(child.id());
        assert_eq!(tree[0], child.id());
        assert!(tree.len() >= 2, "expected sh and its sleep child: {:?}", tree);

        for pid in tree.iter().rev() {
            let _ = kill_process(*pid);
        }
        let _ = child.wait();
    }

    #[test]
    fn test_kill_processes_by_name_rejects_empty_name() {
        assert!(matches!(
            kill_processes_by_name("  "),
            Err(ProcessError::EmptyProcessName)
        ));
    }

    #[test]
    fn test_kill_processes_by_name_no_match() {
        let killed = kill_processes_by_name("edpilot-nonexistent-process-xyz").unwrap();
        assert_eq!(killed, 0);
    }

    #[test]
    fn test_find_processes_by_name_not_found() {
        assert!(find_processes_by_name("edpilot-nonexistent-process-xyz").is_empty());
    }

    #[test]
    fn test_process_name_matches() {
        assert!(process_name_matches("code", "code"));
        assert!(process_name_matches("Code.exe", "code"));
        assert!(process_name_matches("code", "Code.exe"));
        assert!(process_name_matches("/usr/share/code/code", "code"));
        assert!(process_name_matches(
            "C:\\Program Files\\Microsoft VS Code\\Code.exe",
            "Code.exe"
        ));

        // Prefix match for long names
        assert!(process_name_matches("code-insiders", "code-"));
        assert!(process_name_matches("electron-helper", "electron"));

        assert!(!process_name_matches("vim", "code"));
    }

    #[test]
    fn test_process_name_matches_launcher_shim() {
        // `which code` on Windows resolves to the code.cmd shim
        assert!(process_name_matches("Code.exe", "code.cmd"));
        assert!(process_name_matches("Code.exe", "C:\\Tools\\bin\\code.bat"));
        assert_eq!(normalize_name("C:\\VS Code\\bin\\code.cmd"), "code");
        assert!(!process_name_matches("Code.exe", "codium.cmd"));
    }

    #[test]
    fn test_process_name_matches_security() {
        assert!(!process_name_matches("bash", "sh"));
        assert!(!process_name_matches("vim", "vi"));
        // "code" is 4 chars, below the prefix threshold
        assert!(!process_name_matches("codex", "code"));
        assert!(!process_name_matches("", "code"));
        assert!(!process_name_matches("code", ""));
    }

    #[test]
    fn test_process_name_matches_truncated_comm() {
        // Linux truncates comm to 15 bytes
        assert!(process_name_matches(
            "very-long-edito",
            "very-long-editor-binary"
        ));
        assert!(!process_name_matches("short", "shortened-name"));
    }

    #[test]
    fn test_extract_base_name() {
        assert_eq!(extract_base_name("/usr/bin/sleep"), "sleep");
        assert_eq!(
            extract_base_name("C:\\Program Files\\app\\test.exe"),
            "test.exe"
        );
        assert_eq!(extract_base_name("simple"), "simple");
        assert_eq!(extract_base_name(""), "");
    }
}
