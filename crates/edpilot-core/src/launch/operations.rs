use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::ApplicationConfig;
use crate::config::defaults;
use crate::launch::errors::LaunchError;
use crate::launch::types::{LaunchPaths, VersionProbe};

/// Compiled entry point the extension host loads
const EXTENSION_ENTRY: &str = "out/src/extension.js";

/// Flags that keep the editor quiet and isolated from the real user profile.
///
/// `--disable-extensions` is deliberately absent: it conflicts with
/// `--extensionDevelopmentPath`.
const ISOLATION_FLAGS: &[&str] = &[
    "--disable-gpu",
    "--disable-updates",
    "--skip-welcome",
    "--skip-release-notes",
    "--disable-telemetry",
    "--disable-workspace-trust",
];

/// Resolve the extension directory: configured path, else the current directory.
pub fn resolve_extension_path(configured: Option<&Path>) -> Result<PathBuf, LaunchError> {
    let path = match configured {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().map_err(|source| LaunchError::PrepareFailed {
            path: PathBuf::from("."),
            source,
        })?,
    };

    if !path.is_dir() {
        return Err(LaunchError::ExtensionPathNotFound { path });
    }

    Ok(path)
}

/// Resolve the editor executable.
///
/// Resolution order:
/// 1. Explicit `executable` from config (must exist, no fallback)
/// 2. `command` on PATH
/// 3. Well-known install locations
pub fn resolve_executable(app: &ApplicationConfig) -> Result<PathBuf, LaunchError> {
    if let Some(path) = &app.executable {
        if path.is_file() {
            info!(event = "core.launch.executable_resolved", source = "config", path = %path.display());
            return Ok(path.clone());
        }
        warn!(event = "core.launch.executable_missing", path = %path.display());
        return Err(LaunchError::ExecutableNotFound { path: path.clone() });
    }

    let command = app.command();
    match which::which(command) {
        Ok(path) => {
            info!(event = "core.launch.executable_resolved", source = "path", path = %path.display());
            return Ok(path);
        }
        Err(e) => {
            debug!(event = "core.launch.which_failed", command = command, error = %e);
        }
    }

    if let Some(path) = defaults::default_executable_candidates()
        .into_iter()
        .find(|p| p.is_file())
    {
        info!(event = "core.launch.executable_resolved", source = "known_location", path = %path.display());
        return Ok(path);
    }

    Err(LaunchError::CommandNotFound {
        command: command.to_string(),
    })
}

/// Build the argument list for the editor binary
pub fn build_launch_args(
    paths: &LaunchPaths,
    workspace: &Path,
    new_window: bool,
    extra_args: &[String],
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--extensionDevelopmentPath".into(),
        paths.extension().into(),
        workspace.into(),
    ];

    if new_window {
        args.push("--new-window".into());
    }

    args.extend(ISOLATION_FLAGS.iter().map(OsString::from));
    args.push("--user-data-dir".into());
    args.push(paths.user_data_dir().into());
    args.push("--extensions-dir".into());
    args.push(paths.extensions_dir().into());
    args.extend(extra_args.iter().map(OsString::from));

    args
}

/// Create the workspace directory if it does not exist yet
pub fn ensure_workspace(path: &Path) -> Result<(), LaunchError> {
    std::fs::create_dir_all(path).map_err(|source| LaunchError::PrepareFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether the extension has been compiled (its entry script exists)
pub fn extension_entry_compiled(extension: &Path) -> bool {
    extension.join(EXTENSION_ENTRY).is_file()
}

/// Run `<executable> --version` and report what it printed.
///
/// The child is killed if it outlives `timeout`.
pub fn probe_version(executable: &Path, timeout: Duration) -> Result<VersionProbe, LaunchError> {
    info!(event = "core.launch.probe_started", path = %executable.display());

    let mut child = Command::new(executable)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| LaunchError::SpawnFailed {
            path: executable.to_path_buf(),
            source,
        })?;

    // Pipes are drained while polling; a full pipe blocks the child
    let stdout_reader = child.stdout.take().map(drain_pipe);
    let stderr_reader = child.stderr.take().map(drain_pipe);

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                warn!(event = "core.launch.probe_timed_out", path = %executable.display());
                return Err(LaunchError::ProbeTimedOut {
                    path: executable.to_path_buf(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            Ok(None) => thread::sleep(Duration::from_millis(50)),
            Err(source) => {
                return Err(LaunchError::SpawnFailed {
                    path: executable.to_path_buf(),
                    source,
                });
            }
        }
    };

    let stdout_bytes = collect_pipe(stdout_reader);
    let stderr_bytes = collect_pipe(stderr_reader);

    let stdout = String::from_utf8_lossy(&stdout_bytes);
    let version = stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string);

    info!(
        event = "core.launch.probe_completed",
        exit_code = ?status.code(),
        version = ?version
    );

    Ok(VersionProbe {
        executable: executable.to_path_buf(),
        exit_code: status.code(),
        version,
        stderr: String::from_utf8_lossy(&stderr_bytes).to_string(),
    })
}

fn drain_pipe<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    })
}

fn collect_pipe(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_launch_args_order_and_flags() {
        let paths = LaunchPaths::new("/ext");
        let args = build_launch_args(&paths, Path::new("/ws"), true, &[]);
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert_eq!(args[0], "--extensionDevelopmentPath");
        assert_eq!(args[1], "/ext");
        assert_eq!(args[2], "/ws");
        assert_eq!(args[3], "--new-window");
        assert!(args.contains(&"--disable-gpu".to_string()));
        assert!(args.contains(&"--disable-workspace-trust".to_string()));
        assert!(!args.contains(&"--disable-extensions".to_string()));

        let idx = args.iter().position(|a| a == "--user-data-dir").unwrap();
        assert!(args[idx + 1].ends_with(".vscode-test-profile"));
        let idx = args.iter().position(|a| a == "--extensions-dir").unwrap();
        assert!(args[idx + 1].ends_with(".vscode-test-extensions"));
    }

    #[test]
    fn test_build_launch_args_without_new_window_and_with_extras() {
        let paths = LaunchPaths::new("/ext");
        let extras = vec!["--log".to_string(), "trace".to_string()];
        let args = build_launch_args(&paths, Path::new("/ws"), false, &extras);

        assert!(!args.iter().any(|a| a == "--new-window"));
        assert_eq!(args[args.len() - 2], "--log");
        assert_eq!(args[args.len() - 1], "trace");
    }

    #[test]
    fn test_resolve_executable_explicit_missing_path() {
        let app = ApplicationConfig {
            executable: Some(PathBuf::from("/definitely/not/here/code")),
            ..Default::default()
        };
        let err = resolve_executable(&app).unwrap_err();
        assert!(matches!(err, LaunchError::ExecutableNotFound { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_resolve_executable_explicit_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("editor");
        std::fs::write(&exe, "").unwrap();

        let app = ApplicationConfig {
            executable: Some(exe.clone()),
            ..Default::default()
        };
        assert_eq!(resolve_executable(&app).unwrap(), exe);
    }

    #[test]
    fn test_resolve_executable_unknown_command() {
        let app = ApplicationConfig {
            command: Some("edpilot-no-such-editor-xyz".to_string()),
            ..Default::default()
        };
        // Known install locations may exist on a dev machine; only assert
        // the error shape when nothing was found.
        if let Err(e) = resolve_executable(&app) {
            assert!(matches!(e, LaunchError::CommandNotFound { .. }));
        }
    }

    #[test]
    fn test_resolve_extension_path_missing() {
        let result = resolve_extension_path(Some(Path::new("/definitely/not/an/extension")));
        assert!(matches!(
            result,
            Err(LaunchError::ExtensionPathNotFound { .. })
        ));
    }

    #[test]
    fn test_extension_entry_compiled() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!extension_entry_compiled(dir.path()));

        std::fs::create_dir_all(dir.path().join("out/src")).unwrap();
        std::fs::write(dir.path().join("out/src/extension.js"), "// built").unwrap();
        assert!(extension_entry_compiled(dir.path()));
    }

    #[test]
    fn test_ensure_workspace_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let ws = dir.path().join("a/b/.test-workspace");
        ensure_workspace(&ws).unwrap();
        assert!(ws.is_dir());
        // Idempotent
        ensure_workspace(&ws).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_version_reads_first_line() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("fake-editor");
        std::fs::write(&exe, "#!/bin/sh\necho 1.2.3\necho abcdef\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe = probe_version(&exe, Duration::from_secs(5)).unwrap();
        assert_eq!(probe.exit_code, Some(0));
        assert_eq!(probe.version.as_deref(), Some("1.2.3"));
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_version_handles_output_larger_than_pipe_buffer() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("chatty-editor");
        // ~200KB on each stream, well past a 64KB pipe buffer
        std::fs::write(
            &exe,
            "#!/bin/sh\necho 9.9.9\ni=0\nwhile [ $i -lt 4000 ]; do\n  echo 'release notes line padding padding padding'\n  echo 'warning line padding padding padding padding' >&2\n  i=$((i+1))\ndone\n",
        )
        .unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe = probe_version(&exe, Duration::from_secs(10)).unwrap();
        assert_eq!(probe.exit_code, Some(0));
        assert_eq!(probe.version.as_deref(), Some("9.9.9"));
        assert!(probe.stderr.len() > 64 * 1024);
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_version_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("hanging-editor");
        std::fs::write(&exe, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let result = probe_version(&exe, Duration::from_millis(200));
        assert!(matches!(result, Err(LaunchError::ProbeTimedOut { .. })));
    }
}
