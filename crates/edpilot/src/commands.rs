use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info, warn};

use edpilot_core::config::HarnessConfig;
use edpilot_core::errors::ConfigError;
use edpilot_core::events;
use edpilot_core::launch::{
    extension_entry_compiled, probe_version, resolve_executable, resolve_extension_path,
};
use edpilot_core::process::{ProcessInfo, find_processes_by_name, kill_processes_by_name};
use edpilot_core::{CleanupPolicy, Harness};

/// How long `cleanup` waits for killed processes to disappear
const CLEANUP_SETTLE: Duration = Duration::from_secs(2);

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    match matches.subcommand() {
        Some(("probe", sub_matches)) => handle_probe_command(matches, sub_matches),
        Some(("session", sub_matches)) => handle_session_command(matches, sub_matches),
        Some(("cleanup", sub_matches)) => handle_cleanup_command(matches, sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

/// Load the config hierarchy and apply the global CLI overrides on top
fn load_config(matches: &ArgMatches) -> Result<HarnessConfig, ConfigError> {
    let mut config = match HarnessConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            error!(event = "cli.config_load_failed", error = %e);
            events::log_app_error(&e);
            return Err(e);
        }
    };

    if let Some(executable) = matches.get_one::<String>("executable") {
        config.application.executable = Some(PathBuf::from(executable));
    }
    if let Some(extension) = matches.get_one::<String>("extension") {
        config.paths.extension_path = Some(PathBuf::from(extension));
    }

    Ok(config)
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    executable: PathBuf,
    version: Option<String>,
    exit_code: Option<i32>,
    extension_path: Option<PathBuf>,
    extension_compiled: bool,
    checked_at: DateTime<Utc>,
}

fn handle_probe_command(
    global: &ArgMatches,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let timeout_secs = matches.get_one::<u64>("timeout").copied().unwrap_or(10);

    info!(
        event = "cli.probe_started",
        json_output = json_output,
        timeout_secs = timeout_secs
    );

    let config = load_config(global)?;

    let executable = match resolve_executable(&config.application) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Editor not found: {}", e);
            error!(event = "cli.probe_failed", error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    let probe = match probe_version(&executable, Duration::from_secs(timeout_secs)) {
        Ok(probe) => probe,
        Err(e) => {
            eprintln!("Failed to run '{}': {}", executable.display(), e);
            error!(event = "cli.probe_failed", error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    // A missing extension directory does not fail the probe
    let extension_path = resolve_extension_path(config.paths.extension_path.as_deref()).ok();
    let extension_compiled = extension_path
        .as_deref()
        .is_some_and(extension_entry_compiled);

    let report = ProbeReport {
        executable: probe.executable.clone(),
        version: probe.version.clone(),
        exit_code: probe.exit_code,
        extension_path,
        extension_compiled,
        checked_at: Utc::now(),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_probe_report(&report);
    }

    info!(
        event = "cli.probe_completed",
        version = ?report.version,
        exit_code = ?report.exit_code
    );

    if report.exit_code != Some(0) {
        warn!(event = "cli.probe_nonzero_exit", exit_code = ?report.exit_code);
        if !probe.stderr.trim().is_empty() {
            eprintln!("{}", probe.stderr.trim_end());
        }
        return Err(format!("'{}' --version did not exit cleanly", executable.display()).into());
    }

    Ok(())
}

fn print_probe_report(report: &ProbeReport) {
    println!("Executable: {}", report.executable.display());
    println!(
        "Version:    {}",
        report.version.as_deref().unwrap_or("(no output)")
    );
    match &report.extension_path {
        Some(path) => {
            let status = if report.extension_compiled {
                "compiled"
            } else {
                "not compiled"
            };
            println!("Extension:  {} ({})", path.display(), status);
        }
        None => println!("Extension:  (not found)"),
    }
}

fn handle_session_command(
    global: &ArgMatches,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = matches.get_one::<String>("workspace").map(PathBuf::from);
    let wait_secs = matches.get_one::<u64>("wait-secs").copied();
    let reuse_window = matches.get_flag("reuse-window");
    let wait_extension = matches.get_one::<String>("wait-extension");
    let commands: Vec<&String> = matches
        .get_many::<String>("command")
        .map(|values| values.collect())
        .unwrap_or_default();
    let find = matches.get_one::<String>("find");
    let screenshot = matches.get_one::<String>("screenshot");

    info!(
        event = "cli.session_started",
        workspace = ?workspace,
        wait_secs = ?wait_secs,
        commands = commands.len()
    );

    let mut config = load_config(global)?;
    if matches.get_flag("no-sweep") {
        config.cleanup.policy = Some(CleanupPolicy::ProcessTree);
    }

    let mut harness = match Harness::new(config) {
        Ok(harness) => harness,
        Err(e) => {
            eprintln!("Failed to set up editor: {}", e);
            error!(event = "cli.session_failed", error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    let mut options = harness.launch_options().with_new_window(!reuse_window);
    if let Some(dir) = &workspace {
        options = options.with_workspace(dir);
    }
    if let Some(secs) = wait_secs {
        options = options.with_wait(Duration::from_secs(secs));
    }

    if !harness.launch_with(&options) {
        match harness.last_launch_failure() {
            Some(failure) => eprintln!("{}", failure),
            None => eprintln!("Failed to launch '{}'", harness.executable().display()),
        }
        error!(event = "cli.session_failed", stage = "launch");
        harness.close();
        return Err("Editor failed to launch".into());
    }

    match harness.window() {
        Some(window) => println!(
            "Editor running (pid {:?}, window '{}')",
            harness.pid(),
            window.title()
        ),
        None => println!(
            "Editor running (pid {:?}, no window attached; input goes to the focused window)",
            harness.pid()
        ),
    }

    let mut failures: Vec<String> = Vec::new();

    if let Some(name) = wait_extension {
        if harness.wait_for_extension_default(name) {
            println!("Extension '{}' ready", name);
        } else {
            failures.push(format!("extension '{}' did not become ready", name));
        }
    }

    for command in &commands {
        if harness.run_command(command) {
            println!("Ran command: {}", command);
        } else {
            failures.push(format!("command '{}' failed", command));
        }
    }

    if let Some(text) = find {
        if harness.find_text(text) {
            println!("Found text: {}", text);
        } else {
            failures.push(format!("text '{}' not found", text));
        }
    }

    if let Some(filename) = screenshot {
        let path = harness.take_screenshot(filename);
        if path.as_os_str().is_empty() {
            failures.push(format!("screenshot '{}' failed", filename));
        } else {
            println!("Screenshot saved: {}", path.display());
        }
    }

    harness.close();
    events::log_app_shutdown();

    if failures.is_empty() {
        info!(event = "cli.session_completed");
        Ok(())
    } else {
        for failure in &failures {
            eprintln!("Session step failed: {}", failure);
        }
        error!(event = "cli.session_failed", failures = failures.len());
        Err(format!("{} session step(s) failed", failures.len()).into())
    }
}

fn handle_cleanup_command(
    global: &ArgMatches,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let explicit = matches.get_one::<String>("process-name");

    info!(event = "cli.cleanup_started", process_name = ?explicit);

    let config = load_config(global)?;
    let name = match explicit {
        Some(name) => name.clone(),
        None => default_process_name(&config),
    };

    match kill_processes_by_name(&name) {
        Ok(count) => {
            println!("Killed {} '{}' process(es)", count, name);
            info!(event = "cli.cleanup_completed", process_name = %name, killed = count);

            let survivors = wait_for_exit_by_name(&name, CLEANUP_SETTLE);
            if survivors.is_empty() {
                return Ok(());
            }
            for survivor in &survivors {
                eprintln!("Still running: {} (pid {})", survivor.name, survivor.pid);
            }
            error!(event = "cli.cleanup_survivors", count = survivors.len());
            Err(format!("{} '{}' process(es) survived cleanup", survivors.len(), name).into())
        }
        Err(e) => {
            eprintln!("Cleanup failed: {}", e);
            error!(event = "cli.cleanup_failed", error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

/// Poll until nothing matches `name` or `timeout` passes; returns what is left
fn wait_for_exit_by_name(name: &str, timeout: Duration) -> Vec<ProcessInfo> {
    let start = Instant::now();
    loop {
        let remaining = find_processes_by_name(name);
        if remaining.is_empty() || start.elapsed() >= timeout {
            return remaining;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

/// Configured process name, else the resolved executable's file name, else
/// the bare command.
fn default_process_name(config: &HarnessConfig) -> String {
    if let Some(name) = &config.application.process_name {
        return name.clone();
    }

    resolve_executable(&config.application)
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| config.application.command().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_process_name_prefers_config() {
        let mut config = HarnessConfig::default();
        config.application.process_name = Some("Code Helper".to_string());
        assert_eq!(default_process_name(&config), "Code Helper");
    }

    #[test]
    fn test_default_process_name_falls_back_to_command() {
        let mut config = HarnessConfig::default();
        config.application.command = Some("edpilot-test-no-such-editor".to_string());

        let installed = edpilot_core::config::defaults::default_executable_candidates()
            .iter()
            .any(|p| p.is_file());
        if !installed {
            assert_eq!(default_process_name(&config), "edpilot-test-no-such-editor");
        }
    }

    #[test]
    fn test_default_process_name_uses_executable_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("my-editor");
        std::fs::write(&exe, "").unwrap();

        let mut config = HarnessConfig::default();
        config.application.executable = Some(exe);
        assert_eq!(default_process_name(&config), "my-editor");
    }

    #[test]
    fn test_probe_report_serializes_timestamp() {
        let report = ProbeReport {
            executable: PathBuf::from("/usr/bin/code"),
            version: Some("1.90.0".to_string()),
            exit_code: Some(0),
            extension_path: None,
            extension_compiled: false,
            checked_at: Utc::now(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["version"], "1.90.0");
        assert!(json["checked_at"].is_string());
        assert!(json["extension_path"].is_null());
    }
}
