use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::errors::SetupError;
use super::readiness::{self, ReadinessTiming, SignalProbe};
use super::types::{HarnessState, InteractionDelays, ReadinessSignal};
use crate::backend::{DesktopBackend, SystemBackend};
use crate::config::{HarnessConfig, defaults};
use crate::element::texts_contain;
use crate::input::{InputError, KeyCombo};
use crate::launch::{self, LaunchFailure, LaunchOptions, LaunchPaths};
use crate::process;
use crate::screenshot;
use crate::window::WindowInfo;

/// Interval between liveness checks while waiting for the process tree to exit
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Pause after the name sweep killed something
const SWEEP_SETTLE: Duration = Duration::from_secs(1);

const STDOUT_LOG: &str = "stdout.log";
const STDERR_LOG: &str = "stderr.log";

/// Drives one editor instance through a test: launch, attach, interact, close.
///
/// Interaction methods follow a bool/empty-path contract and never panic;
/// only [`Harness::send_keys`] returns an error. Dropping the harness runs
/// [`Harness::close`].
pub struct Harness<B: DesktopBackend = SystemBackend> {
    config: HarnessConfig,
    backend: B,
    executable: PathBuf,
    process_name: String,
    paths: LaunchPaths,
    screenshots_dir: PathBuf,
    logs_dir: PathBuf,
    delays: InteractionDelays,
    child: Option<Child>,
    window: Option<WindowInfo>,
    state: HarnessState,
    launched_at: Option<DateTime<Utc>>,
    last_failure: Option<LaunchFailure>,
    /// Set once a process was spawned, cleared by `close()`
    needs_cleanup: bool,
}

impl Harness<SystemBackend> {
    /// Create a harness driving the real desktop.
    ///
    /// # Errors
    ///
    /// Fails before anything is spawned if the config is invalid, the
    /// extension path does not exist, or the editor executable cannot be found.
    pub fn new(config: HarnessConfig) -> Result<Self, SetupError> {
        Self::with_backend(config, SystemBackend)
    }
}

impl<B: DesktopBackend> Harness<B> {
    pub fn with_backend(config: HarnessConfig, backend: B) -> Result<Self, SetupError> {
        config.validate()?;

        let extension = launch::resolve_extension_path(config.paths.extension_path.as_deref())?;
        let executable = launch::resolve_executable(&config.application)?;

        let process_name = config.application.process_name.clone().unwrap_or_else(|| {
            executable
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| config.application.command().to_string())
        });

        let screenshots_dir = config
            .paths
            .screenshots_dir
            .clone()
            .unwrap_or_else(|| extension.join(defaults::DEFAULT_SCREENSHOTS_DIR));
        let logs_dir = config
            .paths
            .logs_dir
            .clone()
            .unwrap_or_else(|| extension.join(defaults::DEFAULT_LOGS_DIR));

        if !launch::extension_entry_compiled(&extension) {
            warn!(
                event = "core.harness.extension_not_compiled",
                extension = %extension.display()
            );
        }

        info!(
            event = "core.harness.create_completed",
            backend = backend.name(),
            executable = %executable.display(),
            extension = %extension.display(),
            process_name = %process_name
        );

        Ok(Self {
            config,
            backend,
            executable,
            process_name,
            paths: LaunchPaths::new(extension),
            screenshots_dir,
            logs_dir,
            delays: InteractionDelays::default(),
            child: None,
            window: None,
            state: HarnessState::Unstarted,
            launched_at: None,
            last_failure: None,
            needs_cleanup: false,
        })
    }

    pub fn set_delays(&mut self, delays: InteractionDelays) {
        self.delays = delays;
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn paths(&self) -> &LaunchPaths {
        &self.paths
    }

    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    pub fn window(&self) -> Option<&WindowInfo> {
        self.window.as_ref()
    }

    /// PID of the spawned editor process, while it is owned
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    pub fn launched_at(&self) -> Option<DateTime<Utc>> {
        self.launched_at
    }

    /// Diagnostic from the most recent launch that ended with an early exit
    pub fn last_launch_failure(&self) -> Option<&LaunchFailure> {
        self.last_failure.as_ref()
    }

    /// Launch options carrying the configured defaults
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions::new(self.config.timing.launch_wait())
    }

    /// Whether the spawned root process is still alive
    pub fn is_running(&mut self) -> bool {
        child_alive(&mut self.child)
    }

    /// Launch the editor with the extension loaded in development mode.
    ///
    /// Returns true iff the process is still alive after `wait`.
    pub fn launch(&mut self, workspace: Option<&Path>, new_window: bool, wait: Duration) -> bool {
        let mut options = LaunchOptions::new(wait).with_new_window(new_window);
        if let Some(workspace) = workspace {
            options = options.with_workspace(workspace);
        }
        self.launch_with(&options)
    }

    pub fn launch_with(&mut self, options: &LaunchOptions) -> bool {
        if self.state != HarnessState::Unstarted {
            warn!(
                event = "core.harness.launch_rejected",
                state = self.state.as_str()
            );
            return false;
        }

        self.state = HarnessState::Launching;
        self.last_failure = None;

        let workspace = options
            .workspace()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.paths.default_workspace().to_path_buf());

        info!(
            event = "core.harness.launch_started",
            executable = %self.executable.display(),
            workspace = %workspace.display(),
            new_window = options.new_window(),
            wait_ms = options.wait().as_millis() as u64
        );

        let mut child = match self.spawn(&workspace, options.new_window()) {
            Ok(child) => child,
            Err(message) => {
                error!(
                    event = "core.harness.launch_failed",
                    executable = %self.executable.display(),
                    error = %message
                );
                self.state = HarnessState::Closed;
                return false;
            }
        };

        let pid = child.id();
        self.launched_at = Some(Utc::now());
        self.needs_cleanup = true;
        info!(event = "core.harness.spawn_completed", pid = pid);

        thread::sleep(options.wait());

        match child.try_wait() {
            Ok(Some(status)) => {
                let failure = LaunchFailure {
                    exit_code: status.code(),
                    stdout: read_log(&self.logs_dir.join(STDOUT_LOG)),
                    stderr: read_log(&self.logs_dir.join(STDERR_LOG)),
                };
                error!(
                    event = "core.harness.launch_exited_early",
                    pid = pid,
                    exit_code = ?failure.exit_code,
                    stdout = %failure.stdout.trim_end(),
                    stderr = %failure.stderr.trim_end()
                );
                self.last_failure = Some(failure);
                self.state = HarnessState::Closed;
                return false;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(event = "core.harness.liveness_check_failed", pid = pid, error = %e);
            }
        }

        self.child = Some(child);
        self.state = HarnessState::RunningUnattached;

        if !self.connect_to_window(self.config.timing.connect_timeout()) {
            warn!(
                event = "core.harness.attach_degraded",
                pid = pid,
                message = "Window not found, but the process is running"
            );
        }

        let alive = self.is_running();
        info!(
            event = "core.harness.launch_completed",
            pid = pid,
            alive = alive,
            state = self.state.as_str()
        );
        alive
    }

    fn spawn(&self, workspace: &Path, new_window: bool) -> Result<Child, String> {
        launch::ensure_workspace(workspace).map_err(|e| e.to_string())?;

        std::fs::create_dir_all(&self.logs_dir).map_err(|e| {
            format!(
                "Failed to create log directory '{}': {}",
                self.logs_dir.display(),
                e
            )
        })?;
        let stdout = create_log(&self.logs_dir.join(STDOUT_LOG))?;
        let stderr = create_log(&self.logs_dir.join(STDERR_LOG))?;

        let args = launch::build_launch_args(
            &self.paths,
            workspace,
            new_window,
            &self.config.application.extra_args,
        );
        debug!(event = "core.harness.spawn_args", args = ?args);

        Command::new(&self.executable)
            .args(&args)
            .current_dir(self.paths.extension())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| format!("Failed to spawn '{}': {}", self.executable.display(), e))
    }

    /// Locate the editor's top-level window. Failure is not fatal.
    pub fn connect_to_window(&mut self, timeout: Duration) -> bool {
        let root = self.pid();
        let pids = move || root.map(process::process_tree).unwrap_or_default();
        let title = self.config.application.window_title().to_string();

        match self.backend.find_window(&pids, &title, timeout) {
            Ok((window, how)) => {
                info!(
                    event = "core.harness.attach_completed",
                    title = window.title(),
                    window_id = window.id(),
                    window_pid = ?window.pid(),
                    match_type = how.as_str()
                );
                self.window = Some(window);
                if self.child.is_some() {
                    self.state = HarnessState::RunningAttached;
                }
                true
            }
            Err(e) => {
                warn!(event = "core.harness.attach_failed", title = %title, error = %e);
                false
            }
        }
    }

    /// Wait until the extension is considered loaded.
    ///
    /// Uses the configured readiness signal when there is one, otherwise the
    /// liveness heuristic. False if nothing was launched or the process died.
    pub fn wait_for_extension(&mut self, extension_name: &str, timeout: Duration) -> bool {
        if self.child.is_none() {
            warn!(
                event = "core.harness.wait_skipped",
                extension = extension_name,
                reason = "no running process"
            );
            return false;
        }

        let timing = ReadinessTiming::from(&self.config.timing);
        let signal = ReadinessSignal::from_config(&self.config.readiness, self.paths.extension());

        info!(
            event = "core.harness.wait_started",
            extension = extension_name,
            timeout_ms = timeout.as_millis() as u64,
            signal = signal.as_ref().map(ReadinessSignal::kind).unwrap_or("heuristic")
        );

        let child = &mut self.child;
        let is_alive = || child_alive(child);

        match signal {
            Some(signal) => {
                let probe = SignalProbe::new(signal, &self.logs_dir);
                readiness::wait_for_signal(
                    is_alive,
                    &probe,
                    timing.poll_interval,
                    timeout,
                    extension_name,
                )
            }
            None => readiness::wait_heuristic(is_alive, timing, timeout, extension_name),
        }
    }

    /// Wait with the configured extension timeout
    pub fn wait_for_extension_default(&mut self, extension_name: &str) -> bool {
        let timeout = self.config.timing.extension_timeout();
        self.wait_for_extension(extension_name, timeout)
    }

    pub fn open_command_palette(&mut self) -> bool {
        let combo = self.config.keys.command_palette().to_string();
        match self.send_keys(&combo) {
            Ok(()) => {
                thread::sleep(self.delays.palette);
                true
            }
            Err(e) => {
                warn!(event = "core.harness.palette_failed", keys = %combo, error = %e);
                false
            }
        }
    }

    /// Run a command through the command palette.
    ///
    /// True means every keystroke was delivered, not that the command did
    /// anything.
    pub fn run_command(&mut self, command_text: &str) -> bool {
        info!(event = "core.harness.command_started", command = command_text);

        if !self.open_command_palette() {
            return false;
        }

        thread::sleep(self.delays.before_typing);
        if let Err(e) = self.backend.type_text(command_text) {
            warn!(event = "core.harness.command_failed", command = command_text, step = "type", error = %e);
            return false;
        }

        thread::sleep(self.delays.after_typing);
        if let Err(e) = self.send_keys("enter") {
            warn!(event = "core.harness.command_failed", command = command_text, step = "enter", error = %e);
            return false;
        }

        thread::sleep(self.delays.after_enter);
        info!(event = "core.harness.command_completed", command = command_text);
        true
    }

    /// Case-insensitive search of the attached window's element texts
    pub fn find_text(&self, text: &str) -> bool {
        let Some(window) = &self.window else {
            debug!(event = "core.harness.find_text_skipped", reason = "no window attached");
            return false;
        };

        match self.backend.element_texts(window) {
            Ok(texts) => {
                let found = texts_contain(&texts, text);
                debug!(
                    event = "core.harness.find_text_completed",
                    text = text,
                    found = found,
                    element_count = texts.len()
                );
                found
            }
            Err(e) => {
                warn!(event = "core.harness.find_text_failed", text = text, error = %e);
                false
            }
        }
    }

    /// Send a key combination to the editor.
    ///
    /// Accepts `ctrl+shift+p` style as well as `^+p` / `{ENTER}`. Focuses the
    /// attached window first; without one the keys go to whatever has focus.
    pub fn send_keys(&self, keys: &str) -> Result<(), InputError> {
        let combo = KeyCombo::parse(keys)?;

        if let Some(window) = &self.window {
            self.backend.focus_window(window)?;
            thread::sleep(self.delays.focus);
        } else {
            debug!(event = "core.harness.send_keys_global", combo = %combo);
        }

        self.backend.send_keys(&combo)
    }

    /// Save a PNG of the attached window (or the primary monitor).
    ///
    /// Returns the saved path, or an empty path on failure.
    pub fn take_screenshot(&self, filename: &str) -> PathBuf {
        let image = match &self.window {
            Some(window) => self.backend.capture_window(window),
            None => self.backend.capture_screen(),
        };

        let result = image.and_then(|image| screenshot::save_png(&image, &self.screenshots_dir, filename));
        match result {
            Ok(path) => {
                info!(event = "core.harness.screenshot_completed", path = %path.display());
                path
            }
            Err(e) => {
                warn!(event = "core.harness.screenshot_failed", filename = filename, error = %e);
                PathBuf::new()
            }
        }
    }

    /// Kill every instance of the editor by process name, ignoring policy
    pub fn sweep_stragglers(&self) -> usize {
        match process::kill_processes_by_name(&self.process_name) {
            Ok(count) => {
                if count > 0 {
                    warn!(
                        event = "core.harness.sweep_escalated",
                        process_name = %self.process_name,
                        killed = count
                    );
                    thread::sleep(SWEEP_SETTLE);

                    let survivors = process::find_processes_by_name(&self.process_name);
                    if !survivors.is_empty() {
                        error!(
                            event = "core.harness.sweep_survivors",
                            process_name = %self.process_name,
                            pids = ?survivors.iter().map(|p| p.pid).collect::<Vec<_>>()
                        );
                    }
                }
                count
            }
            Err(e) => {
                warn!(event = "core.harness.sweep_failed", process_name = %self.process_name, error = %e);
                0
            }
        }
    }

    /// Shut the editor down. Safe to call in any state, any number of times.
    ///
    /// The spawned tree is stopped if there is one. Under a sweeping cleanup
    /// policy every process with the editor's name is then killed, whether or
    /// not this harness launched anything.
    pub fn close(&mut self) {
        info!(event = "core.harness.close_started", state = self.state.as_str());
        self.state = HarnessState::Closing;

        if let Some(mut child) = self.child.take() {
            self.stop_process_tree(&mut child);
        } else if self.needs_cleanup {
            debug!(event = "core.harness.close_process_gone");
        } else if self.window.is_some() {
            debug!(event = "core.harness.close_window_only");
        }

        let policy = self.config.cleanup.policy();
        if policy.sweeps_by_name() {
            self.sweep_stragglers();
        }

        self.window = None;
        self.needs_cleanup = false;
        self.state = HarnessState::Closed;
        info!(event = "core.harness.close_completed");
    }

    fn stop_process_tree(&self, child: &mut Child) {
        let root = child.id();
        let tree = process::process_tree(root);

        info!(
            event = "core.harness.terminate_started",
            pid = root,
            tree_size = tree.len()
        );

        // Children before parents so nothing gets reparented mid-walk
        for pid in tree.iter().rev() {
            if let Err(e) = process::terminate_process(*pid) {
                debug!(event = "core.harness.terminate_signal_failed", pid = pid, error = %e);
            }
        }

        if wait_for_tree_exit(child, &tree, self.config.timing.terminate_grace()) {
            info!(event = "core.harness.terminate_completed", pid = root);
            return;
        }

        warn!(event = "core.harness.kill_escalated", pid = root);
        for pid in tree.iter().rev() {
            if let Err(e) = process::kill_process(*pid) {
                debug!(event = "core.harness.kill_signal_failed", pid = pid, error = %e);
            }
        }
        let _ = child.kill();

        if wait_for_tree_exit(child, &tree, self.config.timing.kill_grace()) {
            info!(event = "core.harness.kill_completed", pid = root);
        } else {
            error!(event = "core.harness.kill_failed", pid = root);
        }
    }
}

impl<B: DesktopBackend> Drop for Harness<B> {
    fn drop(&mut self) {
        self.close();
    }
}

fn child_alive(child: &mut Option<Child>) -> bool {
    match child {
        Some(child) => match child.try_wait() {
            Ok(None) => true,
            Ok(Some(_)) => false,
            Err(_) => process::is_process_running(child.id()).unwrap_or(false),
        },
        None => false,
    }
}

/// Poll until the root (reaped through `child`) and every other tree member
/// are gone, or `grace` elapses
fn wait_for_tree_exit(child: &mut Child, tree: &[u32], grace: Duration) -> bool {
    let root = child.id();
    let start = Instant::now();
    loop {
        let root_gone = !matches!(child.try_wait(), Ok(None));
        let others_gone = tree
            .iter()
            .filter(|pid| **pid != root)
            .all(|pid| !process::is_process_running(*pid).unwrap_or(false));

        if root_gone && others_gone {
            return true;
        }
        if start.elapsed() >= grace {
            return false;
        }
        thread::sleep(EXIT_POLL_INTERVAL);
    }
}

fn create_log(path: &Path) -> Result<File, String> {
    File::create(path).map_err(|e| format!("Failed to create log '{}': {}", path.display(), e))
}

fn read_log(path: &Path) -> String {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
