use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::types::ReadinessSignal;
use crate::config::TimingConfig;

/// Knobs of the readiness poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessTiming {
    pub stabilize: Duration,
    pub poll_interval: Duration,
    pub ready_threshold: Duration,
}

impl From<&TimingConfig> for ReadinessTiming {
    fn from(timing: &TimingConfig) -> Self {
        Self {
            stabilize: timing.stabilize(),
            poll_interval: timing.poll_interval(),
            ready_threshold: timing.ready_threshold(),
        }
    }
}

/// Checks a readiness signal against the filesystem
pub(crate) struct SignalProbe {
    signal: ReadinessSignal,
    log_files: Vec<PathBuf>,
}

impl SignalProbe {
    pub(crate) fn new(signal: ReadinessSignal, logs_dir: &Path) -> Self {
        Self {
            signal,
            log_files: vec![logs_dir.join("stdout.log"), logs_dir.join("stderr.log")],
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.signal.kind()
    }

    pub(crate) fn observed(&self) -> bool {
        match &self.signal {
            ReadinessSignal::MarkerFile(path) => path.exists(),
            ReadinessSignal::LogLine(needle) => self.log_files.iter().any(|file| {
                std::fs::read(file)
                    .map(|bytes| String::from_utf8_lossy(&bytes).contains(needle.as_str()))
                    .unwrap_or(false)
            }),
        }
    }
}

/// Heuristic readiness: the process surviving past `ready_threshold`.
///
/// Sleeps `stabilize` first and gives up early if the process died during
/// it. Reaching `timeout` with the process alive still counts as ready.
pub(crate) fn wait_heuristic<A>(
    mut is_alive: A,
    timing: ReadinessTiming,
    timeout: Duration,
    extension_name: &str,
) -> bool
where
    A: FnMut() -> bool,
{
    let start = Instant::now();

    debug!(
        event = "core.readiness.stabilize_started",
        stabilize_ms = timing.stabilize.as_millis() as u64
    );
    thread::sleep(timing.stabilize);

    if !is_alive() {
        warn!(
            event = "core.readiness.process_exited",
            extension = extension_name,
            phase = "stabilize"
        );
        return false;
    }

    while start.elapsed() < timeout {
        if !is_alive() {
            warn!(
                event = "core.readiness.process_exited",
                extension = extension_name,
                phase = "poll"
            );
            return false;
        }

        let elapsed = start.elapsed();
        debug!(
            event = "core.readiness.poll_alive",
            elapsed_ms = elapsed.as_millis() as u64
        );
        if elapsed > timing.ready_threshold {
            info!(
                event = "core.readiness.assumed_ready",
                extension = extension_name,
                elapsed_ms = elapsed.as_millis() as u64
            );
            return true;
        }

        thread::sleep(timing.poll_interval);
    }

    warn!(
        event = "core.readiness.timeout_alive",
        extension = extension_name,
        timeout_ms = timeout.as_millis() as u64
    );
    true
}

/// Signal-based readiness: true as soon as the signal is observed,
/// false if the process dies or `timeout` passes first.
pub(crate) fn wait_for_signal<A>(
    mut is_alive: A,
    probe: &SignalProbe,
    poll_interval: Duration,
    timeout: Duration,
    extension_name: &str,
) -> bool
where
    A: FnMut() -> bool,
{
    let start = Instant::now();

    loop {
        if probe.observed() {
            info!(
                event = "core.readiness.signal_observed",
                extension = extension_name,
                signal = probe.kind(),
                elapsed_ms = start.elapsed().as_millis() as u64
            );
            return true;
        }

        if !is_alive() {
            warn!(
                event = "core.readiness.process_exited",
                extension = extension_name,
                phase = "signal"
            );
            return false;
        }

        if start.elapsed() >= timeout {
            warn!(
                event = "core.readiness.signal_timeout",
                extension = extension_name,
                signal = probe.kind(),
                timeout_ms = timeout.as_millis() as u64
            );
            return false;
        }

        thread::sleep(poll_interval.min(timeout.saturating_sub(start.elapsed())));
    }
}
