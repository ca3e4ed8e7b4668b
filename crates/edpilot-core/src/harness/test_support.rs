use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::process;

/// Process name unique to this test binary; `tag` keeps tests apart
pub(crate) fn stray_name(tag: char) -> String {
    format!("ed{}{}", std::process::id(), tag)
}

/// Start a copy of `sleep` named `name` that outlives the test unless killed.
///
/// Blocks until the process is visible under its new name.
pub(crate) fn spawn_stray(dir: &Path, name: &str) -> Child {
    let sleep = which::which("sleep").unwrap();
    let binary = dir.join(name);
    std::fs::copy(&sleep, &binary).unwrap();

    let child = Command::new(&binary)
        .arg("30")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let start = Instant::now();
    while process::find_processes_by_name(name).is_empty() {
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "'{}' never showed up in the process table",
            name
        );
        thread::sleep(Duration::from_millis(20));
    }
    child
}

/// Whether `child` exited within `timeout` (reaping it)
pub(crate) fn exited_within(child: &mut Child, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        if let Ok(Some(_)) = child.try_wait() {
            return true;
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return false;
        }
        thread::sleep(Duration::from_millis(20));
    }
}
