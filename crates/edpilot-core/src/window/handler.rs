use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::errors::WindowError;
use super::types::{WindowInfo, WindowMatch};

/// Interval between window enumerations while waiting
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// List all top-level windows
pub fn list_windows() -> Result<Vec<WindowInfo>, WindowError> {
    debug!(event = "core.window.list_started");

    let windows = xcap::Window::all().map_err(|e| WindowError::EnumerationFailed {
        message: e.to_string(),
    })?;

    let mut skipped_count = 0;

    let result: Vec<WindowInfo> = windows
        .into_iter()
        .filter_map(|w| {
            let id = match w.id() {
                Ok(id) => id,
                Err(e) => {
                    debug!(
                        event = "core.window.property_access_failed",
                        property = "id",
                        error = %e
                    );
                    skipped_count += 1;
                    return None;
                }
            };

            let x = get_property(id, "x", w.x(), 0);
            let y = get_property(id, "y", w.y(), 0);
            let width = get_property(id, "width", w.width(), 0);
            let height = get_property(id, "height", w.height(), 0);
            let is_minimized = get_property(id, "is_minimized", w.is_minimized(), false);
            let title = w.title().ok().unwrap_or_default();
            let app_name = w.app_name().ok().unwrap_or_default();
            let pid = w.pid().ok();

            Some(WindowInfo::new(
                id,
                title,
                app_name,
                x,
                y,
                width.max(1),
                height.max(1),
                is_minimized,
                pid,
            ))
        })
        .collect();

    if skipped_count > 0 {
        warn!(
            event = "core.window.list_incomplete",
            skipped_count = skipped_count,
            returned_count = result.len()
        );
    }

    debug!(event = "core.window.list_completed", count = result.len());
    Ok(result)
}

/// Read a window property, falling back to `default` with debug logging
fn get_property<T>(id: u32, name: &str, value: Result<T, xcap::XCapError>, default: T) -> T {
    value.unwrap_or_else(|e| {
        debug!(
            event = "core.window.property_access_failed",
            property = name,
            window_id = id,
            error = %e
        );
        default
    })
}

/// Pick the window to attach to.
///
/// Matching priority (first match at the highest level wins):
/// 1. Owned by one of `pids` and title contains `title_fragment`
/// 2. Owned by one of `pids`, any title (skipping minimized helpers)
/// 3. Title contains `title_fragment`, any owner
///
/// Within a level, the system's enumeration order decides.
pub fn select_window(
    windows: &[WindowInfo],
    pids: &[u32],
    title_fragment: &str,
) -> Option<(WindowInfo, WindowMatch)> {
    let owned = |w: &WindowInfo| w.pid().is_some_and(|pid| pids.contains(&pid));

    if let Some(w) = windows
        .iter()
        .find(|w| owned(w) && w.title_contains(title_fragment))
    {
        return Some((w.clone(), WindowMatch::PidAndTitle));
    }

    if let Some(w) = windows
        .iter()
        .find(|w| owned(w) && !w.is_minimized() && !w.title().is_empty())
    {
        return Some((w.clone(), WindowMatch::PidOnly));
    }

    windows
        .iter()
        .find(|w| w.title_contains(title_fragment))
        .map(|w| (w.clone(), WindowMatch::TitleOnly))
}

/// Find the editor window once, without waiting
pub fn find_window_for_pids(
    pids: &[u32],
    title_fragment: &str,
) -> Result<(WindowInfo, WindowMatch), WindowError> {
    let windows = list_windows()?;
    select_window(&windows, pids, title_fragment).ok_or_else(|| WindowError::WindowNotFound {
        title: title_fragment.to_string(),
        pids: pids.to_vec(),
    })
}

/// Find the editor window, polling every 100ms until found or timeout.
///
/// `pids` is re-evaluated on every poll so that helper processes spawned
/// after launch are picked up. Enumeration failures are not retried.
pub fn find_window_for_pids_with_wait<P>(
    pids: P,
    title_fragment: &str,
    timeout: Duration,
) -> Result<(WindowInfo, WindowMatch), WindowError>
where
    P: Fn() -> Vec<u32>,
{
    info!(
        event = "core.window.poll_started",
        title = title_fragment,
        timeout_ms = timeout.as_millis() as u64
    );

    let start = Instant::now();
    loop {
        match find_window_for_pids(&pids(), title_fragment) {
            Ok((window, how)) => {
                info!(
                    event = "core.window.poll_completed",
                    title = window.title(),
                    window_id = window.id(),
                    match_type = how.as_str()
                );
                return Ok((window, how));
            }
            Err(WindowError::WindowNotFound { .. }) => {
                if start.elapsed() >= timeout {
                    warn!(
                        event = "core.window.poll_timeout",
                        title = title_fragment,
                        timeout_ms = timeout.as_millis() as u64
                    );
                    return Err(WindowError::WaitTimeout {
                        title: title_fragment.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(e),
        }
    }
}
