//! Desktop backend trait definition.

use std::time::Duration;

use image::RgbaImage;

use crate::element::ElementError;
use crate::input::{InputError, KeyCombo};
use crate::screenshot::ScreenshotError;
use crate::window::{WindowError, WindowInfo, WindowMatch};

/// Trait defining the desktop operations the harness needs.
///
/// Keyboard operations act on whichever window currently has focus; callers
/// focus the target first with [`DesktopBackend::focus_window`].
pub trait DesktopBackend: Send + Sync {
    /// Short name used in logs (e.g., "system").
    fn name(&self) -> &'static str;

    /// Locate the editor window, polling until `timeout`.
    ///
    /// `pids` is called on every poll and returns the current process tree.
    fn find_window(
        &self,
        pids: &dyn Fn() -> Vec<u32>,
        title_fragment: &str,
        timeout: Duration,
    ) -> Result<(WindowInfo, WindowMatch), WindowError>;

    fn focus_window(&self, window: &WindowInfo) -> Result<(), InputError>;

    fn send_keys(&self, combo: &KeyCombo) -> Result<(), InputError>;

    fn type_text(&self, text: &str) -> Result<(), InputError>;

    /// Texts of every descendant element of `window`.
    fn element_texts(&self, window: &WindowInfo) -> Result<Vec<String>, ElementError>;

    fn capture_window(&self, window: &WindowInfo) -> Result<RgbaImage, ScreenshotError>;

    /// Capture the primary monitor.
    fn capture_screen(&self) -> Result<RgbaImage, ScreenshotError>;
}
