use std::time::Duration;

use image::RgbaImage;

use super::traits::DesktopBackend;
use crate::element::{self, ElementError};
use crate::input::{self, InputError, KeyCombo};
use crate::screenshot::{self, ScreenshotError};
use crate::window::{self, WindowError, WindowInfo, WindowMatch};

/// Backend driving the real desktop through `xcap` and platform scripting tools
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBackend;

impl DesktopBackend for SystemBackend {
    fn name(&self) -> &'static str {
        "system"
    }

    fn find_window(
        &self,
        pids: &dyn Fn() -> Vec<u32>,
        title_fragment: &str,
        timeout: Duration,
    ) -> Result<(WindowInfo, WindowMatch), WindowError> {
        window::find_window_for_pids_with_wait(pids, title_fragment, timeout)
    }

    fn focus_window(&self, window: &WindowInfo) -> Result<(), InputError> {
        input::focus_window(window)
    }

    fn send_keys(&self, combo: &KeyCombo) -> Result<(), InputError> {
        input::send_key_combo(combo)
    }

    fn type_text(&self, text: &str) -> Result<(), InputError> {
        input::type_text(text)
    }

    fn element_texts(&self, window: &WindowInfo) -> Result<Vec<String>, ElementError> {
        element::element_texts(window)
    }

    fn capture_window(&self, window: &WindowInfo) -> Result<RgbaImage, ScreenshotError> {
        screenshot::capture_window(window.id())
    }

    fn capture_screen(&self) -> Result<RgbaImage, ScreenshotError> {
        screenshot::capture_primary_monitor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_backend_name() {
        assert_eq!(SystemBackend.name(), "system");
    }

    #[test]
    fn test_system_backend_is_object_safe() {
        let backend: Box<dyn DesktopBackend> = Box::new(SystemBackend);
        assert_eq!(backend.name(), "system");
    }
}
