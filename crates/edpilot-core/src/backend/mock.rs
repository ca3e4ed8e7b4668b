use std::sync::Mutex;
use std::time::Duration;

use image::RgbaImage;

use super::traits::DesktopBackend;
use crate::element::ElementError;
use crate::input::{InputError, KeyCombo};
use crate::screenshot::ScreenshotError;
use crate::window::{WindowError, WindowInfo, WindowMatch, select_window};

/// Scriptable in-memory backend recording every call
#[derive(Default)]
pub(crate) struct MockBackend {
    /// Windows visible to `find_window`
    pub windows: Vec<WindowInfo>,
    /// Texts returned by `element_texts`
    pub texts: Vec<String>,
    pub fail_input: bool,
    pub fail_elements: bool,
    pub fail_capture: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn with_window(title: &str, pid: Option<u32>) -> Self {
        Self {
            windows: vec![WindowInfo::new(
                1,
                title.to_string(),
                "Code".to_string(),
                0,
                0,
                640,
                480,
                false,
                pid,
            )],
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn input_result(&self) -> Result<(), InputError> {
        if self.fail_input {
            Err(InputError::ScriptFailed {
                tool: "mock".to_string(),
                message: "input disabled".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl DesktopBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn find_window(
        &self,
        pids: &dyn Fn() -> Vec<u32>,
        title_fragment: &str,
        timeout: Duration,
    ) -> Result<(WindowInfo, WindowMatch), WindowError> {
        self.record(format!("find_window:{}", title_fragment));
        select_window(&self.windows, &pids(), title_fragment).ok_or(WindowError::WaitTimeout {
            title: title_fragment.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    fn focus_window(&self, window: &WindowInfo) -> Result<(), InputError> {
        self.record(format!("focus:{}", window.id()));
        self.input_result()
    }

    fn send_keys(&self, combo: &KeyCombo) -> Result<(), InputError> {
        self.record(format!("keys:{}", combo));
        self.input_result()
    }

    fn type_text(&self, text: &str) -> Result<(), InputError> {
        self.record(format!("type:{}", text));
        self.input_result()
    }

    fn element_texts(&self, window: &WindowInfo) -> Result<Vec<String>, ElementError> {
        self.record(format!("elements:{}", window.id()));
        if self.fail_elements {
            return Err(ElementError::QueryFailed {
                reason: "elements disabled".to_string(),
            });
        }
        Ok(self.texts.clone())
    }

    fn capture_window(&self, window: &WindowInfo) -> Result<RgbaImage, ScreenshotError> {
        self.record(format!("capture_window:{}", window.id()));
        if self.fail_capture {
            return Err(ScreenshotError::WindowNotFound { id: window.id() });
        }
        Ok(RgbaImage::new(window.width(), window.height()))
    }

    fn capture_screen(&self) -> Result<RgbaImage, ScreenshotError> {
        self.record("capture_screen".to_string());
        if self.fail_capture {
            return Err(ScreenshotError::NoPrimaryMonitor);
        }
        Ok(RgbaImage::new(2, 2))
    }
}
