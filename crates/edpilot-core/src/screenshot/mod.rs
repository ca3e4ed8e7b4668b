pub mod errors;
pub mod handler;

pub use errors::ScreenshotError;
pub use handler::{capture_primary_monitor, capture_window, save_png};
