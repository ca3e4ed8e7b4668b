use std::path::{Component, Path, PathBuf};

use image::RgbaImage;
use tracing::{debug, info, warn};

use super::errors::ScreenshotError;

/// Capture a single window by its system id
pub fn capture_window(window_id: u32) -> Result<RgbaImage, ScreenshotError> {
    debug!(event = "core.screenshot.window_capture_started", window_id = window_id);

    let windows = xcap::Window::all().map_err(|e| ScreenshotError::CaptureFailed {
        message: e.to_string(),
    })?;

    let window = windows
        .into_iter()
        .find(|w| w.id().ok() == Some(window_id))
        .ok_or(ScreenshotError::WindowNotFound { id: window_id })?;

    let image = window
        .capture_image()
        .map_err(|e| ScreenshotError::CaptureFailed {
            message: e.to_string(),
        })?;

    debug!(
        event = "core.screenshot.window_capture_completed",
        window_id = window_id,
        width = image.width(),
        height = image.height()
    );
    Ok(image)
}

/// Capture the whole primary monitor
pub fn capture_primary_monitor() -> Result<RgbaImage, ScreenshotError> {
    debug!(event = "core.screenshot.monitor_capture_started");

    let monitors = xcap::Monitor::all().map_err(|e| ScreenshotError::CaptureFailed {
        message: e.to_string(),
    })?;

    let monitor = monitors
        .into_iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .ok_or(ScreenshotError::NoPrimaryMonitor)?;

    monitor
        .capture_image()
        .map_err(|e| ScreenshotError::CaptureFailed {
            message: e.to_string(),
        })
}

/// Write `image` as PNG to `dir/filename`, creating `dir` if needed.
///
/// `filename` must be a plain file name; separators and `..` are rejected.
pub fn save_png(image: &RgbaImage, dir: &Path, filename: &str) -> Result<PathBuf, ScreenshotError> {
    let mut components = Path::new(filename).components();
    let valid = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !valid {
        return Err(ScreenshotError::InvalidFilename {
            filename: filename.to_string(),
        });
    }

    std::fs::create_dir_all(dir).map_err(|source| ScreenshotError::DirectoryCreateFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(filename);
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .map_err(|e| {
            warn!(event = "core.screenshot.save_failed", path = %path.display(), error = %e);
            ScreenshotError::SaveFailed {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;

    info!(
        event = "core.screenshot.save_completed",
        path = %path.display(),
        width = image.width(),
        height = image.height()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> RgbaImage {
        RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]))
    }

    #[test]
    fn test_save_png_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("test/e2e/screenshots");

        let path = save_png(&sample_image(), &shots, "shot.png").unwrap();
        assert_eq!(path, shots.join("shot.png"));
        assert!(path.is_file());

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
    }

    #[test]
    fn test_save_png_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        save_png(&sample_image(), dir.path(), "same.png").unwrap();
        let big = RgbaImage::new(8, 8);
        let path = save_png(&big, dir.path(), "same.png").unwrap();
        assert_eq!(image::open(&path).unwrap().width(), 8);
    }

    #[test]
    fn test_save_png_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["", "../escape.png", "nested/shot.png", "."] {
            let result = save_png(&sample_image(), dir.path(), name);
            assert!(
                matches!(result, Err(ScreenshotError::InvalidFilename { .. })),
                "expected rejection for {:?}",
                name
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_save_png_reports_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let result = save_png(&sample_image(), &blocker.join("shots"), "x.png");
        assert!(matches!(
            result,
            Err(ScreenshotError::DirectoryCreateFailed { .. })
        ));
    }
}
