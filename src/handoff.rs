//! Hand a finished capture from the capture step to the editor
//!
//! The capture is stored as a PNG next to a small JSON record describing it.
//! Both files are written to a temporary name and renamed into place, so the
//! editor never sees a half-written capture.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::capture::{Bitmap, CaptureError};

const RECORD_FILE: &str = "pending.json";

/// Largest initial editor window
pub const MAX_EDITOR_WINDOW: (u32, u32) = (1400, 900);
/// Room around the image for toolbars and margins
pub const EDITOR_CHROME: (u32, u32) = (400, 200);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingCapture {
    pub image_path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Default handoff directory under the user cache
pub fn handoff_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("scrollshot"))
}

/// Initial editor window size for a capture of `width` x `height`
pub fn editor_window_size(width: u32, height: u32) -> (u32, u32) {
    (
        (width + EDITOR_CHROME.0).min(MAX_EDITOR_WINDOW.0),
        (height + EDITOR_CHROME.1).min(MAX_EDITOR_WINDOW.1),
    )
}

/// Store a capture for the editor, replacing any previous pending capture
pub fn store_pending(dir: &Path, bitmap: &Bitmap) -> anyhow::Result<PendingCapture> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let timestamp = Utc::now().timestamp_millis();
    let image_path = dir.join(format!("capture-{timestamp}.png"));
    let png = bitmap.to_png().context("failed to encode capture")?;
    write_atomic(dir, &image_path, &png)?;

    let record = PendingCapture {
        image_path,
        width: bitmap.width(),
        height: bitmap.height(),
        timestamp,
    };
    let json = serde_json::to_vec_pretty(&record)?;
    let previous = read_record(dir).ok();
    write_atomic(dir, &dir.join(RECORD_FILE), &json)?;

    if let Some(previous) = previous
        && previous.image_path != record.image_path
        && let Err(err) = std::fs::remove_file(&previous.image_path)
    {
        log::debug!("Stale capture {} not removed: {err}", previous.image_path.display());
    }
    log::info!(
        "Capture {}x{} handed off via {}",
        record.width,
        record.height,
        dir.display()
    );
    Ok(record)
}

/// Load the pending capture
///
/// A capture whose image cannot be decoded is an error; the editor cannot open
/// without it.
pub fn load_pending(dir: &Path) -> anyhow::Result<(PendingCapture, Bitmap)> {
    let record = read_record(dir)?;
    let payload = std::fs::read(&record.image_path)
        .map_err(CaptureError::from)
        .with_context(|| format!("failed to read {}", record.image_path.display()))?;
    let bitmap = Bitmap::decode(&payload, 1.0).context("failed to load capture")?;
    if (bitmap.width(), bitmap.height()) != (record.width, record.height) {
        log::warn!(
            "Capture is {}x{} but its record says {}x{}",
            bitmap.width(),
            bitmap.height(),
            record.width,
            record.height
        );
    }
    Ok((record, bitmap))
}

/// Remove the pending capture once the editor owns it
pub fn clear_pending(dir: &Path) -> anyhow::Result<()> {
    let Ok(record) = read_record(dir) else {
        return Ok(());
    };
    std::fs::remove_file(dir.join(RECORD_FILE))?;
    if let Err(err) = std::fs::remove_file(&record.image_path) {
        log::debug!("Capture {} not removed: {err}", record.image_path.display());
    }
    Ok(())
}

fn read_record(dir: &Path) -> anyhow::Result<PendingCapture> {
    let path = dir.join(RECORD_FILE);
    let json = std::fs::read(&path).with_context(|| format!("no pending capture at {}", path.display()))?;
    serde_json::from_slice(&json).with_context(|| format!("invalid capture record {}", path.display()))
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new()
        .prefix(".scrollshot-")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn bitmap() -> Bitmap {
        Bitmap::new(
            RgbaImage::from_fn(7, 5, |x, y| Rgba([x as u8, y as u8, 9, 255])),
            2.0,
        )
    }

    #[test]
    fn test_window_size_is_capped() {
        assert_eq!(editor_window_size(800, 600), (1200, 800));
        assert_eq!(editor_window_size(1280, 3000), (1400, 900));
        assert_eq!(editor_window_size(0, 0), (400, 200));
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let stored = store_pending(dir.path(), &bitmap()).unwrap();
        assert_eq!((stored.width, stored.height), (7, 5));

        let (record, loaded) = load_pending(dir.path()).unwrap();
        assert_eq!(record, stored);
        assert_eq!(loaded.rgba, bitmap().rgba);

        clear_pending(dir.path()).unwrap();
        assert!(load_pending(dir.path()).is_err());
        assert!(!stored.image_path.exists());
    }

    #[test]
    fn test_corrupt_capture_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let stored = store_pending(dir.path(), &bitmap()).unwrap();
        std::fs::write(&stored.image_path, b"not a png").unwrap();

        let err = load_pending(dir.path()).unwrap_err();
        assert!(
            err.chain().any(|e| e.downcast_ref::<CaptureError>().is_some()),
            "{err:#}"
        );
    }

    #[test]
    fn test_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_pending(dir.path()).is_err());
        clear_pending(dir.path()).unwrap();
    }
}
