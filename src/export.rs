//! Exporting the edited image
//!
//! Every export flattens floating text and snapshots the buffer first, so the
//! exported pixels are always an undoable history state.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use image::RgbaImage;

use crate::capture::image::write_png;
use crate::config::ScrollShotConfig;
use crate::editor::{EditorSession, Request};

/// `ScrollShot-<UTC timestamp>.png`, with `:` and `.` unfit for filenames replaced
pub fn export_filename(now: DateTime<Utc>) -> String {
    now.format("ScrollShot-%Y-%m-%dT%H-%M-%S.png").to_string()
}

/// Directory for downloads: `dir` when given, otherwise the configured location
pub fn download_dir(config: &ScrollShotConfig, dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => config
            .save_location
            .dir()
            .context("no directory for the configured save location"),
    }
}

/// Write prepared pixels into `dir` under a timestamped name
pub fn download(image: &RgbaImage, dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(export_filename(Utc::now()));
    save_png(image, &path)?;
    log::info!("Saved {}", path.display());
    Ok(path)
}

pub fn copy_to_clipboard(image: &RgbaImage) -> anyhow::Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_image(arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: image.as_raw().into(),
        })
        .context("failed to copy image to clipboard")?;
    log::info!("Copied {}x{} image to clipboard", image.width(), image.height());
    Ok(())
}

/// Carry out a session request
///
/// The session is prepared once per request, so a download that is also
/// copied to the clipboard takes a single history snapshot. Downloads go to
/// `dir`, or the configured save location when `None`. Returns the written
/// path for downloads.
pub fn handle_request(
    session: &mut EditorSession,
    request: Request,
    config: &ScrollShotConfig,
    dir: Option<&Path>,
) -> anyhow::Result<Option<PathBuf>> {
    match request {
        Request::Download => {
            let dir = download_dir(config, dir)?;
            let image = session.prepare_export()?;
            let path = download(image, &dir)?;
            if config.copy_to_clipboard_on_save
                && let Err(err) = copy_to_clipboard(image)
            {
                log::warn!("Failed to copy saved image: {err:#}");
            }
            Ok(Some(path))
        }
        Request::CopyToClipboard => {
            copy_to_clipboard(session.prepare_export()?)?;
            Ok(None)
        }
    }
}

/// Encode `img` as PNG at `path`, failing if any byte does not reach the file
pub fn save_png(img: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_png(&mut writer, img).with_context(|| format!("failed to encode {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
