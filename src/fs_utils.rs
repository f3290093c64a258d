use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use eframe::egui::DroppedFile;

use crate::image_utils::ImageFile;

/// Extensions offered by the file dialog. The MIME check in the picker is authoritative.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

pub const FALLBACK_MIME: &str = "application/octet-stream";

pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn read_image_file(path: &Path) -> Result<ImageFile> {
    if !path.is_file() {
        return Err(anyhow!("{} is not a file", path.display()));
    }
    let bytes = fs::read(path).with_context(|| format!("Unable to read {}", path.display()))?;
    Ok(ImageFile::new(file_name_of(path), guess_mime(path), bytes))
}

/// Turns a file dropped on the window into an [`ImageFile`].
///
/// Web backends hand over bytes and a MIME type, native ones only a path.
pub fn dropped_to_image_file(dropped: &DroppedFile) -> Result<ImageFile> {
    if let Some(bytes) = &dropped.bytes {
        let mime = if dropped.mime.is_empty() {
            guess_mime(Path::new(&dropped.name))
        } else {
            dropped.mime.clone()
        };
        return Ok(ImageFile::new(dropped.name.clone(), mime, bytes.to_vec()));
    }

    let path = dropped
        .path
        .as_deref()
        .ok_or_else(|| anyhow!("Dropped file {} has neither path nor contents", dropped.name))?;
    let mut file = read_image_file(path)?;
    if !dropped.mime.is_empty() {
        file.mime_type = dropped.mime.clone();
    }
    Ok(file)
}
