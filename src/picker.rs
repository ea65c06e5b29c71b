/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Input acquisition: egui drag-and-drop and the rfd file dialog.
//! Both produce unvalidated [`CandidateFile`]s.

use crate::model::CandidateFile;
use crate::validate::{ACCEPTED_EXTENSIONS, resolve_mime_type};

#[cfg(not(target_arch = "wasm32"))]
use crate::validate::MAX_FILE_SIZE;

/// Convert a dropped file. Browser drops carry bytes; native drops carry a
/// path that is read here.
pub fn from_dropped(file: &egui::DroppedFile) -> Option<CandidateFile> {
    let name = if !file.name.is_empty() {
        file.name.clone()
    } else {
        file.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let mime_type = resolve_mime_type(&name, &file.mime);
    match (&file.bytes, &file.path) {
        (Some(bytes), _) => Some(CandidateFile::new(name, mime_type, bytes.to_vec())),
        #[cfg(not(target_arch = "wasm32"))]
        (None, Some(path)) => match read_limited(path, name, mime_type) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                log::error!("Failed to read dropped file {}: {}", path.display(), e);
                None
            }
        },
        _ => {
            log::warn!("Dropped file {} has no content", name);
            None
        }
    }
}

/// Only the first dropped file is ever considered. If it cannot be read
/// the drop yields nothing; later files are not promoted.
pub fn from_dropped_first(files: &[egui::DroppedFile]) -> Option<CandidateFile> {
    let (first, rest) = files.split_first()?;
    if !rest.is_empty() {
        log::debug!("Ignoring {} additional dropped file(s)", rest.len());
    }
    from_dropped(first)
}

/// Read a file from disk without loading anything larger than the upload
/// limit. Oversized files come back unloaded so validation rejects them.
#[cfg(not(target_arch = "wasm32"))]
fn read_limited(
    path: &std::path::Path,
    name: String,
    mime_type: String,
) -> std::io::Result<CandidateFile> {
    use std::io::Read;

    let on_disk = std::fs::metadata(path)?.len();
    if on_disk > MAX_FILE_SIZE as u64 {
        let size = usize::try_from(on_disk).unwrap_or(usize::MAX);
        return Ok(CandidateFile::unloaded(name, mime_type, size));
    }

    // The file may grow between metadata and read
    let mut bytes = Vec::with_capacity(on_disk as usize);
    std::fs::File::open(path)?
        .take(MAX_FILE_SIZE as u64 + 1)
        .read_to_end(&mut bytes)?;
    if bytes.len() > MAX_FILE_SIZE {
        return Ok(CandidateFile::unloaded(name, mime_type, bytes.len()));
    }
    Ok(CandidateFile::new(name, mime_type, bytes))
}

/// Blocking native dialog
#[cfg(not(target_arch = "wasm32"))]
pub fn pick_file() -> Option<CandidateFile> {
    let path = rfd::FileDialog::new()
        .add_filter("Images", ACCEPTED_EXTENSIONS)
        .pick_file()?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = resolve_mime_type(&name, "");
    match read_limited(&path, name, mime_type) {
        Ok(candidate) => Some(candidate),
        Err(e) => {
            log::error!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Browser file input via rfd
#[cfg(target_arch = "wasm32")]
pub async fn pick_file() -> Option<CandidateFile> {
    let handle = rfd::AsyncFileDialog::new()
        .add_filter("Images", ACCEPTED_EXTENSIONS)
        .pick_file()
        .await?;
    let name = handle.file_name();
    let bytes = handle.read().await;
    let mime_type = resolve_mime_type(&name, "");
    Some(CandidateFile::new(name, mime_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::validate::{self, ValidationError};

    fn dropped(name: &str, mime: &str, bytes: Option<&[u8]>) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.map(Arc::from),
            ..Default::default()
        }
    }

    fn path_only(path: PathBuf) -> egui::DroppedFile {
        egui::DroppedFile {
            path: Some(path),
            ..Default::default()
        }
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("image-analyzer-{}-{}.png", tag, std::process::id()))
    }

    #[test]
    fn browser_drop_uses_declared_mime() {
        let file = from_dropped(&dropped("photo", "image/gif", Some(&[1, 2, 3]))).unwrap();
        assert_eq!(file.name, "photo");
        assert_eq!(file.mime_type, "image/gif");
        assert_eq!(file.bytes, vec![1, 2, 3]);
        assert_eq!(file.size(), 3);
    }

    #[test]
    fn missing_mime_falls_back_to_extension() {
        let file = from_dropped(&dropped("photo.JPG", "", Some(&[0]))).unwrap();
        assert_eq!(file.mime_type, "image/jpeg");
    }

    #[test]
    fn drop_without_content_is_skipped() {
        assert!(from_dropped(&dropped("ghost.png", "image/png", None)).is_none());
    }

    #[test]
    fn only_first_drop_is_converted() {
        let files = [
            dropped("a.png", "", Some(&[1])),
            dropped("b.gif", "", Some(&[2])),
        ];
        assert_eq!(from_dropped_first(&files).map(|f| f.name).as_deref(), Some("a.png"));
        assert!(from_dropped_first(&[]).is_none());
    }

    #[test]
    fn empty_first_drop_does_not_promote_second() {
        let files = [
            dropped("gone.png", "", None),
            dropped("b.gif", "", Some(&[2])),
        ];
        assert!(from_dropped_first(&files).is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn unreadable_first_path_does_not_promote_second() {
        let files = [
            path_only(temp_path("missing")),
            dropped("b.png", "image/png", Some(&[2])),
        ];
        assert!(from_dropped_first(&files).is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_drop_reads_path() {
        let path = temp_path("drop");
        std::fs::write(&path, [9u8, 9, 9]).unwrap();
        let candidate = from_dropped(&path_only(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(candidate.name.starts_with("image-analyzer-drop-"));
        assert_eq!(candidate.mime_type, "image/png");
        assert_eq!(candidate.bytes, vec![9, 9, 9]);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn oversize_path_is_not_loaded() {
        let path = temp_path("oversize");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_FILE_SIZE as u64 + 1).unwrap();
        drop(file);

        let candidate = from_dropped(&path_only(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(candidate.bytes.is_empty());
        assert_eq!(candidate.size(), MAX_FILE_SIZE + 1);
        assert_eq!(
            validate::validate(&candidate),
            Err(ValidationError::TooLarge { size: MAX_FILE_SIZE + 1 })
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn path_at_limit_is_loaded() {
        let path = temp_path("at-limit");
        std::fs::write(&path, vec![1u8; MAX_FILE_SIZE]).unwrap();
        let candidate = from_dropped(&path_only(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(candidate.bytes.len(), MAX_FILE_SIZE);
        assert_eq!(validate::validate(&candidate), Ok(()));
    }
}
