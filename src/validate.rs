/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Client-side upload policy: at most 5 MiB, PNG/JPEG/GIF only.

use thiserror::Error;

use crate::model::CandidateFile;

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "image/gif"];

/// Extensions offered by the file dialog filter
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("File must be 5 MB or smaller.")]
    TooLarge { size: usize },

    #[error("Only PNG, JPEG, and GIF images are supported.")]
    UnsupportedType { mime_type: String },
}

/// Size is checked before type, so an oversized non-image reports the size error.
pub fn validate(file: &CandidateFile) -> Result<(), ValidationError> {
    if file.size() > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge { size: file.size() });
    }
    if !ACCEPTED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return Err(ValidationError::UnsupportedType {
            mime_type: file.mime_type.clone(),
        });
    }
    Ok(())
}

/// Resolve the MIME type of a file: the declared one if present,
/// otherwise guessed from the extension.
pub fn resolve_mime_type(name: &str, declared: &str) -> String {
    let declared = declared.trim();
    if !declared.is_empty() {
        return declared.to_ascii_lowercase();
    }
    let lower = name.to_lowercase();
    let ext = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(mime: &str, size: usize) -> CandidateFile {
        CandidateFile::new("sample", mime, vec![0u8; size])
    }

    #[test]
    fn accepts_all_policy_types_at_limit() {
        for mime in ACCEPTED_MIME_TYPES {
            assert_eq!(validate(&file(mime, MAX_FILE_SIZE)), Ok(()));
        }
    }

    #[test]
    fn rejects_one_byte_over_limit() {
        let err = validate(&file("image/png", MAX_FILE_SIZE + 1)).unwrap_err();
        assert_eq!(err, ValidationError::TooLarge { size: MAX_FILE_SIZE + 1 });
        assert_eq!(err.to_string(), "File must be 5 MB or smaller.");
    }

    #[test]
    fn rejects_other_types_regardless_of_size() {
        for mime in ["image/webp", "image/svg+xml", "application/pdf", ""] {
            for size in [0, 1024, MAX_FILE_SIZE] {
                let err = validate(&file(mime, size)).unwrap_err();
                assert_eq!(err.to_string(), "Only PNG, JPEG, and GIF images are supported.");
            }
        }
    }

    #[test]
    fn oversize_wins_over_wrong_type() {
        let err = validate(&file("application/pdf", 6 * 1024 * 1024)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn mime_from_declared_type_or_extension() {
        assert_eq!(resolve_mime_type("a.bin", "image/GIF"), "image/gif");
        assert_eq!(resolve_mime_type("Photo.JPG", ""), "image/jpeg");
        assert_eq!(resolve_mime_type("scan.jpeg", " "), "image/jpeg");
        assert_eq!(resolve_mime_type("icon.png", ""), "image/png");
        assert_eq!(resolve_mime_type("anim.gif", ""), "image/gif");
        assert_eq!(resolve_mime_type("notes.txt", ""), "application/octet-stream");
        assert_eq!(resolve_mime_type("noext", ""), "application/octet-stream");
    }
}
