/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

use std::sync::Arc;

/// A file offered by drag-and-drop or the file dialog, not yet validated
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    /// Size on disk. Equals `bytes.len()` unless the content was not loaded.
    size: usize,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len(),
            bytes,
        }
    }

    /// A file too large to be worth reading; it can only fail validation
    pub fn unloaded(name: impl Into<String>, mime_type: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            bytes: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// A validated file owned by the session. Bytes are shared with
/// background decode and upload tasks.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl From<CandidateFile> for SelectedFile {
    fn from(file: CandidateFile) -> Self {
        Self {
            name: file.name,
            mime_type: file.mime_type,
            bytes: file.bytes.into(),
        }
    }
}

/// Identifies one selection. Async completions tagged with an older
/// generation are dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Decoded RGBA pixels ready to upload as a texture
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewImage {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PreviewState {
    /// Decode still running
    Pending,
    Ready(PreviewImage),
}

impl PreviewState {
    pub fn image(&self) -> Option<&PreviewImage> {
        match self {
            PreviewState::Pending => None,
            PreviewState::Ready(image) => Some(image),
        }
    }
}

/// Everything needed to upload one file, detached from the session
#[derive(Clone, Debug)]
pub struct AnalysisRequest {
    pub generation: Generation,
    pub endpoint: String,
    pub file: SelectedFile,
}
