/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Upload session state machine.
//!
//! The primary state is one of [`View`]'s variants; the lightbox is an
//! orthogonal flag that can only be open over a ready preview. Every accepted
//! selection and every reset bumps the [`Generation`], and async completions
//! carrying an older generation are discarded.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::model::{
    AnalysisRequest, CandidateFile, Generation, PreviewImage, PreviewState, SelectedFile,
};
use crate::validate;
use crate::zoom::Lightbox;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum View {
    #[default]
    Empty,
    Selected {
        file: SelectedFile,
        preview: PreviewState,
    },
    Loading {
        file: SelectedFile,
        preview: PreviewState,
    },
    Result {
        file: SelectedFile,
        preview: PreviewState,
        text: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Selected,
    Loading,
    Result,
}

/// Work the caller must start after a selection was accepted
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeJob {
    pub generation: Generation,
    pub file: SelectedFile,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectOutcome {
    Accepted(DecodeJob),
    Rejected,
    /// Nothing offered, or a request is running or its result is showing
    Ignored,
}

#[derive(Debug, Default)]
pub struct Session {
    view: View,
    error: Option<AnalyzerError>,
    lightbox: Lightbox,
    generation: Generation,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn phase(&self) -> Phase {
        match self.view {
            View::Empty => Phase::Empty,
            View::Selected { .. } => Phase::Selected,
            View::Loading { .. } => Phase::Loading,
            View::Result { .. } => Phase::Result,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        match &self.view {
            View::Empty => None,
            View::Selected { file, .. }
            | View::Loading { file, .. }
            | View::Result { file, .. } => Some(file),
        }
    }

    fn preview_state(&self) -> Option<&PreviewState> {
        match &self.view {
            View::Empty => None,
            View::Selected { preview, .. }
            | View::Loading { preview, .. }
            | View::Result { preview, .. } => Some(preview),
        }
    }

    pub fn preview(&self) -> Option<&PreviewImage> {
        self.preview_state().and_then(PreviewState::image)
    }

    pub fn preview_pending(&self) -> bool {
        matches!(self.preview_state(), Some(PreviewState::Pending))
    }

    pub fn result(&self) -> Option<&str> {
        match &self.view {
            View::Result { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalyzerError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == Phase::Loading
    }

    pub fn is_zoomed(&self) -> bool {
        self.lightbox.is_open()
    }

    pub fn escape_bindings(&self) -> usize {
        self.lightbox.escape_bindings()
    }

    /// Offer files from a drop or the file dialog. Only the first is considered.
    pub fn select_files(&mut self, files: Vec<CandidateFile>) -> SelectOutcome {
        if matches!(self.phase(), Phase::Loading | Phase::Result) {
            log::debug!("Selection ignored while {:?}", self.phase());
            return SelectOutcome::Ignored;
        }

        let mut files = files.into_iter();
        let Some(candidate) = files.next() else {
            return SelectOutcome::Ignored;
        };
        let extra = files.count();
        if extra > 0 {
            log::debug!("Ignoring {} additional file(s)", extra);
        }

        if let Err(e) = validate::validate(&candidate) {
            log::warn!(
                "Rejected {} ({}, {} bytes): {}",
                candidate.name,
                candidate.mime_type,
                candidate.size(),
                e
            );
            self.error = Some(e.into());
            return SelectOutcome::Rejected;
        }

        let file = SelectedFile::from(candidate);
        self.generation = self.generation.next();
        self.lightbox.close();
        self.error = None;
        self.view = View::Selected {
            file: file.clone(),
            preview: PreviewState::Pending,
        };
        log::info!(
            "Selected {} ({}, {} bytes) {}",
            file.name,
            file.mime_type,
            file.size(),
            self.generation
        );

        SelectOutcome::Accepted(DecodeJob {
            generation: self.generation,
            file,
        })
    }

    /// Apply a finished preview decode. Returns false for stale completions.
    pub fn apply_preview(
        &mut self,
        generation: Generation,
        decoded: Result<PreviewImage, AnalyzerError>,
    ) -> bool {
        if generation != self.generation {
            log::debug!("Dropping stale preview {} (current {})", generation, self.generation);
            return false;
        }
        if !self.preview_pending() {
            return false;
        }

        match decoded {
            Ok(image) => {
                log::debug!("Preview ready: {}x{}", image.size[0], image.size[1]);
                if let View::Selected { preview, .. }
                | View::Loading { preview, .. }
                | View::Result { preview, .. } = &mut self.view
                {
                    *preview = PreviewState::Ready(image);
                }
            }
            Err(e) => {
                log::warn!("Preview decode failed: {:?}", e);
                // Undecodable files leave the selection; an in-flight
                // request for it is invalidated too.
                self.generation = self.generation.next();
                self.lightbox.close();
                self.view = View::Empty;
                self.error = Some(e);
            }
        }
        true
    }

    /// Move to Loading and hand back the request to send. Returns None when
    /// nothing is selected, a request is already in flight, or the endpoint
    /// is not configured (the error is recorded instead).
    pub fn begin_analysis(&mut self, config: &AnalyzerConfig) -> Option<AnalysisRequest> {
        let (file, preview) = match std::mem::take(&mut self.view) {
            View::Selected { file, preview } | View::Result { file, preview, .. } => {
                (file, preview)
            }
            other => {
                self.view = other;
                return None;
            }
        };

        self.lightbox.close();
        self.error = None;

        let endpoint = match config.endpoint() {
            Ok(endpoint) => endpoint.to_string(),
            Err(e) => {
                log::error!("Cannot analyze: {}", e);
                self.view = View::Selected { file, preview };
                self.error = Some(e);
                return None;
            }
        };

        self.view = View::Loading {
            file: file.clone(),
            preview,
        };
        Some(AnalysisRequest {
            generation: self.generation,
            endpoint,
            file,
        })
    }

    /// Apply a finished request. Returns false for stale completions.
    pub fn complete_analysis(
        &mut self,
        generation: Generation,
        outcome: Result<String, AnalyzerError>,
    ) -> bool {
        if generation != self.generation {
            log::debug!("Dropping stale response {} (current {})", generation, self.generation);
            return false;
        }
        let (file, preview) = match std::mem::take(&mut self.view) {
            View::Loading { file, preview } => (file, preview),
            other => {
                self.view = other;
                return false;
            }
        };

        match outcome {
            Ok(text) => {
                log::info!("Analysis finished ({} chars)", text.len());
                self.error = None;
                self.view = View::Result {
                    file,
                    preview,
                    text,
                };
            }
            Err(e) => {
                log::error!("Analysis failed: {:?}", e);
                self.view = View::Selected { file, preview };
                self.error = Some(e);
            }
        }
        true
    }

    /// Back to Empty from any state. Also serves as Cancel.
    pub fn reset(&mut self) {
        self.generation = self.generation.next();
        self.lightbox.close();
        self.view = View::Empty;
        self.error = None;
        log::info!("Session reset {}", self.generation);
    }

    pub fn open_zoom(&mut self) -> bool {
        if self.preview().is_none() || !matches!(self.phase(), Phase::Selected | Phase::Result) {
            return false;
        }
        self.lightbox.open()
    }

    pub fn close_zoom(&mut self) -> bool {
        self.lightbox.close()
    }

    /// Returns true if the key press closed the lightbox
    pub fn handle_escape(&mut self) -> bool {
        self.lightbox.handle_escape()
    }
}
