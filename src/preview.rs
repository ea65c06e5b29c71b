/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Decode the selected file into RGBA pixels for the preview texture

use crate::error::AnalyzerError;
use crate::model::PreviewImage;

/// Longest side of the decoded preview
pub const MAX_PREVIEW_SIDE: u32 = 1024;

pub fn decode_preview(bytes: &[u8]) -> Result<PreviewImage, AnalyzerError> {
    if bytes.is_empty() {
        return Err(AnalyzerError::Decode("empty file".into()));
    }
    let img = image::load_from_memory(bytes).map_err(|e| AnalyzerError::Decode(e.to_string()))?;
    let img = if img.width() > MAX_PREVIEW_SIDE || img.height() > MAX_PREVIEW_SIDE {
        img.resize(
            MAX_PREVIEW_SIDE,
            MAX_PREVIEW_SIDE,
            image::imageops::FilterType::Triangle,
        )
    } else {
        img
    };
    let rgba = img.to_rgba8();
    Ok(PreviewImage {
        size: [rgba.width() as usize, rgba.height() as usize],
        rgba: rgba.into_raw(),
    })
}

pub fn to_color_image(preview: &PreviewImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(preview.size, &preview.rgba)
}
