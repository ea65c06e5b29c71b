/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Multipart upload to the analysis endpoint.
//! Uses the blocking reqwest client on a worker thread natively and the
//! fetch-backed async client on WASM. Response handling is shared.

use serde::Deserialize;
use serde_json::Value;

use crate::error::AnalyzerError;
use crate::model::AnalysisRequest;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// Shown when a successful response has none of the recognized fields
pub const FALLBACK_RESULT: &str = "Could not retrieve an analysis result.";

#[derive(Debug, Default, Deserialize)]
struct AnalysisResponse {
    #[serde(rename = "analysisResult", default)]
    analysis_result: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
}

impl AnalysisResponse {
    /// First truthy field wins: analysisResult, result, message
    fn display_text(&self) -> String {
        [&self.analysis_result, &self.result, &self.message]
            .into_iter()
            .flatten()
            .find_map(truthy_text)
            .unwrap_or_else(|| FALLBACK_RESULT.to_string())
    }
}

fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => number_text(n),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Non-zero numbers, printed without a trailing ".0" for integral floats
fn number_text(n: &serde_json::Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return (i != 0).then(|| i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return (u != 0).then(|| u.to_string());
    }
    // f64 Display already prints 1.0 as "1"
    n.as_f64().filter(|f| *f != 0.0).map(|f| f.to_string())
}

pub fn check_status(status: u16) -> Result<(), AnalyzerError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(AnalyzerError::Status(status))
    }
}

/// Extract the display text from a 2xx response body
pub fn parse_body(body: &[u8]) -> Result<String, AnalyzerError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| AnalyzerError::Parse(e.to_string()))?;
    let response = if value.is_object() {
        serde_json::from_value::<AnalysisResponse>(value)
            .map_err(|e| AnalyzerError::Parse(e.to_string()))?
    } else {
        AnalysisResponse::default()
    };
    Ok(response.display_text())
}

fn transport(e: reqwest::Error) -> AnalyzerError {
    AnalyzerError::Transport(e.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn send_blocking(request: &AnalysisRequest) -> Result<String, AnalyzerError> {
    send_with(&reqwest::blocking::Client::new(), request)
}

#[cfg(not(target_arch = "wasm32"))]
fn send_with(
    client: &reqwest::blocking::Client,
    request: &AnalysisRequest,
) -> Result<String, AnalyzerError> {
    use reqwest::blocking::multipart::{Form, Part};

    log::info!(
        "POST {} ({}, {} bytes) {}",
        request.endpoint,
        request.file.name,
        request.file.size(),
        request.generation
    );

    let part = Part::bytes(request.file.bytes.to_vec())
        .file_name(request.file.name.clone())
        .mime_str(&request.file.mime_type)
        .map_err(transport)?;
    let form = Form::new().part(IMAGE_FIELD, part);

    let response = client
        .post(&request.endpoint)
        .multipart(form)
        .send()
        .map_err(transport)?;

    let status = response.status().as_u16();
    log::info!("Analysis response: HTTP {}", status);
    check_status(status)?;

    let body = response.bytes().map_err(transport)?;
    parse_body(&body)
}

#[cfg(target_arch = "wasm32")]
pub async fn send(request: &AnalysisRequest) -> Result<String, AnalyzerError> {
    use reqwest::multipart::{Form, Part};

    log::info!(
        "POST {} ({}, {} bytes) {}",
        request.endpoint,
        request.file.name,
        request.file.size(),
        request.generation
    );

    let part = Part::bytes(request.file.bytes.to_vec())
        .file_name(request.file.name.clone())
        .mime_str(&request.file.mime_type)
        .map_err(transport)?;
    let form = Form::new().part(IMAGE_FIELD, part);

    let response = reqwest::Client::new()
        .post(&request.endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(transport)?;

    let status = response.status().as_u16();
    log::info!("Analysis response: HTTP {}", status);
    check_status(status)?;

    let body = response.bytes().await.map_err(transport)?;
    parse_body(&body)
}
