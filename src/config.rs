/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Deployment configuration: the analysis endpoint URL.
//!
//! Native builds read `IMAGE_ANALYZER_ENDPOINT_URL` at startup and fall back
//! to the value baked in at compile time. WASM builds only have the
//! compile-time value.

use crate::error::AnalyzerError;

pub const ENDPOINT_ENV_VAR: &str = "IMAGE_ANALYZER_ENDPOINT_URL";

const BUILD_TIME_ENDPOINT: Option<&str> = option_env!("IMAGE_ANALYZER_ENDPOINT_URL");

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalyzerConfig {
    endpoint_url: Option<String>,
}

impl AnalyzerConfig {
    /// Blank values count as unset
    pub fn new(endpoint_url: Option<String>) -> Self {
        let endpoint_url = endpoint_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        Self { endpoint_url }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let runtime = std::env::var(ENDPOINT_ENV_VAR).ok();
        let config = Self::new(runtime).or(Self::new(BUILD_TIME_ENDPOINT.map(str::to_string)));
        config.log_summary();
        config
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        let config = Self::new(BUILD_TIME_ENDPOINT.map(str::to_string));
        config.log_summary();
        config
    }

    fn or(self, other: Self) -> Self {
        if self.endpoint_url.is_some() { self } else { other }
    }

    fn log_summary(&self) {
        match &self.endpoint_url {
            Some(url) => log::info!("Analysis endpoint: {}", url),
            None => log::warn!("{} is not set; analysis requests will fail", ENDPOINT_ENV_VAR),
        }
    }

    pub fn endpoint(&self) -> Result<&str, AnalyzerError> {
        self.endpoint_url.as_deref().ok_or(AnalyzerError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_endpoint_is_unset() {
        assert_eq!(AnalyzerConfig::new(None).endpoint(), Err(AnalyzerError::Config));
        assert_eq!(
            AnalyzerConfig::new(Some("   ".into())).endpoint(),
            Err(AnalyzerError::Config)
        );
    }

    #[test]
    fn endpoint_is_trimmed() {
        let config = AnalyzerConfig::new(Some(" https://hooks.example.com/analyze \n".into()));
        assert_eq!(config.endpoint(), Ok("https://hooks.example.com/analyze"));
    }

    #[test]
    fn first_configured_source_wins() {
        let runtime = AnalyzerConfig::new(Some("https://a.example.com".into()));
        let build = AnalyzerConfig::new(Some("https://b.example.com".into()));
        assert_eq!(runtime.clone().or(build.clone()), runtime);
        assert_eq!(AnalyzerConfig::new(None).or(build.clone()), build);
    }
}
