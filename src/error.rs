/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! User-facing error taxonomy. Every variant renders as the single
//! error message shown under the current view.

use thiserror::Error;

use crate::validate::ValidationError;

/// Shown when a failure carries no message of its own
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalyzerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("The analysis endpoint URL is not configured.")]
    Config,

    #[error("{}", non_empty_or_generic(.0))]
    Transport(String),

    #[error("Analysis request failed with status {0}.")]
    Status(u16),

    #[error("{}", non_empty_or_generic(.0))]
    Parse(String),

    #[error("The image could not be decoded.")]
    Decode(String),
}

fn non_empty_or_generic(message: &str) -> &str {
    if message.trim().is_empty() {
        GENERIC_ERROR_MESSAGE
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_carries_code() {
        let msg = AnalyzerError::Status(500).to_string();
        assert!(msg.contains("500"));
    }

    #[test]
    fn empty_transport_message_falls_back() {
        assert_eq!(
            AnalyzerError::Transport(String::new()).to_string(),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(
            AnalyzerError::Transport("connection refused".into()).to_string(),
            "connection refused"
        );
    }

    #[test]
    fn decode_detail_is_not_shown_to_user() {
        let msg = AnalyzerError::Decode("invalid PNG signature".into()).to_string();
        assert_eq!(msg, "The image could not be decoded.");
    }
}
