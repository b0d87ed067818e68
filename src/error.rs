// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the analysis client.
//!
//! Every failure is scoped to the current upload/analysis attempt. None of
//! these errors are fatal to the application; a reset always allows a fresh
//! attempt.

use thiserror::Error;

/// Errors raised while preparing, submitting or tracking an analysis task.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Local input problem (bad file type, missing region, missing category).
    #[error("{0}")]
    Validation(String),

    /// Backend unreachable or the request could not be completed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success HTTP status.
    #[error("backend returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Error text reported by the backend, if any
        message: String,
    },

    /// Backend reported the analysis task as failed.
    #[error("analysis failed: {0}")]
    TaskFailed(String),

    /// Task completed but the result payload is missing or partial.
    #[error("incomplete result: {0}")]
    IncompleteResult(String),

    /// Response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local file access error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Create a validation error from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// Input-validation failures are shown as warnings rather than errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_warning_class() {
        assert!(ClientError::validation("select a region first").is_validation());
        assert!(!ClientError::TaskFailed("boom".into()).is_validation());
    }

    #[test]
    fn test_http_error_message() {
        let err = ClientError::Http {
            status: 404,
            message: "task not found".into(),
        };
        assert_eq!(err.to_string(), "backend returned HTTP 404: task not found");
    }
}
