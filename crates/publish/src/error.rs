// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for publishing.

use thiserror::Error;

/// Errors that can occur while publishing pages.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Deploy configuration could not be read or parsed
    #[error("Can't load deploy configuration: {0}")]
    ConfigSource(#[from] config::ConfigError),

    /// Deploy configuration lacks the `github` section
    #[error("Can't find github configuration section")]
    MissingSection,

    /// Deploy configuration lacks a required key
    #[error("Missing {0} in github configuration")]
    MissingKey(&'static str),

    /// Request could not be sent or its body not received
    #[error("GitHub request to {url} failed: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// GitHub answered with a non-success status
    #[error("GitHub request to {url} returned status {status}: {message}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// GitHub answered with an unexpected body
    #[error("Unexpected GitHub response from {url}: {source}")]
    Response {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Nothing to publish
    #[error("No pages to publish")]
    NoPages,
}

/// Result type for publishing operations.
pub type Result<T> = std::result::Result<T, PublishError>;
