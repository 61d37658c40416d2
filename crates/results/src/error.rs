// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for result normalization and storage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole normalization or store operation.
#[derive(Debug, Error)]
pub enum ResultsError {
    /// Filesystem operation failed
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON could not be decoded or encoded
    #[error("JSON error in {context}: {source}")]
    Json {
        /// What was being decoded or encoded.
        context: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Compound document is not valid gzip
    #[error("Failed to decompress compound document: {0}")]
    Decompress(#[source] std::io::Error),

    /// Compound document is not valid UTF-8 after decompression
    #[error("Compound document is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Stored aggregate has result columns of differing lengths
    #[error("Stored aggregate {} has misaligned result fields", path.display())]
    Misaligned {
        /// Offending file.
        path: PathBuf,
    },

    /// Project name cannot be used as a directory name
    #[error("Invalid project name: {0:?}")]
    InvalidProject(String),

    /// Store root is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl ResultsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResultsError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        ResultsError::Json {
            context: context.into(),
            source,
        }
    }
}

/// Result type for normalization and store operations.
pub type Result<T> = std::result::Result<T, ResultsError>;

/// Reasons a single record is dropped from a merge.
///
/// A record error never aborts the merge of the remaining records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Record is not a JSON object
    #[error("record is not a JSON object")]
    NotAnObject,

    /// Required field is absent
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// Field is present but has the wrong JSON type
    #[error("field `{field}` is not a {expected}")]
    WrongType {
        /// Field name.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },

    /// Date field does not follow the harness date format
    #[error("invalid date {value:?}")]
    InvalidDate {
        /// Raw date value.
        value: String,
    },

    /// Record belongs to a build variant other than the canonical one
    #[error("build variant {build_type}/{build} is not accepted")]
    Rejected {
        /// `build_type` of the record.
        build_type: String,
        /// `build` of the record.
        build: String,
    },
}
