// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for report generation.

use perf_graphs_results::ResultsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Stored results could not be read
    #[error(transparent)]
    Results(#[from] ResultsError),

    /// Output file could not be written
    #[error("Unable to write to the output file {}: {source}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
