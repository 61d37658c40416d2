// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Command-line tools for perf-graphs.
//!
//! - `fetch-meta` downloads the results of a range of test runs into a
//!   local result store
//! - `rm-entries` removes a range of runs from a local result store
//! - `perf-graphs` renders the store into HTML pages and optionally
//!   publishes them

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod cleanup;
pub mod fetch;
pub mod logging;
pub mod report;

pub use cleanup::CleanupArgs;
pub use fetch::{FetchArgs, FetchPipeline, FetchSummary};
pub use report::ReportArgs;

/// Load `.env`, install logging and run `command`, exiting with status 1
/// and the error chain on failure.
pub fn main_with<A>(args: A, command: fn(A) -> anyhow::Result<()>) {
    dotenvy::dotenv().ok();
    logging::init_logging();

    if let Err(e) = command(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
