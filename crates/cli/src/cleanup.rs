// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The cleanup tool: remove a range of runs from a local result store.

use anyhow::{Context, Result};
use clap::Parser;
use perf_graphs_results::{ResultStore, RunId, RunRange};
use std::path::PathBuf;
use tracing::info;

/// Remove stored results of a range of test runs.
#[derive(Parser, Debug)]
#[command(name = "rm-entries")]
#[command(author, version, about, long_about = None)]
pub struct CleanupArgs {
    /// Result store directory.
    pub meta_dir: PathBuf,

    /// First test run number to remove, inclusive.
    pub from_no: RunId,

    /// Last test run number to remove, inclusive.
    pub to_no: RunId,
}

/// Remove every stored run in the requested range. Returns the number of
/// files removed.
pub fn remove_entries(args: &CleanupArgs) -> Result<usize> {
    let store = ResultStore::open(&args.meta_dir).context("Invalid result store directory")?;
    let removed = store
        .delete_range(RunRange::inclusive(args.from_no, args.to_no))
        .context("Can't remove stored runs")?;

    for path in &removed {
        info!("Removing {}", path.display());
    }
    info!(
        from = args.from_no,
        to = args.to_no,
        removed = removed.len(),
        "Removed {} entries",
        removed.len()
    );
    Ok(removed.len())
}

/// Run the cleanup tool.
pub fn run(args: CleanupArgs) -> Result<()> {
    remove_entries(&args).map(|_| ())
}
