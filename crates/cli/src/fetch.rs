// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The fetch tool: download, normalize and store the results of a range of
//! test runs.
//!
//! A run that cannot be located, downloaded or decoded is logged and
//! skipped; only a failure to list the runs themselves stops the tool.

use anyhow::{Context, Result};
use clap::Parser;
use perf_graphs_remote::{GcsClient, ObjectStore, RemoteConfig, ResultLocator, RunLocation};
use perf_graphs_results::{
    normalize_compound, normalize_legacy, ProjectAggregate, ResultStore, RunBound, RunId, RunRange,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info, info_span, warn};

/// Fetch fpga-tool-perf results of a range of test runs.
#[derive(Parser, Debug)]
#[command(name = "fetch-meta")]
#[command(author, version, about, long_about = None)]
pub struct FetchArgs {
    /// Harness build to fetch, e.g. `continuous/install`.
    pub builds: String,

    /// First test run number, inclusive.
    pub from_tr: RunId,

    /// Last test run number, inclusive, or `_` for no upper bound.
    pub to_tr: RunBound,

    /// Existing directory to store the results in.
    pub output_dir: PathBuf,
}

/// Counters reported when the fetch tool finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Runs that produced at least one stored project.
    pub runs_stored: usize,
    /// Runs without any results.
    pub runs_empty: usize,
    /// Runs skipped because of an error.
    pub runs_failed: usize,
    /// Project files written.
    pub files_written: usize,
}

/// Moves runs from the remote store into a [`ResultStore`].
#[derive(Debug)]
pub struct FetchPipeline<S> {
    locator: ResultLocator<S>,
    store: ResultStore,
}

impl<S: ObjectStore> FetchPipeline<S> {
    /// Create a pipeline writing into `store`.
    pub fn new(locator: ResultLocator<S>, store: ResultStore) -> Self {
        Self { locator, store }
    }

    /// Fetch every run in `range`, one at a time.
    pub fn run(&self, range: RunRange) -> Result<FetchSummary> {
        let mut summary = FetchSummary::default();

        for run_id in self.locator.run_ids(range) {
            let run_id = run_id.context("Can't list test runs")?;
            let span = info_span!("run", run_id);
            let _guard = span.enter();

            info!("Downloading data for test run no. {run_id}");
            match self.fetch_run(run_id) {
                Ok(0) => {
                    info!("No results for this run");
                    summary.runs_empty += 1;
                }
                Ok(files) => {
                    summary.runs_stored += 1;
                    summary.files_written += files;
                }
                Err(e) => {
                    error!("Failed to fetch test run, skipping: {e:#}");
                    summary.runs_failed += 1;
                }
            }
        }

        info!(
            stored = summary.runs_stored,
            empty = summary.runs_empty,
            failed = summary.runs_failed,
            files = summary.files_written,
            "DONE"
        );
        Ok(summary)
    }

    /// Fetch one run and store its projects. Returns the number of files
    /// written.
    pub fn fetch_run(&self, run_id: RunId) -> Result<usize> {
        let projects = match self.locator.locate(run_id).context("Can't locate results")? {
            RunLocation::Compound(path) => {
                debug!(%path, "Downloading compound results");
                let compressed = self
                    .locator
                    .download_compound(&path)
                    .with_context(|| format!("Can't download {path}"))?;
                normalize_compound(&compressed).with_context(|| format!("Can't normalize {path}"))?
            }
            RunLocation::Legacy(paths) => self.merge_legacy(run_id, &paths),
        };
        info!(projects = projects.len(), "Merge complete");

        let mut written = 0;
        for (project, aggregate) in &projects {
            match self.store.write(project, run_id, aggregate) {
                Ok(path) => {
                    debug!(project = %project, path = %path.display(), "Saved");
                    written += 1;
                }
                Err(e) => warn!(project = %project, error = %e, "Can't store project results"),
            }
        }
        Ok(written)
    }

    fn merge_legacy(&self, run_id: RunId, paths: &[String]) -> BTreeMap<String, ProjectAggregate> {
        let mut fragments = Vec::with_capacity(paths.len());
        for path in paths {
            match self.locator.download_text(path) {
                Ok(text) => fragments.push(text),
                Err(e) => warn!(%path, error = %e, "Can't download legacy fragment, skipping"),
            }
        }

        let merge = normalize_legacy(&fragments, self.locator.config().legacy_date_policy);
        debug!(
            fragments = fragments.len(),
            rejected = merge.rejected,
            incomplete = merge.incomplete,
            undecodable = merge.undecodable.len(),
            "Merged legacy fragments"
        );

        for (n, raw) in merge.undecodable.iter().enumerate() {
            let path = self.store.root().join(format!("faulty_json-{run_id}-{n}.json"));
            match fs::write(&path, raw) {
                Ok(()) => warn!(path = %path.display(), "Saved undecodable fragment"),
                Err(e) => warn!(path = %path.display(), error = %e, "Can't save undecodable fragment"),
            }
        }

        merge.projects
    }
}

/// Run the fetch tool against the configured remote store.
pub fn run(args: FetchArgs) -> Result<()> {
    let store = ResultStore::open(&args.output_dir).context("Invalid output directory")?;
    let config = RemoteConfig::from_env().context("Can't load remote configuration")?;
    let client = GcsClient::new(config.clone()).context("Can't create storage client")?;

    let locator = ResultLocator::new(client, config, args.builds);
    FetchPipeline::new(locator, store).run(RunRange::new(args.from_tr, args.to_tr))?;
    Ok(())
}
