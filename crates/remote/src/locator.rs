// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Discovery of test runs and of the encoding their results use.

use crate::error::Result;
use crate::listing::{ListQuery, Listing, ObjectStore, Prefixes};
use crate::settings::RemoteConfig;
use perf_graphs_results::{RunId, RunRange};
use tracing::{debug, warn};

/// Where the results of one run are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunLocation {
    /// One compound file.
    Compound(String),
    /// Any number of legacy fragments; empty when the run has no results.
    Legacy(Vec<String>),
}

/// Finds runs and their result files for one harness build.
#[derive(Debug)]
pub struct ResultLocator<S> {
    store: S,
    config: RemoteConfig,
    builds: String,
}

impl<S: ObjectStore> ResultLocator<S> {
    /// Create a locator for the harness build `builds`.
    pub fn new(store: S, config: RemoteConfig, builds: impl Into<String>) -> Self {
        Self {
            store,
            config,
            builds: builds.into(),
        }
    }

    /// The underlying object store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The remote layout in use.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn run_listing(&self, run_id: RunId, delimiter: &str) -> Listing<'_, S> {
        let prefix = self.config.run_prefix(&self.builds, run_id);
        Listing::new(&self.store, ListQuery::new(prefix, delimiter))
    }

    /// Path of the compound result file of `run_id`, if the run has one.
    pub fn locate_compound(&self, run_id: RunId) -> Result<Option<String>> {
        let delimiter = self.config.compound_delimiter.as_str();
        let prefixes = self
            .run_listing(run_id, delimiter)
            .prefixes()
            .collect::<Result<Vec<_>>>()?;

        let container = match prefixes.as_slice() {
            [] => return Ok(None),
            [only] => only,
            [first, ..] => {
                warn!(
                    run_id,
                    count = prefixes.len(),
                    "Several compound result files found, using the first"
                );
                first
            }
        };
        Ok(Some(compound_file_path(container, delimiter)))
    }

    /// Paths of every legacy fragment of `run_id`.
    pub fn locate_legacy(&self, run_id: RunId) -> Result<Vec<String>> {
        self.run_listing(run_id, &self.config.legacy_delimiter)
            .prefixes()
            .collect()
    }

    /// Detect which encoding `run_id` uses, preferring the compound file.
    pub fn locate(&self, run_id: RunId) -> Result<RunLocation> {
        if let Some(path) = self.locate_compound(run_id)? {
            debug!(run_id, %path, "Run uses a compound result file");
            return Ok(RunLocation::Compound(path));
        }
        let paths = self.locate_legacy(run_id)?;
        debug!(run_id, fragments = paths.len(), "Run uses legacy result fragments");
        Ok(RunLocation::Legacy(paths))
    }

    /// Lazily list the run ids in `range`, in listing order.
    pub fn run_ids(&self, range: RunRange) -> RunIds<'_, S> {
        let listing = Listing::new(
            &self.store,
            ListQuery::new(format!("{}/", self.config.results_prefix(&self.builds)), "/"),
        );
        RunIds {
            prefixes: listing.prefixes(),
            range,
        }
    }

    /// Download a compound file; the content is still gzip-compressed.
    pub fn download_compound(&self, path: &str) -> Result<Vec<u8>> {
        self.store.download(path)
    }

    /// Download a legacy fragment as text.
    pub fn download_text(&self, path: &str) -> Result<String> {
        let bytes = self.store.download(path)?;
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }
}

/// Resolve the compound file path from the prefix the listing returned.
pub fn compound_file_path(container: &str, delimiter: &str) -> String {
    if container.ends_with(delimiter) {
        container.to_string()
    } else if container.ends_with('/') {
        format!("{container}{delimiter}")
    } else {
        format!("{container}/{delimiter}")
    }
}

/// Run id encoded in a run directory prefix such as `.../1234/`.
pub fn run_id_from_prefix(prefix: &str) -> Option<RunId> {
    prefix
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

/// Lazy iterator over the run ids of a harness build.
///
/// Ids come in listing order, which is not necessarily sorted.
pub struct RunIds<'a, S> {
    prefixes: Prefixes<'a, S>,
    range: RunRange,
}

impl<S: ObjectStore> Iterator for RunIds<'_, S> {
    type Item = Result<RunId>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let prefix = match self.prefixes.next()? {
                Ok(prefix) => prefix,
                Err(e) => return Some(Err(e)),
            };
            match run_id_from_prefix(&prefix) {
                Some(id) if self.range.contains(id) => return Some(Ok(id)),
                Some(_) => continue,
                None => warn!(%prefix, "Skipping non-numeric run directory"),
            }
        }
    }
}
