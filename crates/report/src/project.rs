// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Grouping of a project's stored runs by board and toolchain.

use crate::error::Result;
use crate::metrics;
use chrono::NaiveDateTime;
use perf_graphs_results::date::parse_date;
use perf_graphs_results::{ResultStore, RunId, StoredRun};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// One sample of one run, reduced to plottable numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    /// Run the sample comes from.
    pub run_id: RunId,
    /// Date of that run.
    pub date: NaiveDateTime,
    /// Target device.
    pub device: String,
    /// Total runtime in seconds.
    pub runtime: Option<f64>,
    /// Highest achieved clock frequency in MHz.
    pub max_freq: Option<f64>,
    /// Peak memory use in MiB.
    pub maximum_memory_use: Option<f64>,
    /// Resource utilisation by kind.
    pub resources: BTreeMap<String, f64>,
    /// Total routed wirelength.
    pub wirelength: Option<f64>,
}

/// Board name to toolchain name to the entries of every run, oldest first.
pub type Entries = BTreeMap<String, BTreeMap<String, Vec<ResultEntry>>>;

/// All stored results of one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectResults {
    /// Name of the project.
    pub project_name: String,
    /// Entries grouped by board and toolchain.
    pub entries: Entries,
}

impl ProjectResults {
    /// Group stored runs. Runs whose date cannot be parsed are skipped.
    pub fn from_runs(project_name: impl Into<String>, runs: Vec<StoredRun>) -> Self {
        let project_name = project_name.into();
        let mut entries = Entries::new();

        for run in runs {
            let date = match parse_date(&run.aggregate.date) {
                Ok(date) => date,
                Err(_) => {
                    warn!(
                        project = %project_name,
                        run_id = run.run_id,
                        date = %run.aggregate.date,
                        "Skipping run with an invalid date"
                    );
                    continue;
                }
            };

            for sample in run.aggregate.results.samples() {
                let entry = ResultEntry {
                    run_id: run.run_id,
                    date,
                    device: display_value(&sample.device),
                    runtime: metrics::runtime_total(&sample.runtime),
                    max_freq: metrics::max_frequency(&sample.max_freq),
                    maximum_memory_use: metrics::number(&sample.maximum_memory_use),
                    resources: metrics::resources(&sample.resources),
                    wirelength: sample.wirelength.as_ref().and_then(metrics::number),
                };
                entries
                    .entry(display_value(&sample.board))
                    .or_default()
                    .entry(display_value(&sample.toolchain))
                    .or_default()
                    .push(entry);
            }
        }

        for toolchains in entries.values_mut() {
            for series in toolchains.values_mut() {
                series.sort_by(|a, b| a.date.cmp(&b.date).then(a.run_id.cmp(&b.run_id)));
            }
        }

        Self {
            project_name,
            entries,
        }
    }

    /// Read and group every stored run of `project_name`.
    pub fn load(store: &ResultStore, project_name: &str) -> Result<Self> {
        let runs = store.read_all(project_name)?;
        Ok(Self::from_runs(project_name, runs))
    }

    /// Whether the project has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every toolchain used on any board, sorted.
    pub fn toolchains(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .flat_map(|toolchains| toolchains.keys().map(String::as_str))
            .collect()
    }

    /// Resource kinds reported on `board`, sorted.
    pub fn resource_kinds(&self, board: &str) -> BTreeSet<&str> {
        self.entries
            .get(board)
            .into_iter()
            .flat_map(|toolchains| toolchains.values())
            .flatten()
            .flat_map(|entry| entry.resources.keys().map(String::as_str))
            .collect()
    }
}

/// Load every project of the store, sorted by name.
pub fn load_projects(store: &ResultStore) -> Result<Vec<ProjectResults>> {
    let mut projects = Vec::new();
    for name in store.projects()? {
        let project = ProjectResults::load(store, &name)?;
        info!(project = %name, boards = project.entries.len(), "Loaded project results");
        projects.push(project);
    }
    Ok(projects)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
