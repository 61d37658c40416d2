// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Normalization of both result encodings into per-project aggregates.
//!
//! Both entry points are pure: they only log. Anything that needs to touch
//! the filesystem (such as keeping undecodable fragments for a postmortem)
//! is handed back to the caller.

use crate::aggregate::{ProjectAggregate, ProjectsBuilder, Sample};
use crate::date::format_date;
use crate::error::{RecordError, Result, ResultsError};
use crate::record::TestRunRecord;
use chrono::NaiveDateTime;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, warn};

/// How the legacy path dates the projects of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegacyDatePolicy {
    /// Every project gets the earliest date across all accepted fragments
    /// of the run.
    #[default]
    #[serde(rename = "global")]
    GlobalEarliest,
    /// Every project gets the earliest date of its own fragments.
    #[serde(rename = "per-project")]
    PerProjectEarliest,
}

impl FromStr for LegacyDatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "global" => Ok(Self::GlobalEarliest),
            "per-project" => Ok(Self::PerProjectEarliest),
            other => Err(format!(
                "unknown legacy date policy {other:?}, expected `global` or `per-project`"
            )),
        }
    }
}

/// Outcome of merging the legacy fragments of one run.
#[derive(Debug, Clone, Default)]
pub struct LegacyMerge {
    /// Merged aggregates keyed by project.
    pub projects: BTreeMap<String, ProjectAggregate>,
    /// Raw text of fragments that were not valid JSON.
    pub undecodable: Vec<String>,
    /// Fragments rejected by the build filter.
    pub rejected: usize,
    /// Fragments dropped because of missing or malformed fields.
    pub incomplete: usize,
}

#[derive(Debug, Deserialize)]
struct CompoundDocument {
    date: String,
    results: CompoundColumns,
}

#[derive(Debug, Deserialize)]
struct CompoundColumns {
    project: Vec<Value>,
    board: Vec<Value>,
    toolchain: Vec<Value>,
    runtime: Vec<Value>,
    resources: Vec<Value>,
    maximum_memory_use: Vec<Value>,
    max_freq: Vec<Value>,
    device: Vec<Value>,
    #[serde(default)]
    wirelength: Option<Vec<Value>>,
}

impl CompoundColumns {
    fn row_count(&self) -> usize {
        let lengths = [
            self.project.len(),
            self.board.len(),
            self.toolchain.len(),
            self.runtime.len(),
            self.resources.len(),
            self.maximum_memory_use.len(),
            self.max_freq.len(),
            self.device.len(),
            self.wirelength.as_ref().map_or(usize::MAX, Vec::len),
        ];
        let rows = lengths.iter().copied().min().unwrap_or(0);
        if lengths.iter().any(|&n| n != rows && n != usize::MAX) {
            warn!(
                rows,
                "Compound result columns differ in length, truncating to the shortest"
            );
        }
        rows
    }
}

/// Normalize a gzip-compressed compound document.
pub fn normalize_compound(compressed: &[u8]) -> Result<BTreeMap<String, ProjectAggregate>> {
    let mut decoded = Vec::new();
    GzDecoder::new(compressed)
        .read_to_end(&mut decoded)
        .map_err(ResultsError::Decompress)?;
    let text = String::from_utf8(decoded)?;
    normalize_compound_json(&text)
}

/// Normalize an already decompressed compound document.
///
/// Every row is accepted; all projects share the document's own date.
pub fn normalize_compound_json(text: &str) -> Result<BTreeMap<String, ProjectAggregate>> {
    let document: CompoundDocument =
        serde_json::from_str(text).map_err(|e| ResultsError::json("compound document", e))?;
    let columns = document.results;
    let rows = columns.row_count();
    let mut builder = ProjectsBuilder::new(columns.wirelength.is_some());

    let mut project = columns.project.into_iter();
    let mut board = columns.board.into_iter();
    let mut toolchain = columns.toolchain.into_iter();
    let mut runtime = columns.runtime.into_iter();
    let mut resources = columns.resources.into_iter();
    let mut maximum_memory_use = columns.maximum_memory_use.into_iter();
    let mut max_freq = columns.max_freq.into_iter();
    let mut device = columns.device.into_iter();
    let mut wirelength = columns.wirelength.map(Vec::into_iter);

    for _ in 0..rows {
        let (
            Some(project),
            Some(board),
            Some(toolchain),
            Some(runtime),
            Some(resources),
            Some(maximum_memory_use),
            Some(max_freq),
            Some(device),
        ) = (
            project.next(),
            board.next(),
            toolchain.next(),
            runtime.next(),
            resources.next(),
            maximum_memory_use.next(),
            max_freq.next(),
            device.next(),
        )
        else {
            break;
        };

        builder.entry(&project_key(&project)).push(Sample {
            board,
            toolchain,
            runtime,
            resources,
            maximum_memory_use,
            max_freq,
            device,
            wirelength: wirelength.as_mut().and_then(Iterator::next),
        });
    }

    debug!(rows, projects = builder.len(), "Split compound results");
    Ok(builder.finish_with_date(&document.date))
}

/// Name a compound row's project by its cell; cells that are not strings
/// are keyed by their JSON text.
fn project_key(cell: &Value) -> String {
    match cell {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

/// Merge the legacy fragments of one run.
///
/// Fragments that are not JSON, belong to another build variant or lack a
/// required field are skipped individually.
pub fn normalize_legacy<I, S>(fragments: I, policy: LegacyDatePolicy) -> LegacyMerge
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut merge = LegacyMerge::default();
    let mut builder = ProjectsBuilder::new(false);
    let mut earliest: Option<NaiveDateTime> = None;

    for (index, fragment) in fragments.into_iter().enumerate() {
        let raw = fragment.as_ref();
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(fragment = index, error = %e, "Can't decode legacy fragment as JSON");
                merge.undecodable.push(raw.to_string());
                continue;
            }
        };

        let record = match TestRunRecord::from_legacy(&value) {
            Ok(record) => record,
            Err(RecordError::Rejected { build_type, build }) => {
                debug!(fragment = index, %build_type, %build, "Skipping non-canonical build");
                merge.rejected += 1;
                continue;
            }
            Err(e) => {
                warn!(fragment = index, error = %e, "Skipping a meta file");
                merge.incomplete += 1;
                continue;
            }
        };

        if earliest.map_or(true, |current| record.date < current) {
            earliest = Some(record.date);
        }
        let entry = builder.entry(&record.project);
        entry.observe_date(record.date);
        entry.push(record.sample);
    }

    merge.projects = builder.finish(|_, project| {
        let date = match policy {
            LegacyDatePolicy::GlobalEarliest => earliest,
            LegacyDatePolicy::PerProjectEarliest => project.earliest(),
        };
        // Projects only exist once a record was accepted, so both are set.
        date.map(|d| format_date(&d)).unwrap_or_default()
    });
    merge
}
