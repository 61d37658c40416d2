// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-project aggregates of a single test run.
//!
//! # Invariants
//!
//! Every column of a [`RunResults`] has the same length: index `i` of each
//! column describes the same original record. Columns are private and only
//! grow through [`AggregateBuilder::push`], which appends one whole
//! [`Sample`] at a time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields every accepted record must carry.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "board",
    "toolchain",
    "runtime",
    "resources",
    "maximum_memory_use",
    "max_freq",
    "device",
];

/// One accepted record, with every field present.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Board the design was built for.
    pub board: Value,
    /// Toolchain that built it.
    pub toolchain: Value,
    /// Per-stage runtimes.
    pub runtime: Value,
    /// Resource utilisation.
    pub resources: Value,
    /// Peak memory use of the toolchain.
    pub maximum_memory_use: Value,
    /// Achieved clock frequencies.
    pub max_freq: Value,
    /// Target device.
    pub device: Value,
    /// Total routed wirelength, when the encoding carries it.
    pub wirelength: Option<Value>,
}

/// Column-oriented samples of one project in one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    board: Vec<Value>,
    toolchain: Vec<Value>,
    runtime: Vec<Value>,
    resources: Vec<Value>,
    maximum_memory_use: Vec<Value>,
    max_freq: Vec<Value>,
    device: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wirelength: Option<Vec<Value>>,
}

impl RunResults {
    fn new(with_wirelength: bool) -> Self {
        Self {
            wirelength: with_wirelength.then(Vec::new),
            ..Self::default()
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.board.len()
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.board.is_empty()
    }

    /// Whether the `wirelength` column is recorded.
    pub fn has_wirelength(&self) -> bool {
        self.wirelength.is_some()
    }

    /// Whether all columns have the same length.
    ///
    /// Always true for aggregates built in this process; used to validate
    /// aggregates read back from disk.
    pub fn is_aligned(&self) -> bool {
        let n = self.board.len();
        self.toolchain.len() == n
            && self.runtime.len() == n
            && self.resources.len() == n
            && self.maximum_memory_use.len() == n
            && self.max_freq.len() == n
            && self.device.len() == n
            && self.wirelength.as_ref().map_or(true, |w| w.len() == n)
    }

    /// Lengths of every recorded column, keyed by field name.
    pub fn column_lengths(&self) -> BTreeMap<&'static str, usize> {
        let mut lengths = BTreeMap::from([
            ("board", self.board.len()),
            ("toolchain", self.toolchain.len()),
            ("runtime", self.runtime.len()),
            ("resources", self.resources.len()),
            ("maximum_memory_use", self.maximum_memory_use.len()),
            ("max_freq", self.max_freq.len()),
            ("device", self.device.len()),
        ]);
        if let Some(w) = &self.wirelength {
            lengths.insert("wirelength", w.len());
        }
        lengths
    }

    /// Reassemble the sample at `index`.
    pub fn sample(&self, index: usize) -> Option<Sample> {
        Some(Sample {
            board: self.board.get(index)?.clone(),
            toolchain: self.toolchain.get(index)?.clone(),
            runtime: self.runtime.get(index)?.clone(),
            resources: self.resources.get(index)?.clone(),
            maximum_memory_use: self.maximum_memory_use.get(index)?.clone(),
            max_freq: self.max_freq.get(index)?.clone(),
            device: self.device.get(index)?.clone(),
            wirelength: match &self.wirelength {
                Some(w) => Some(w.get(index)?.clone()),
                None => None,
            },
        })
    }

    /// Iterate over all samples in record order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        (0..self.len()).filter_map(move |i| self.sample(i))
    }

    fn push(&mut self, sample: Sample) {
        self.board.push(sample.board);
        self.toolchain.push(sample.toolchain);
        self.runtime.push(sample.runtime);
        self.resources.push(sample.resources);
        self.maximum_memory_use.push(sample.maximum_memory_use);
        self.max_freq.push(sample.max_freq);
        self.device.push(sample.device);
        if let Some(w) = &mut self.wirelength {
            w.push(sample.wirelength.unwrap_or(Value::Null));
        }
    }
}

/// Results of one project in one run, as written to the result store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAggregate {
    /// Column-oriented samples.
    pub results: RunResults,
    /// Representative date of the run, in the harness date format.
    pub date: String,
}

/// An aggregate under construction.
#[derive(Debug, Clone)]
pub struct AggregateBuilder {
    results: RunResults,
    earliest: Option<NaiveDateTime>,
}

impl AggregateBuilder {
    fn new(with_wirelength: bool) -> Self {
        Self {
            results: RunResults::new(with_wirelength),
            earliest: None,
        }
    }

    /// Append one whole sample to every column.
    pub fn push(&mut self, sample: Sample) {
        self.results.push(sample);
    }

    /// Record the date of an accepted record.
    pub fn observe_date(&mut self, date: NaiveDateTime) {
        self.earliest = Some(match self.earliest {
            Some(current) if current <= date => current,
            _ => date,
        });
    }

    /// Earliest date observed for this project.
    pub fn earliest(&self) -> Option<NaiveDateTime> {
        self.earliest
    }

    /// Samples accumulated so far.
    pub fn results(&self) -> &RunResults {
        &self.results
    }
}

/// Accumulates per-project aggregates during a merge.
///
/// [`ProjectsBuilder::entry`] hands out a fresh builder the first time a
/// project is seen and the existing one afterwards. Dates are assigned once,
/// in [`ProjectsBuilder::finish`].
#[derive(Debug, Clone)]
pub struct ProjectsBuilder {
    with_wirelength: bool,
    projects: BTreeMap<String, AggregateBuilder>,
}

impl ProjectsBuilder {
    /// Create an empty builder. `with_wirelength` fixes whether aggregates
    /// carry the `wirelength` column.
    pub fn new(with_wirelength: bool) -> Self {
        Self {
            with_wirelength,
            projects: BTreeMap::new(),
        }
    }

    /// Builder for `project`, created on first touch.
    pub fn entry(&mut self, project: &str) -> &mut AggregateBuilder {
        let with_wirelength = self.with_wirelength;
        self.projects
            .entry(project.to_string())
            .or_insert_with(|| AggregateBuilder::new(with_wirelength))
    }

    /// Number of projects touched so far.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether no project has been touched.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Finalize, asking `date_for` for each project's date.
    pub fn finish<F>(self, mut date_for: F) -> BTreeMap<String, ProjectAggregate>
    where
        F: FnMut(&str, &AggregateBuilder) -> String,
    {
        self.projects
            .into_iter()
            .map(|(name, builder)| {
                let date = date_for(&name, &builder);
                let aggregate = ProjectAggregate {
                    results: builder.results,
                    date,
                };
                (name, aggregate)
            })
            .collect()
    }

    /// Finalize, stamping every project with the same date.
    pub fn finish_with_date(self, date: &str) -> BTreeMap<String, ProjectAggregate> {
        self.finish(|_, _| date.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(board: &str, toolchain: &str) -> Sample {
        Sample {
            board: json!(board),
            toolchain: json!(toolchain),
            runtime: json!({"total": 12.5}),
            resources: json!({"LUT": 100}),
            maximum_memory_use: json!(512.0),
            max_freq: json!(80.0),
            device: json!("xc7a35t"),
            wirelength: None,
        }
    }

    #[test]
    fn test_entry_reuses_existing_builder() {
        let mut builder = ProjectsBuilder::new(false);
        builder.entry("blinky").push(sample("arty", "vivado"));
        builder.entry("blinky").push(sample("arty", "nextpnr"));
        builder.entry("picorv32").push(sample("basys3", "vivado"));

        assert_eq!(builder.len(), 2);
        let projects = builder.finish_with_date("2021-1-1T0:0:0");
        assert_eq!(projects["blinky"].results.len(), 2);
        assert_eq!(projects["picorv32"].results.len(), 1);
        assert_eq!(projects["picorv32"].date, "2021-1-1T0:0:0");
    }

    #[test]
    fn test_missing_wirelength_is_padded_with_null() {
        let mut builder = ProjectsBuilder::new(true);
        let mut with = sample("arty", "vivado");
        with.wirelength = Some(json!(1234));
        builder.entry("blinky").push(with);
        builder.entry("blinky").push(sample("arty", "nextpnr"));

        let projects = builder.finish_with_date("2021-1-1T0:0:0");
        let results = &projects["blinky"].results;
        assert!(results.is_aligned());
        assert_eq!(results.sample(1).unwrap().wirelength, Some(Value::Null));
    }

    #[test]
    fn test_observe_date_keeps_earliest() {
        let mut builder = ProjectsBuilder::new(false);
        let entry = builder.entry("blinky");
        let late = crate::date::parse_date("2021-5-1T0:0:0").unwrap();
        let early = crate::date::parse_date("2021-1-1T0:0:0").unwrap();
        entry.observe_date(late);
        entry.observe_date(early);
        entry.observe_date(late);
        assert_eq!(entry.earliest(), Some(early));
    }

    #[test]
    fn test_serialized_key_order() {
        let mut builder = ProjectsBuilder::new(false);
        builder.entry("blinky").push(sample("arty", "vivado"));
        let projects = builder.finish_with_date("2021-1-1T0:0:0");
        let json = serde_json::to_string(&projects["blinky"]).unwrap();

        let results_at = json.find("\"results\"").unwrap();
        let date_at = json.find("\"date\"").unwrap();
        let board_at = json.find("\"board\"").unwrap();
        let device_at = json.find("\"device\"").unwrap();
        assert!(results_at < date_at);
        assert!(board_at < device_at);
        assert!(!json.contains("wirelength"));
    }

    #[test]
    fn test_misaligned_input_is_detected() {
        let stored = json!({
            "results": {
                "board": ["arty", "arty"],
                "toolchain": ["vivado"],
                "runtime": [{}],
                "resources": [{}],
                "maximum_memory_use": [1],
                "max_freq": [1],
                "device": ["x"]
            },
            "date": "2021-1-1T0:0:0"
        });
        let aggregate: ProjectAggregate = serde_json::from_value(stored).unwrap();
        assert!(!aggregate.results.is_aligned());
        assert_eq!(aggregate.results.column_lengths()["board"], 2);
    }
}
