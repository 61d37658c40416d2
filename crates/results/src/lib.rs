// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark result normalization for perf-graphs.
//!
//! The harness stores the results of a test run either as one gzip-compressed
//! compound document holding parallel columns for every project, or as many
//! small legacy `meta.json` fragments, one per project and build variant. This
//! crate turns both encodings into the same per-project shape and persists it.
//!
//! # Quick Start
//!
//! ```no_run
//! use perf_graphs_results::{normalize_compound, ResultStore};
//!
//! # fn main() -> perf_graphs_results::Result<()> {
//! let compressed = std::fs::read("results-generic-all.json.gz").unwrap();
//! let projects = normalize_compound(&compressed)?;
//!
//! let store = ResultStore::open("meta")?;
//! for (project, aggregate) in &projects {
//!     store.write(project, 1234, aggregate)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`aggregate`] - `ProjectAggregate` and the builder that keeps its columns aligned
//! - [`record`] - decoding of single legacy records
//! - [`normalize`] - the compound and legacy normalization paths
//! - [`store`] - the on-disk `meta-<run>.json` store
//! - [`date`] - the harness' date format
//! - [`run`] - run identifiers and run ranges

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod date;
pub mod error;
pub mod normalize;
pub mod record;
pub mod run;
pub mod store;

pub use aggregate::{ProjectAggregate, ProjectsBuilder, RunResults, Sample};
pub use error::{RecordError, Result, ResultsError};
pub use normalize::{
    normalize_compound, normalize_compound_json, normalize_legacy, LegacyDatePolicy, LegacyMerge,
};
pub use run::{RunBound, RunId, RunRange};
pub use store::{ResultStore, StoredRun};
