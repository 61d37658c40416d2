// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Static HTML reports of stored benchmark results.
//!
//! # Quick Start
//!
//! ```no_run
//! use perf_graphs_report::{load_projects, Site};
//! use perf_graphs_results::ResultStore;
//!
//! # fn main() -> perf_graphs_report::Result<()> {
//! let store = ResultStore::open("meta")?;
//! let projects = load_projects(&store)?;
//! let site = Site::build(&projects, None);
//! site.write_to("site")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`project`] - grouping of stored runs by board and toolchain
//! - [`metrics`] - extraction of plottable numbers from raw result values
//! - [`graph`] - the per-project graph page
//! - [`index`] - the index page
//! - [`html`] - colours and Chart.js dataset fragments
//! - [`site`] - the complete set of pages

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod graph;
pub mod html;
pub mod index;
pub mod metrics;
pub mod project;
pub mod site;

pub use error::{ReportError, Result};
pub use graph::generate_graph_html;
pub use index::generate_index_html;
pub use project::{load_projects, ProjectResults, ResultEntry};
pub use site::Site;
