// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Render result pages and optionally publish them.

use clap::Parser;
use perf_graphs_cli::{report, ReportArgs};

fn main() {
    perf_graphs_cli::main_with(ReportArgs::parse(), report::run);
}
