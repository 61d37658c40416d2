// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fetch test run results into a local result store.

use clap::Parser;
use perf_graphs_cli::{fetch, FetchArgs};

fn main() {
    perf_graphs_cli::main_with(FetchArgs::parse(), fetch::run);
}
