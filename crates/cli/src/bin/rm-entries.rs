// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Remove a range of test runs from a local result store.

use clap::Parser;
use perf_graphs_cli::{cleanup, CleanupArgs};

fn main() {
    perf_graphs_cli::main_with(CleanupArgs::parse(), cleanup::run);
}
