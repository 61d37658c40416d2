// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Remote layout configuration.
//!
//! Defaults point at the public `fpga-tool-perf` bucket. Every key can be
//! overridden from the environment with the `PERF_GRAPHS_` prefix, for
//! example `PERF_GRAPHS_STORAGE_API` or `PERF_GRAPHS_LEGACY_DATE_POLICY`.

use crate::error::Result;
use config::{Config, Environment};
use perf_graphs_results::{LegacyDatePolicy, RunId};
use serde::Deserialize;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "PERF_GRAPHS";

/// Where and how the harness stores its results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Object listing endpoint.
    pub storage_api: String,
    /// Base URL objects are downloaded from.
    pub download_base: String,
    /// Prefix under which every harness build stores its runs.
    pub prefix_root: String,
    /// Object name marking a compound result file.
    pub compound_delimiter: String,
    /// Object name marking a legacy result fragment.
    pub legacy_delimiter: String,
    /// How legacy runs are dated.
    pub legacy_date_policy: LegacyDatePolicy,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            storage_api: "https://www.googleapis.com/storage/v1/b/fpga-tool-perf/o".to_string(),
            download_base: "https://storage.googleapis.com/fpga-tool-perf".to_string(),
            prefix_root: "artifacts/prod/foss-fpga-tools/fpga-tool-perf".to_string(),
            compound_delimiter: "results-generic-all.json.gz".to_string(),
            legacy_delimiter: "meta.json".to_string(),
            legacy_date_policy: LegacyDatePolicy::default(),
        }
    }
}

impl RemoteConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load the configuration from an explicit environment source.
    pub fn from_environment(env: Environment) -> Result<Self> {
        let config = Config::builder().add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Prefix holding all runs of the harness build `builds`.
    pub fn results_prefix(&self, builds: &str) -> String {
        format!(
            "{}/{}",
            self.prefix_root.trim_end_matches('/'),
            builds.trim_matches('/')
        )
    }

    /// Prefix holding the results of one run.
    pub fn run_prefix(&self, builds: &str, run_id: RunId) -> String {
        format!("{}/{}/", self.results_prefix(builds), run_id)
    }

    /// Download URL of an object.
    pub fn download_url(&self, path: &str) -> String {
        format!("{}/{}", self.download_base.trim_end_matches('/'), path)
    }
}
