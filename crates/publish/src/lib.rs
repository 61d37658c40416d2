// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Publishing of generated pages to a GitHub Pages branch.
//!
//! All pages are pushed as one commit built on top of the branch tip's tree,
//! so paths that are not being published stay untouched.
//!
//! # Example
//!
//! ```no_run
//! use perf_graphs_publish::{deploy_pages, PublishMode};
//! use std::collections::BTreeMap;
//!
//! # fn main() -> perf_graphs_publish::Result<()> {
//! let mut pages = BTreeMap::new();
//! pages.insert("index.html".to_string(), "<html></html>".to_string());
//! deploy_pages("deploy.json", &pages, "auto-deploy", PublishMode::Append)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`settings`] - the deploy configuration file
//! - [`git`] - the git object seam and commit planning
//! - [`github`] - the GitHub REST implementation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod git;
pub mod github;
pub mod settings;

pub use error::{PublishError, Result};
pub use git::{publish_pages, CommitInfo, GitDatabase, PublishMode, TreeFile};
pub use github::GitHubClient;
pub use settings::{Credentials, DeployConfig};

use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Load the deploy configuration at `config_path` and publish `pages` as one
/// commit on the configured branch. Returns the new commit's sha.
pub fn deploy_pages(
    config_path: impl AsRef<Path>,
    pages: &BTreeMap<String, String>,
    message: &str,
    mode: PublishMode,
) -> Result<String> {
    let config = DeployConfig::load(config_path)?;
    let client = GitHubClient::connect(&config)?;
    let sha = publish_pages(&client, &config.branch, pages, message, mode)?;
    info!(repo = %config.repo, branch = %config.branch, %sha, "Deployed pages");
    Ok(sha)
}
