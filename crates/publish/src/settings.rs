// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The deploy configuration file.
//!
//! ```json
//! {
//!     "github": {
//!         "access_token": "ghp_...",
//!         "repo": "fpga-tool-perf-pages",
//!         "branch": "gh-pages"
//!     }
//! }
//! ```
//!
//! `username` and `password` may replace `access_token`. Keys can be
//! overridden from the environment, e.g. `PERF_GRAPHS_GITHUB__ACCESS_TOKEN`.

use crate::error::{PublishError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "PERF_GRAPHS";

#[derive(Debug, Default, Deserialize)]
struct RawDeployConfig {
    github: Option<RawGithub>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGithub {
    access_token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    repo: Option<String>,
    branch: Option<String>,
}

/// How to authenticate against GitHub.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Personal access token.
    Token(String),
    /// Username and password.
    Basic {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Validated deploy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Credentials to authenticate with.
    pub credentials: Credentials,
    /// Repository, either `owner/name` or a name owned by the authenticated user.
    pub repo: String,
    /// Branch the pages are committed to.
    pub branch: String,
}

impl DeployConfig {
    /// Load and validate the configuration file at `path`, with
    /// environment overrides applied.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::from(path.as_ref()).format(FileFormat::Json);
        Self::from_sources(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Parse and validate configuration JSON, without environment overrides.
    pub fn from_json(json: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?;
        Self::validate(config.try_deserialize()?)
    }

    fn from_sources(file: File<config::FileSourceFile, FileFormat>, env: Environment) -> Result<Self> {
        let config = Config::builder()
            .add_source(file)
            .add_source(env.prefix_separator("_").separator("__"))
            .build()?;
        Self::validate(config.try_deserialize()?)
    }

    fn validate(raw: RawDeployConfig) -> Result<Self> {
        let github = raw.github.ok_or(PublishError::MissingSection)?;
        let repo = non_empty(github.repo).ok_or(PublishError::MissingKey("repo name"))?;
        let branch = non_empty(github.branch).ok_or(PublishError::MissingKey("branch name"))?;

        let credentials = match non_empty(github.access_token) {
            Some(token) => Credentials::Token(token),
            None => {
                warn!(
                    "Github access token is not defined, falling back to username and password. \
                     It's highly recommended to use tokens instead."
                );
                match (non_empty(github.username), non_empty(github.password)) {
                    (Some(username), Some(password)) => Credentials::Basic { username, password },
                    _ => return Err(PublishError::MissingKey("username or password")),
                }
            }
        };

        Ok(Self {
            credentials,
            repo,
            branch,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
