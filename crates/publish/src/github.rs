// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! [`GitDatabase`] over the GitHub REST git-data API.

use crate::error::{PublishError, Result};
use crate::git::{CommitInfo, GitDatabase, TreeFile, BLOB_MODE};
use crate::settings::{Credentials, DeployConfig};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default API root.
pub const API_BASE: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// GitHub client bound to one repository.
#[derive(Debug)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    credentials: Credentials,
    owner: String,
    repo: String,
}

#[derive(Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: ShaRef,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    tree: ShaRef,
    #[serde(default)]
    parents: Vec<ShaRef>,
}

#[derive(Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Serialize)]
struct TreeEntry<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct NewTree<'a> {
    base_tree: &'a str,
    tree: Vec<TreeEntry<'a>>,
}

#[derive(Serialize)]
struct NewCommit<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
}

#[derive(Serialize)]
struct RefUpdate<'a> {
    sha: &'a str,
    force: bool,
}

impl GitHubClient {
    /// Connect to the repository named in `config`. A bare repository name
    /// is resolved against the authenticated user.
    pub fn connect(config: &DeployConfig) -> Result<Self> {
        Self::connect_to(API_BASE, config)
    }

    /// Like [`connect`](Self::connect) against another API root.
    pub fn connect_to(api_base: &str, config: &DeployConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let api_base = api_base.trim_end_matches('/').to_string();
        let http = Client::builder()
            .user_agent(concat!("perf-graphs/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|source| PublishError::Http {
                url: api_base.clone(),
                source,
            })?;

        let mut client = Self {
            http,
            api_base,
            credentials: config.credentials.clone(),
            owner: String::new(),
            repo: String::new(),
        };

        match config.repo.split_once('/') {
            Some((owner, repo)) => {
                client.owner = owner.to_string();
                client.repo = repo.to_string();
            }
            None => {
                let user: UserResponse = client.send(client.request(Method::GET, "/user"))?;
                client.owner = user.login;
                client.repo = config.repo.clone();
            }
        }
        debug!(owner = %client.owner, repo = %client.repo, "Connected to GitHub");
        Ok(client)
    }

    /// `owner/name` of the bound repository.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn repo_path(&self, rest: &str) -> String {
        format!("/repos/{}/{}/{rest}", self.owner, self.repo)
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = format!("{}{path}", self.api_base);
        let builder = self.http.request(method, &url);
        let builder = match &self.credentials {
            Credentials::Token(token) => builder.bearer_auth(token),
            Credentials::Basic { username, password } => builder.basic_auth(username, Some(password)),
        };
        (url, builder)
    }

    fn send<T: DeserializeOwned>(&self, (url, builder): (String, RequestBuilder)) -> Result<T> {
        let body = self.send_text(url.clone(), builder)?;
        serde_json::from_str(&body).map_err(|source| PublishError::Response { url, source })
    }

    fn send_text(&self, url: String, builder: RequestBuilder) -> Result<String> {
        debug!(%url, "GitHub request");
        let response = builder.send().map_err(|source| PublishError::Http {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        let body = response.text().map_err(|source| PublishError::Http {
            url: url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(PublishError::Status {
                url,
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }
}

impl GitDatabase for GitHubClient {
    fn branch_head(&self, branch: &str) -> Result<String> {
        let path = self.repo_path(&format!("git/ref/heads/{branch}"));
        let reference: RefResponse = self.send(self.request(Method::GET, &path))?;
        Ok(reference.object.sha)
    }

    fn commit(&self, sha: &str) -> Result<CommitInfo> {
        let path = self.repo_path(&format!("git/commits/{sha}"));
        let commit: CommitResponse = self.send(self.request(Method::GET, &path))?;
        Ok(CommitInfo {
            sha: commit.sha,
            tree: commit.tree.sha,
            parents: commit.parents.into_iter().map(|p| p.sha).collect(),
        })
    }

    fn create_tree(&self, base_tree: &str, files: &[TreeFile]) -> Result<String> {
        let body = NewTree {
            base_tree,
            tree: files
                .iter()
                .map(|file| TreeEntry {
                    path: &file.path,
                    mode: BLOB_MODE,
                    kind: "blob",
                    content: &file.content,
                })
                .collect(),
        };
        let (url, builder) = self.request(Method::POST, &self.repo_path("git/trees"));
        let tree: ShaRef = self.send((url, builder.json(&body)))?;
        Ok(tree.sha)
    }

    fn create_commit(&self, message: &str, tree: &str, parents: &[String]) -> Result<String> {
        let body = NewCommit {
            message,
            tree,
            parents,
        };
        let (url, builder) = self.request(Method::POST, &self.repo_path("git/commits"));
        let commit: ShaRef = self.send((url, builder.json(&body)))?;
        Ok(commit.sha)
    }

    fn update_branch(&self, branch: &str, sha: &str, force: bool) -> Result<()> {
        let path = self.repo_path(&format!("git/refs/heads/{branch}"));
        let (url, builder) = self.request(Method::PATCH, &path);
        self.send_text(url, builder.json(&RefUpdate { sha, force }))?;
        Ok(())
    }
}
