// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP implementation of [`ObjectStore`] for a Google Cloud Storage bucket.

use crate::error::{RemoteError, Result};
use crate::listing::{ListPage, ListQuery, ObjectStore};
use crate::settings::RemoteConfig;
use reqwest::blocking::Client;
use tracing::{debug, info};

/// Blocking client of the bucket's JSON listing API and public download URLs.
#[derive(Debug, Clone)]
pub struct GcsClient {
    http: Client,
    config: RemoteConfig,
}

impl GcsClient {
    /// Create a client for the bucket described by `config`.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("perf-graphs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| RemoteError::Http {
                url: config.storage_api.clone(),
                source,
            })?;
        Ok(Self { http, config })
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let http_err = |source: reqwest::Error| RemoteError::Http {
            url: url.to_string(),
            source,
        };
        let response = self
            .http
            .get(url)
            .query(query)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().map_err(http_err)?.to_vec())
    }
}

impl ObjectStore for GcsClient {
    fn list_page(&self, query: &ListQuery, page_token: Option<String>) -> Result<ListPage> {
        let mut params = vec![
            ("delimiter", query.delimiter.as_str()),
            ("prefix", query.prefix.as_str()),
        ];
        if let Some(token) = page_token.as_deref() {
            params.push(("pageToken", token));
        }
        debug!(prefix = %query.prefix, delimiter = %query.delimiter, "Listing objects");

        let body = self.get(&self.config.storage_api, &params)?;
        serde_json::from_slice(&body).map_err(|source| RemoteError::Listing {
            url: self.config.storage_api.clone(),
            source,
        })
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        info!(path, "Downloading");
        self.get(&self.config.download_url(path), &[])
    }
}
