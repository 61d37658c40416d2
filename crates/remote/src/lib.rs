// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Remote access to harness results.
//!
//! The harness publishes its results to an object store with a paginated,
//! prefix/delimiter based listing API. This crate hides the page tokens
//! behind lazy iterators and finds, for a given test run, which of the two
//! result encodings is present.
//!
//! # Modules
//!
//! - [`listing`] - the listing protocol, the [`ObjectStore`] seam and lazy paging
//! - [`gcs`] - the HTTP implementation of [`ObjectStore`]
//! - [`locator`] - run discovery and encoding detection
//! - [`settings`] - remote layout configuration

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod gcs;
pub mod listing;
pub mod locator;
pub mod settings;

pub use error::{RemoteError, Result};
pub use gcs::GcsClient;
pub use listing::{ListPage, ListQuery, Listing, ObjectStore};
pub use locator::{ResultLocator, RunIds, RunLocation};
pub use settings::RemoteConfig;
