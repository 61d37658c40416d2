// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The paginated listing protocol.
//!
//! A listing request names a prefix and a delimiter; the answer is a page of
//! "directory-like" prefixes plus an optional token for the next page.
//! [`Listing`] turns that into lazy iterators that request one page at a time
//! and can be restarted by calling them again.

use crate::error::Result;
use serde::Deserialize;
use std::collections::VecDeque;

/// Parameters of a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Only objects under this prefix are listed.
    pub prefix: String,
    /// Names are cut after the first occurrence of this delimiter.
    pub delimiter: String,
}

impl ListQuery {
    /// Create a new query.
    pub fn new(prefix: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: delimiter.into(),
        }
    }
}

/// One page of a listing response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    /// Prefixes on this page.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Token of the next page, absent on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Object store holding harness results.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectStore {
    /// Fetch one page of a listing.
    fn list_page(&self, query: &ListQuery, page_token: Option<String>) -> Result<ListPage>;

    /// Download the raw content of an object.
    fn download(&self, path: &str) -> Result<Vec<u8>>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn list_page(&self, query: &ListQuery, page_token: Option<String>) -> Result<ListPage> {
        (**self).list_page(query, page_token)
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        (**self).download(path)
    }
}

/// A listing that can be walked any number of times.
#[derive(Debug)]
pub struct Listing<'a, S: ?Sized> {
    store: &'a S,
    query: ListQuery,
}

impl<'a, S: ObjectStore + ?Sized> Listing<'a, S> {
    /// Create a listing of `query` on `store`.
    pub fn new(store: &'a S, query: ListQuery) -> Self {
        Self { store, query }
    }

    /// The query being listed.
    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Pages of the listing, from the first one.
    pub fn pages(&self) -> Pages<'a, S> {
        Pages {
            store: self.store,
            query: self.query.clone(),
            token: None,
            done: false,
        }
    }

    /// Prefixes of all pages, from the first page.
    pub fn prefixes(&self) -> Prefixes<'a, S> {
        Prefixes {
            pages: self.pages(),
            buffered: VecDeque::new(),
        }
    }
}

/// Lazy iterator over listing pages.
///
/// Stops after the first page without a token, or after yielding an error.
pub struct Pages<'a, S: ?Sized> {
    store: &'a S,
    query: ListQuery,
    token: Option<String>,
    done: bool,
}

impl<S: ObjectStore + ?Sized> Iterator for Pages<'_, S> {
    type Item = Result<ListPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.store.list_page(&self.query, self.token.clone()) {
            Ok(page) => {
                self.token = page.next_page_token.clone().filter(|t| !t.is_empty());
                self.done = self.token.is_none();
                Some(Ok(page))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Lazy iterator over the prefixes of every page.
pub struct Prefixes<'a, S: ?Sized> {
    pages: Pages<'a, S>,
    buffered: VecDeque<String>,
}

impl<S: ObjectStore + ?Sized> Iterator for Prefixes<'_, S> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(prefix) = self.buffered.pop_front() {
                return Some(Ok(prefix));
            }
            match self.pages.next()? {
                Ok(page) => self.buffered.extend(page.prefixes),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
