// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The complete set of generated pages.

use crate::error::{ReportError, Result};
use crate::graph::generate_graph_html;
use crate::index::generate_index_html;
use crate::project::ProjectResults;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory of the per-project graph pages.
pub const GRAPHS_DIR: &str = "graphs";

/// Path of the index page.
pub const INDEX_PAGE: &str = "index.html";

/// Path of the Chart.js zoom plugin, relative to the site root.
pub const ZOOM_PLUGIN_PATH: &str = "js/chartjs-plugin-zoom.min.js";

/// Characters escaped in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Site-relative path to page content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Site {
    pages: BTreeMap<String, String>,
}

impl Site {
    /// Render every page. The zoom plugin is included when its source is
    /// given.
    pub fn build(results: &[ProjectResults], zoom_plugin: Option<String>) -> Self {
        let mut pages = BTreeMap::new();
        for project in results {
            pages.insert(
                graph_page_path(&project.project_name),
                generate_graph_html(project),
            );
        }
        pages.insert(INDEX_PAGE.to_string(), generate_index_html(results));
        if let Some(script) = zoom_plugin {
            pages.insert(ZOOM_PLUGIN_PATH.to_string(), script);
        }
        Self { pages }
    }

    /// All pages keyed by site-relative path.
    pub fn pages(&self) -> &BTreeMap<String, String> {
        &self.pages
    }

    /// Take the pages out of the site.
    pub fn into_pages(self) -> BTreeMap<String, String> {
        self.pages
    }

    /// Write every page below `out_dir`, creating directories as needed.
    pub fn write_to(&self, out_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let out_dir = out_dir.as_ref();
        let mut written = Vec::with_capacity(self.pages.len());
        for (relative, content) in &self.pages {
            let path = out_dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| ReportError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, content).map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }
        info!(pages = written.len(), out_dir = %out_dir.display(), "Wrote site");
        Ok(written)
    }
}

/// Site-relative path of a project's graph page.
pub fn graph_page_path(project: &str) -> String {
    format!("{GRAPHS_DIR}/{project}.html")
}

/// Link from the site root to a project's graph page.
pub fn graph_page_href(project: &str) -> String {
    format!("{GRAPHS_DIR}/{}.html", utf8_percent_encode(project, PATH_SEGMENT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Entries;

    fn project(name: &str) -> ProjectResults {
        ProjectResults {
            project_name: name.to_string(),
            entries: Entries::new(),
        }
    }

    #[test]
    fn test_build_page_set() {
        let site = Site::build(&[project("blinky"), project("picorv32")], None);
        let paths: Vec<&str> = site.pages().keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec!["graphs/blinky.html", "graphs/picorv32.html", "index.html"]
        );

        let with_plugin = Site::build(&[project("blinky")], Some("/* zoom */".to_string()));
        assert_eq!(with_plugin.pages()[ZOOM_PLUGIN_PATH], "/* zoom */");
    }

    #[test]
    fn test_graph_page_href_encodes_segment() {
        assert_eq!(graph_page_href("blinky"), "graphs/blinky.html");
        assert_eq!(graph_page_href("50% a?b"), "graphs/50%25%20a%3Fb.html");
        assert_eq!(graph_page_path("50% a?b"), "graphs/50% a?b.html");
    }

    #[test]
    fn test_write_to_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::build(&[project("blinky")], Some("/* zoom */".to_string()));
        let written = site.write_to(dir.path()).unwrap();

        assert_eq!(written.len(), 3);
        assert!(dir.path().join("graphs/blinky.html").is_file());
        assert!(dir.path().join("index.html").is_file());
        assert_eq!(
            fs::read_to_string(dir.path().join(ZOOM_PLUGIN_PATH)).unwrap(),
            "/* zoom */"
        );
    }

    #[test]
    fn test_write_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("graphs");
        fs::write(&blocker, "not a directory").unwrap();

        let site = Site::build(&[project("blinky")], None);
        let err = site.write_to(dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
        assert!(err.to_string().contains("graphs"));
    }
}
