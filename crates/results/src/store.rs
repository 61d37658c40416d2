// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The local result store.
//!
//! One directory per project, one `meta-<run>.json` file per test run:
//!
//! ```text
//! <root>/
//!   blinky/
//!     meta-1200.json
//!     meta-1201.json
//!   picorv32/
//!     meta-1200.json
//! ```

use crate::aggregate::ProjectAggregate;
use crate::error::{Result, ResultsError};
use crate::run::{RunId, RunRange};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

static RUN_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^meta-([0-9]+)\.json$").expect("run file pattern is a valid regex")
});

const INDENT: &[u8] = b"    ";

/// File name of the stored aggregate of `run_id`.
pub fn run_file_name(run_id: RunId) -> String {
    format!("meta-{run_id}.json")
}

/// Run id encoded in a stored file name, if the name follows the pattern.
pub fn parse_run_file_name(name: &str) -> Option<RunId> {
    RUN_FILE_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Serialize an aggregate the way it is stored on disk.
pub fn to_stored_json(aggregate: &ProjectAggregate) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    aggregate
        .serialize(&mut serializer)
        .map_err(|e| ResultsError::json("stored aggregate", e))?;
    Ok(out)
}

/// One stored run of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    /// Run the aggregate belongs to.
    pub run_id: RunId,
    /// File the aggregate was read from.
    pub path: PathBuf,
    /// The aggregate itself.
    pub aggregate: ProjectAggregate,
}

/// Directory tree of per-project, per-run aggregates.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    /// Open a store rooted at an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ResultsError::NotADirectory(root));
        }
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the runs of `project`.
    pub fn project_dir(&self, project: &str) -> Result<PathBuf> {
        validate_project_name(project)?;
        Ok(self.root.join(project))
    }

    /// Write the aggregate of `project` for `run_id`, replacing any previous
    /// file for that run.
    pub fn write(&self, project: &str, run_id: RunId, aggregate: &ProjectAggregate) -> Result<PathBuf> {
        let dir = self.project_dir(project)?;
        fs::create_dir_all(&dir).map_err(|e| ResultsError::io(&dir, e))?;

        let path = dir.join(run_file_name(run_id));
        let bytes = to_stored_json(aggregate)?;
        atomic_write(&path, &bytes)?;
        debug!(project, run_id, path = %path.display(), "Stored run results");
        Ok(path)
    }

    /// Names of all project directories, sorted.
    pub fn projects(&self) -> Result<Vec<String>> {
        let mut projects = Vec::new();
        for entry in read_dir(&self.root)? {
            let path = entry.path();
            if !path.is_dir() {
                debug!(path = %path.display(), "Skipping non-directory entry");
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => projects.push(name),
                Err(name) => warn!(?name, "Skipping project directory with a non UTF-8 name"),
            }
        }
        projects.sort();
        Ok(projects)
    }

    /// Remove every stored run in `range` across all projects.
    ///
    /// Files not following the `meta-<run>.json` pattern are left alone.
    pub fn delete_range(&self, range: RunRange) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for project in self.projects()? {
            let dir = self.root.join(&project);
            for (run_id, path) in run_files(&dir)? {
                if range.contains(run_id) {
                    fs::remove_file(&path).map_err(|e| ResultsError::io(&path, e))?;
                    debug!(project = %project, run_id, "Removed stored run");
                    removed.push(path);
                }
            }
        }
        removed.sort();
        Ok(removed)
    }

    /// Every stored run of `project`, in no particular order.
    ///
    /// Files that cannot be decoded, or whose columns are misaligned, are
    /// logged and skipped.
    pub fn read_all(&self, project: &str) -> Result<Vec<StoredRun>> {
        let dir = self.project_dir(project)?;
        let mut runs = Vec::new();
        for (run_id, path) in run_files(&dir)? {
            match read_run(&path) {
                Ok(aggregate) => runs.push(StoredRun {
                    run_id,
                    path,
                    aggregate,
                }),
                Err(e) => warn!(project, run_id, error = %e, "Skipping unreadable stored run"),
            }
        }
        Ok(runs)
    }
}

/// Read one stored aggregate.
pub fn read_run(path: &Path) -> Result<ProjectAggregate> {
    let content = fs::read_to_string(path).map_err(|e| ResultsError::io(path, e))?;
    let aggregate: ProjectAggregate = serde_json::from_str(&content)
        .map_err(|e| ResultsError::json(path.display().to_string(), e))?;
    if !aggregate.results.is_aligned() {
        return Err(ResultsError::Misaligned {
            path: path.to_path_buf(),
        });
    }
    Ok(aggregate)
}

fn validate_project_name(project: &str) -> Result<()> {
    let invalid = project.is_empty()
        || project == "."
        || project == ".."
        || project.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ResultsError::InvalidProject(project.to_string()));
    }
    Ok(())
}

fn read_dir(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    fs::read_dir(dir)
        .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| ResultsError::io(dir, e))
}

fn run_files(dir: &Path) -> Result<Vec<(RunId, PathBuf)>> {
    let mut files = Vec::new();
    for entry in read_dir(dir)? {
        let name = entry.file_name();
        if let Some(run_id) = name.to_str().and_then(parse_run_file_name) {
            files.push((run_id, entry.path()));
        }
    }
    Ok(files)
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp).map_err(|e| ResultsError::io(&tmp, e))?;
        file.write_all(bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| ResultsError::io(&tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| ResultsError::io(path, e))
}
