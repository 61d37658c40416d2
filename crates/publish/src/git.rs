// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Git object operations and the single-commit publishing flow.

use crate::error::{PublishError, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// File mode of a regular, non-executable blob.
pub const BLOB_MODE: &str = "100644";

/// A commit as seen by the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit sha.
    pub sha: String,
    /// Sha of the commit's root tree.
    pub tree: String,
    /// Parent commit shas.
    pub parents: Vec<String>,
}

/// A file to place in a new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    /// Repository-relative path.
    pub path: String,
    /// UTF-8 file content.
    pub content: String,
}

/// Whether the new commit follows the branch tip or replaces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PublishMode {
    /// Add a commit on top of the tip.
    #[default]
    Append,
    /// Replace the tip, reusing its parents, and force-update the branch.
    Amend,
}

impl PublishMode {
    /// `Amend` when `amend` is set.
    pub fn from_amend(amend: bool) -> Self {
        if amend {
            PublishMode::Amend
        } else {
            PublishMode::Append
        }
    }
}

/// Operations on a remote git object database.
#[cfg_attr(test, mockall::automock)]
pub trait GitDatabase {
    /// Sha of the commit `branch` points at.
    fn branch_head(&self, branch: &str) -> Result<String>;

    /// Look up a commit.
    fn commit(&self, sha: &str) -> Result<CommitInfo>;

    /// Create a tree from `base_tree` with `files` added or replaced.
    /// Returns the new tree's sha.
    fn create_tree(&self, base_tree: &str, files: &[TreeFile]) -> Result<String>;

    /// Create a commit. Returns the new commit's sha.
    fn create_commit(&self, message: &str, tree: &str, parents: &[String]) -> Result<String>;

    /// Point `branch` at `sha`. `force` allows non-fast-forward updates.
    fn update_branch(&self, branch: &str, sha: &str, force: bool) -> Result<()>;
}

/// Parents of the new commit given the current tip.
pub fn commit_parents(tip: &CommitInfo, mode: PublishMode) -> Vec<String> {
    match mode {
        PublishMode::Append => vec![tip.sha.clone()],
        PublishMode::Amend => tip.parents.clone(),
    }
}

/// Publish `pages` (path to content) as one commit on `branch`.
///
/// Paths not among `pages` keep their content from the tip. Returns the new
/// commit's sha.
pub fn publish_pages<G: GitDatabase + ?Sized>(
    git: &G,
    branch: &str,
    pages: &BTreeMap<String, String>,
    message: &str,
    mode: PublishMode,
) -> Result<String> {
    if pages.is_empty() {
        return Err(PublishError::NoPages);
    }

    let tip_sha = git.branch_head(branch)?;
    let tip = git.commit(&tip_sha)?;
    debug!(branch, tip = %tip.sha, tree = %tip.tree, "Resolved branch tip");

    let files: Vec<TreeFile> = pages
        .iter()
        .map(|(path, content)| TreeFile {
            path: path.clone(),
            content: content.clone(),
        })
        .collect();
    let tree = git.create_tree(&tip.tree, &files)?;

    let parents = commit_parents(&tip, mode);
    let commit = git.create_commit(message, &tree, &parents)?;
    git.update_branch(branch, &commit, mode == PublishMode::Amend)?;

    info!(branch, files = files.len(), commit = %commit, ?mode, "Published pages");
    Ok(commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn tip() -> CommitInfo {
        CommitInfo {
            sha: "tip".to_string(),
            tree: "tip-tree".to_string(),
            parents: vec!["parent".to_string()],
        }
    }

    fn pages() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("graphs/blinky.html".to_string(), "<p>blinky</p>".to_string()),
            ("index.html".to_string(), "<p>index</p>".to_string()),
        ])
    }

    fn expect_tip(git: &mut MockGitDatabase) {
        git.expect_branch_head()
            .with(eq("gh-pages"))
            .times(1)
            .returning(|_| Ok("tip".to_string()));
        git.expect_commit()
            .with(eq("tip"))
            .times(1)
            .returning(|_| Ok(tip()));
        git.expect_create_tree()
            .withf(|base, files| {
                base == "tip-tree"
                    && files.len() == 2
                    && files[0].path == "graphs/blinky.html"
                    && files[1].content == "<p>index</p>"
            })
            .times(1)
            .returning(|_, _| Ok("new-tree".to_string()));
    }

    #[test]
    fn test_append_commit() {
        let mut git = MockGitDatabase::new();
        expect_tip(&mut git);
        git.expect_create_commit()
            .withf(|message, tree, parents| {
                message == "auto-deploy" && tree == "new-tree" && parents == ["tip".to_string()]
            })
            .times(1)
            .returning(|_, _, _| Ok("new".to_string()));
        git.expect_update_branch()
            .with(eq("gh-pages"), eq("new"), eq(false))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let sha = publish_pages(&git, "gh-pages", &pages(), "auto-deploy", PublishMode::Append).unwrap();
        assert_eq!(sha, "new");
    }

    #[test]
    fn test_amend_commit() {
        let mut git = MockGitDatabase::new();
        expect_tip(&mut git);
        git.expect_create_commit()
            .withf(|_, _, parents| parents == ["parent".to_string()])
            .times(1)
            .returning(|_, _, _| Ok("amended".to_string()));
        git.expect_update_branch()
            .with(eq("gh-pages"), eq("amended"), eq(true))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let sha = publish_pages(&git, "gh-pages", &pages(), "auto-deploy", PublishMode::Amend).unwrap();
        assert_eq!(sha, "amended");
    }

    #[test]
    fn test_failed_tree_leaves_branch_alone() {
        let mut git = MockGitDatabase::new();
        git.expect_branch_head().returning(|_| Ok("tip".to_string()));
        git.expect_commit().returning(|_| Ok(tip()));
        git.expect_create_tree().returning(|_, _| {
            Err(PublishError::Status {
                url: "https://api.github.com/repos/o/r/git/trees".to_string(),
                status: 422,
                message: "bad tree".to_string(),
            })
        });
        git.expect_create_commit().never();
        git.expect_update_branch().never();

        let err = publish_pages(&git, "gh-pages", &pages(), "auto-deploy", PublishMode::Append).unwrap_err();
        assert!(matches!(err, PublishError::Status { status: 422, .. }));
    }

    #[test]
    fn test_nothing_to_publish() {
        let git = MockGitDatabase::new();
        let err = publish_pages(&git, "gh-pages", &BTreeMap::new(), "auto-deploy", PublishMode::Append)
            .unwrap_err();
        assert!(matches!(err, PublishError::NoPages));
    }

    #[test]
    fn test_root_commit_amend_has_no_parents() {
        let root = CommitInfo {
            sha: "root".to_string(),
            tree: "t".to_string(),
            parents: Vec::new(),
        };
        assert!(commit_parents(&root, PublishMode::Amend).is_empty());
        assert_eq!(commit_parents(&root, PublishMode::Append), vec!["root".to_string()]);
        assert_eq!(PublishMode::from_amend(true), PublishMode::Amend);
    }
}
