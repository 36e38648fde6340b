//! Version control for new themes
//!
//! Handles:
//! - Detecting an enclosing git or mercurial repository
//! - Creating a fresh repository with one initial commit

mod operations;

pub use operations::{add_all, commit, init, is_available, is_inside_mercurial, is_inside_work_tree};

use anyhow::Result;
use std::path::Path;

use crate::process::CommandRunner;

/// Message of the single commit in a fresh theme repository
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from softserve-cli";

/// Create a repository with one commit in `root`.
///
/// Returns `Ok(false)` without touching anything when git is missing or
/// `root` already lives inside a git or mercurial repository.
pub fn initialize_repository(runner: &dyn CommandRunner, root: &Path) -> Result<bool> {
    if !is_available(runner, root) {
        tracing::debug!("git not available, skipping repository");
        return Ok(false);
    }
    if is_inside_work_tree(runner, root) || is_inside_mercurial(runner, root) {
        tracing::debug!("already inside a repository, skipping");
        return Ok(false);
    }

    init(runner, root)?;
    add_all(runner, root)?;
    commit(runner, root, INITIAL_COMMIT_MESSAGE)?;
    Ok(true)
}
