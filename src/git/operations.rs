//! Low-level git and mercurial operations
//!
//! All commands run quietly in an explicit directory.

use anyhow::Result;
use std::path::Path;

use crate::error::ThemeError;
use crate::process::{CommandLine, CommandRunner};

fn git<const N: usize>(args: [&str; N]) -> CommandLine {
    CommandLine::new("git", args)
}

/// Run quietly; a non-zero exit becomes [`ThemeError::CommandFailed`]
fn run_quiet(runner: &dyn CommandRunner, command: &CommandLine, cwd: &Path) -> Result<()> {
    tracing::debug!(command = %command, cwd = %cwd.display(), "running");
    let output = runner.output(command, cwd)?;
    if !output.success() {
        return Err(ThemeError::CommandFailed {
            command: command.to_string(),
            code: output.code,
        }
        .into());
    }
    Ok(())
}

/// Check that a working git binary is on PATH
pub fn is_available(runner: &dyn CommandRunner, cwd: &Path) -> bool {
    runner.succeeds(&git(["--version"]), cwd)
}

/// Check if `cwd` is inside a git work tree
pub fn is_inside_work_tree(runner: &dyn CommandRunner, cwd: &Path) -> bool {
    runner.succeeds(&git(["rev-parse", "--is-inside-work-tree"]), cwd)
}

/// Check if `cwd` is inside a mercurial repository
pub fn is_inside_mercurial(runner: &dyn CommandRunner, cwd: &Path) -> bool {
    runner.succeeds(&CommandLine::new("hg", ["--cwd", ".", "root"]), cwd)
}

/// Create an empty repository
pub fn init(runner: &dyn CommandRunner, cwd: &Path) -> Result<()> {
    run_quiet(runner, &git(["init"]), cwd)
}

/// Stage everything, including deletions
pub fn add_all(runner: &dyn CommandRunner, cwd: &Path) -> Result<()> {
    run_quiet(runner, &git(["add", "-A"]), cwd)
}

/// Commit staged changes
pub fn commit(runner: &dyn CommandRunner, cwd: &Path, message: &str) -> Result<()> {
    run_quiet(runner, &git(["commit", "-m", message]), cwd)
}
