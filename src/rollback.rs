//! Cleanup after a failed run
//!
//! Only files the pipeline itself creates are deleted. User files stay, and
//! the theme root is removed only when nothing else is left in it. Parent
//! directories created for the root go too, as long as they are empty.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Exact names produced by the seed step and the install
const GENERATED_FILES: &[&str] = &["package.json", "node_modules"];

/// Log files the package managers leave behind, matched by prefix
/// (`npm-debug.log.1234`, ...)
const GENERATED_LOGS: &[&str] = &["npm-debug.log", "yarn-error.log", "yarn-debug.log"];

/// What a rollback removed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RollbackReport {
    /// Entries deleted from the root, sorted
    pub deleted: Vec<String>,
    /// The root itself was removed
    pub removed_root: bool,
    /// Created parents of the root that were removed, innermost first
    pub removed_parents: Vec<PathBuf>,
    /// Working directory to continue in when the root is gone
    pub working_dir: Option<PathBuf>,
}

fn is_generated(name: &str) -> bool {
    GENERATED_FILES.contains(&name) || GENERATED_LOGS.iter().any(|log| name.starts_with(log))
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    Ok(fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .next()
        .is_none())
}

fn announce_removal(dir: &Path) {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = dir
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    println!("Deleting {} from {}", format!("{name}/").cyan(), parent.cyan());
}

/// Delete generated artifacts from `root`, then `root` itself if empty.
///
/// `created` is the topmost directory the run created on the way to
/// `root`; empty directories between the two are removed as well.
pub fn rollback(root: &Path, created: Option<&Path>) -> Result<RollbackReport> {
    let mut report = RollbackReport::default();
    if !root.is_dir() {
        return Ok(report);
    }

    let mut entries = Vec::new();
    for entry in
        fs::read_dir(root).with_context(|| format!("Failed to read {}", root.display()))?
    {
        entries.push(entry?);
    }
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_generated(&name) {
            continue;
        }
        println!("Deleting generated file... {}", name.cyan());
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
        .with_context(|| format!("Failed to delete {}", path.display()))?;
        report.deleted.push(name);
    }

    if is_empty_dir(root)? {
        announce_removal(root);
        fs::remove_dir(root).with_context(|| format!("Failed to remove {}", root.display()))?;
        report.removed_root = true;

        let mut parent = root.parent();
        if let Some(top) = created {
            while let Some(dir) = parent {
                if !dir.starts_with(top) || !is_empty_dir(dir)? {
                    break;
                }
                announce_removal(dir);
                fs::remove_dir(dir)
                    .with_context(|| format!("Failed to remove {}", dir.display()))?;
                report.removed_parents.push(dir.to_path_buf());
                parent = dir.parent();
            }
        }
        report.working_dir = parent.map(Path::to_path_buf);
    }

    tracing::debug!(?report, "rollback finished");
    Ok(report)
}
