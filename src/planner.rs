//! Install directory planning
//!
//! Resolves where a theme goes for the selected [`InstallMode`] and checks
//! that an already existing target holds nothing we could clobber.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::InstallMode;
use crate::error::ThemeError;
use crate::paths;

/// Entries that may already sit in the target directory
const SAFE_ENTRIES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    ".git",
    ".gitignore",
    ".idea",
    "README.md",
    "LICENSE",
    "web.iml",
    ".hg",
    ".hgignore",
    ".hgcheck",
    ".npmignore",
    "mkdocs.yml",
    "docs",
    ".travis.yml",
    ".gitlab-ci.yml",
    ".gitattributes",
];

/// Resolve the absolute theme root for `theme_name` from `cwd`
pub fn plan_root(cwd: &Path, theme_name: &str, mode: InstallMode) -> Result<PathBuf> {
    match mode {
        InstallMode::Default => Ok(cwd.join(theme_name)),
        InstallMode::Here => {
            let actual = cwd
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if actual != paths::THEMES {
                return Err(ThemeError::WrongDirectory {
                    expected: paths::THEMES.to_string(),
                    actual,
                }
                .into());
            }
            Ok(cwd.join(theme_name))
        }
        InstallMode::Root => {
            if !cwd.join(paths::WP_CONTENT).is_dir() {
                return Err(ThemeError::NotProjectRoot {
                    cwd: cwd.to_path_buf(),
                }
                .into());
            }
            Ok(paths::themes_dir(cwd).join(theme_name))
        }
    }
}

/// Entries of `root` outside the allow-list, sorted. A missing root has none.
pub fn find_conflicts(root: &Path) -> Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut conflicts = Vec::new();
    for entry in
        fs::read_dir(root).with_context(|| format!("Failed to read {}", root.display()))?
    {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if !SAFE_ENTRIES.contains(&name.as_str()) {
            conflicts.push(name);
        }
    }
    conflicts.sort();
    Ok(conflicts)
}

/// Fail when `root` holds anything outside the allow-list
pub fn ensure_safe_to_create(root: &Path, theme_name: &str) -> Result<()> {
    let conflicts = find_conflicts(root)?;
    if conflicts.is_empty() {
        return Ok(());
    }
    Err(ThemeError::DirectoryConflict {
        name: theme_name.to_string(),
        conflicts,
    }
    .into())
}
