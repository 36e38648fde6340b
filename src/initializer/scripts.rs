//! Initializer for themes generated by `softserve-scripts`

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use walkdir::WalkDir;

use super::{InitRequest, Initializer, Summary, ThemeNames};
use crate::config::SCRIPTS_PACKAGE;
use crate::error::ThemeError;
use crate::git;
use crate::package_manager::PackageManager;
use crate::paths;
use crate::process::CommandRunner;

/// Browsers the generated build targets unless the theme says otherwise
pub fn default_browsers() -> Value {
    json!({
        "development": [
            "last 2 chrome versions",
            "last 2 firefox versions",
            "last 2 edge versions",
        ],
        "production": [">1%", "last 4 versions", "Firefox ESR", "not ie < 11"],
    })
}

/// Copies the generator's template into the theme and wires its scripts
pub struct ScriptsInitializer {
    runner: Rc<dyn CommandRunner>,
    init_git: bool,
}

impl ScriptsInitializer {
    pub fn new(runner: Rc<dyn CommandRunner>, init_git: bool) -> Self {
        Self { runner, init_git }
    }
}

impl Initializer for ScriptsInitializer {
    fn name(&self) -> &'static str {
        SCRIPTS_PACKAGE
    }

    fn initialize(&self, request: &InitRequest<'_>) -> Result<Summary> {
        let root = request.root;
        merge_package_json(root)?;

        let template = paths::template_dir(root, SCRIPTS_PACKAGE);
        if !template.is_dir() {
            return Err(ThemeError::MissingTemplate { path: template }.into());
        }

        let readme_renamed = rename_existing_readme(root)?;
        let names = ThemeNames::new(request.theme_name);
        let copied = copy_tree(&template, root, &names)?;
        if request.verbose {
            println!("Copied {copied} template files");
        }
        install_gitignore(root)?;

        let git_initialized = self.init_git && git::initialize_repository(self.runner.as_ref(), root)?;

        let package_manager = PackageManager::from_use_yarn(paths::yarn_lock(root).exists());
        let cd_path = if request.original_directory.join(request.theme_name) == root {
            request.theme_name.to_string()
        } else {
            root.display().to_string()
        };

        Ok(Summary {
            theme_name: request.theme_name.to_string(),
            root: root.to_path_buf(),
            cd_path,
            package_manager,
            readme_renamed,
            git_initialized,
        })
    }
}

/// Add the build scripts and browser targets to the theme manifest
fn merge_package_json(root: &Path) -> Result<()> {
    let path = paths::package_json(root);
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut manifest: Map<String, Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    manifest
        .entry("dependencies")
        .or_insert_with(|| Value::Object(Map::new()));
    manifest.insert(
        "scripts".to_string(),
        json!({
            "start": format!("{SCRIPTS_PACKAGE} start"),
            "build": format!("{SCRIPTS_PACKAGE} build"),
        }),
    );
    manifest.insert("browsersList".to_string(), default_browsers());

    fs::write(&path, serde_json::to_string_pretty(&manifest)? + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Keep a user README out of the template's way
fn rename_existing_readme(root: &Path) -> Result<bool> {
    let readme = root.join("README.md");
    if !readme.exists() {
        return Ok(false);
    }
    fs::rename(&readme, root.join("README.old.md")).context("Failed to rename README.md")?;
    Ok(true)
}

/// Copy every file below `from` into `to`, overwriting. Name tokens in
/// UTF-8 files are replaced with `names`; other files are copied as-is.
/// Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path, names: &ThemeNames) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.with_context(|| format!("Failed to walk {}", from.display()))?;
        let relative = entry.path().strip_prefix(from)?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
            continue;
        }
        let bytes = fs::read(entry.path())
            .with_context(|| format!("Failed to read {}", relative.display()))?;
        let contents = match std::str::from_utf8(&bytes) {
            Ok(text) if text.contains("{{") => names.substitute(text).into_bytes(),
            _ => bytes,
        };
        fs::write(&target, contents)
            .with_context(|| format!("Failed to copy {}", relative.display()))?;
        copied += 1;
    }
    Ok(copied)
}

/// Templates ship `gitignore` since npm drops `.gitignore` files on
/// publish. Rename it, appending to an existing `.gitignore`.
fn install_gitignore(root: &Path) -> Result<()> {
    let shipped = root.join("gitignore");
    if !shipped.exists() {
        return Ok(());
    }
    let target = root.join(".gitignore");
    if target.exists() {
        let data = fs::read(&shipped)?;
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&target)
            .context("Failed to open .gitignore")?;
        file.write_all(&data)?;
        fs::remove_file(&shipped)?;
    } else {
        fs::rename(&shipped, &target).context("Failed to rename gitignore")?;
    }
    Ok(())
}
