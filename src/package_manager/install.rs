//! Generator package installation

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ThemeConfig, SCRIPTS_PACKAGE};
use crate::error::ThemeError;
use crate::initializer::package_base_name;
use crate::paths;
use crate::process::{run_checked, CommandLine, CommandRunner};

/// Oldest npm that installs the generator reliably
pub const MIN_NPM_VERSION: semver::Version = semver::Version::new(3, 0, 0);

const NPM_CWD_PREFIX: &str = "; cwd = ";

/// Generator package spec, pinned when `version` is valid semver
pub fn package_to_install(version: Option<&str>) -> String {
    match version.map(|v| semver::Version::parse(v.trim_start_matches('v'))) {
        Some(Ok(pinned)) => format!("{SCRIPTS_PACKAGE}@{pinned}"),
        Some(Err(err)) => {
            tracing::warn!(version = ?version, error = %err, "ignoring invalid scripts version");
            SCRIPTS_PACKAGE.to_string()
        }
        None => SCRIPTS_PACKAGE.to_string(),
    }
}

/// Topmost directory that does not exist yet on the way down to `path`
pub fn first_missing_ancestor(path: &Path) -> Option<PathBuf> {
    let mut missing = None;
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() || ancestor.exists() {
            break;
        }
        missing = Some(ancestor.to_path_buf());
    }
    missing
}

/// Create the theme root and its initial `package.json`
pub fn write_seed_manifest(root: &Path, theme_name: &str) -> Result<()> {
    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create {}", root.display()))?;
    let manifest = json!({
        "name": theme_name,
        "version": "0.1.0",
        "private": true,
    });
    let path = paths::package_json(root);
    fs::write(&path, serde_json::to_string_pretty(&manifest)? + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// The install command for the selected package manager
pub fn install_command(config: &ThemeConfig) -> CommandLine {
    let mut command = if config.use_yarn {
        let mut cmd = CommandLine::new(
            "yarn",
            [
                "add",
                config.package_to_install.as_str(),
                "--exact",
                "--cwd",
            ],
        )
        .arg(config.root.display().to_string());
        if !config.is_online {
            cmd = cmd.arg("--offline");
        }
        cmd
    } else {
        CommandLine::new(
            "npm",
            ["install", "--save", "--save-exact", "--loglevel", "error"],
        )
        .arg(config.package_to_install.as_str())
    };
    if config.verbose {
        command = command.arg("--verbose");
    }
    command
}

/// A shell that starts npm somewhere else than asked breaks every install.
/// Output without a cwd line is accepted.
pub fn check_npm_can_read_cwd(runner: &dyn CommandRunner, cwd: &Path) -> Result<()> {
    let output = match runner.output(&CommandLine::new("npm", ["config", "list"]), cwd) {
        Ok(output) => output,
        Err(err) => {
            tracing::debug!(error = %err, "npm config list unavailable");
            return Ok(());
        }
    };
    let Some(npm_cwd) = output
        .stdout
        .lines()
        .find_map(|line| line.strip_prefix(NPM_CWD_PREFIX))
    else {
        return Ok(());
    };
    if Path::new(npm_cwd.trim()) == cwd {
        return Ok(());
    }
    Err(ThemeError::NpmCwdMismatch {
        cwd: cwd.to_path_buf(),
        npm_cwd: npm_cwd.trim().to_string(),
    }
    .into())
}

/// Installed npm version when it is older than [`MIN_NPM_VERSION`]
pub fn check_npm_version(runner: &dyn CommandRunner, cwd: &Path) -> Option<String> {
    let version = runner.first_line(&CommandLine::new("npm", ["--version"]), cwd)?;
    match semver::Version::parse(&version) {
        Ok(parsed) if parsed < MIN_NPM_VERSION => Some(version),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(version = %version, error = %err, "unparsable npm version");
            None
        }
    }
}

/// Seed the theme, sanity-check npm and fetch the generator package.
///
/// Records in `config.created_dir` which directories the seed step creates
/// so a rollback can remove them again.
pub fn install(config: &mut ThemeConfig, runner: &dyn CommandRunner) -> Result<()> {
    config.created_dir = first_missing_ancestor(&config.root);
    write_seed_manifest(&config.root, &config.theme_name)?;

    if !config.use_yarn {
        check_npm_can_read_cwd(runner, &config.root)?;
        if let Some(version) = check_npm_version(runner, &config.root) {
            println!(
                "{}",
                format!(
                    "You are using npm {version}.\n\n\
                     Please update to npm {MIN_NPM_VERSION} or higher for a better, fully supported experience.\n"
                )
                .yellow()
            );
        }
    }

    println!("Installing packages. This might take a couple of minutes.");
    if config.use_yarn && !config.is_online {
        println!("{}", "You appear to be offline.".yellow());
        println!("{}", "Falling back to the local Yarn cache.".yellow());
        println!();
    }
    println!("Installing {}...", config.package_to_install.cyan());
    println!();

    run_checked(runner, &install_command(config), &config.root)?;
    ensure_installed(&config.root, &config.package_to_install)
}

/// A zero exit is not proof; the package manifest must be on disk
fn ensure_installed(root: &Path, package_spec: &str) -> Result<()> {
    let package = package_base_name(package_spec);
    let manifest = paths::installed_package_json(root, package);
    if !manifest.is_file() {
        return Err(ThemeError::PackageNotInstalled {
            package: package.to_string(),
            path: manifest,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::FakeRunner;
    use tempfile::TempDir;

    fn config(root: &Path) -> ThemeConfig {
        let mut config = ThemeConfig::new("my-theme", root.parent().unwrap());
        config.root = root.to_path_buf();
        config
    }

    #[test]
    fn npm_command_line() {
        let mut config = ThemeConfig::new("my-theme", "/srv");
        config.use_yarn = false;
        assert_eq!(
            install_command(&config).to_string(),
            "npm install --save --save-exact --loglevel error softserve-scripts"
        );

        config.verbose = true;
        assert_eq!(
            install_command(&config).to_string(),
            "npm install --save --save-exact --loglevel error softserve-scripts --verbose"
        );
    }

    #[test]
    fn yarn_command_line() {
        let mut config = ThemeConfig::new("my-theme", "/srv");
        config.package_to_install = "softserve-scripts@1.0.0".to_string();
        let cmd = install_command(&config);
        assert_eq!(cmd.program, "yarn");
        let root = config.root.display().to_string();
        assert_eq!(
            cmd.args,
            vec!["add", "softserve-scripts@1.0.0", "--exact", "--cwd", root.as_str()]
        );

        config.is_online = false;
        assert_eq!(install_command(&config).args.last().unwrap(), "--offline");
    }

    #[test]
    fn pins_only_valid_versions() {
        assert_eq!(package_to_install(None), "softserve-scripts");
        assert_eq!(package_to_install(Some("1.2.3")), "softserve-scripts@1.2.3");
        assert_eq!(package_to_install(Some("v2.0.0")), "softserve-scripts@2.0.0");
        assert_eq!(package_to_install(Some("latest")), "softserve-scripts");
    }

    #[test]
    fn seed_manifest_contents() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path().join("my-theme");
        write_seed_manifest(&root, "my-theme")?;

        let content = fs::read_to_string(root.join("package.json"))?;
        assert_eq!(
            content,
            "{\n  \"name\": \"my-theme\",\n  \"version\": \"0.1.0\",\n  \"private\": true\n}\n"
        );
        Ok(())
    }

    #[test]
    fn failed_install_carries_exact_command() -> Result<()> {
        let temp = TempDir::new()?;
        let mut config = config(&temp.path().join("my-theme"));
        config.use_yarn = false;
        let runner = FakeRunner::new().on("npm install", 2, "");

        let err = install(&mut config, &runner).unwrap_err();
        match err.downcast_ref::<ThemeError>() {
            Some(ThemeError::CommandFailed { command, code }) => {
                assert_eq!(
                    command,
                    "npm install --save --save-exact --loglevel error softserve-scripts"
                );
                assert_eq!(*code, Some(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn install_runs_in_theme_root() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path().join("my-theme");
        let mut config = config(&root);
        let runner = FakeRunner::new().hook("yarn add", fake_install);

        install(&mut config, &runner)?;

        let calls = runner.calls.borrow();
        let (command, cwd) = calls.last().unwrap();
        assert!(command.starts_with("yarn add softserve-scripts --exact --cwd"));
        assert_eq!(cwd, &root);
        assert_eq!(config.created_dir.as_deref(), Some(root.as_path()));
        Ok(())
    }

    /// What a real package manager leaves behind
    fn fake_install(_: &CommandLine, cwd: &Path) {
        let manifest = paths::installed_package_json(cwd, SCRIPTS_PACKAGE);
        fs::create_dir_all(manifest.parent().unwrap()).unwrap();
        fs::write(manifest, "{}").unwrap();
    }

    #[test]
    fn successful_exit_without_package_is_an_error() -> Result<()> {
        let temp = TempDir::new()?;
        let mut config = config(&temp.path().join("my-theme"));
        config.use_yarn = false;
        config.package_to_install = "softserve-scripts@1.2.3".to_string();

        let err = install(&mut config, &FakeRunner::new()).unwrap_err();

        match err.downcast_ref::<ThemeError>() {
            Some(ThemeError::PackageNotInstalled { package, path }) => {
                assert_eq!(package, "softserve-scripts");
                assert!(path.ends_with("node_modules/softserve-scripts/package.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn records_topmost_created_directory() -> Result<()> {
        let temp = TempDir::new()?;
        let nested = temp.path().join("@acme").join("theme");
        assert_eq!(
            first_missing_ancestor(&nested).as_deref(),
            Some(temp.path().join("@acme").as_path())
        );
        assert_eq!(first_missing_ancestor(temp.path()), None);

        let mut config = config(&nested);
        let runner = FakeRunner::new().hook("yarn add", fake_install);
        install(&mut config, &runner)?;
        assert_eq!(config.created_dir, Some(temp.path().join("@acme")));
        Ok(())
    }

    #[test]
    fn npm_cwd_mismatch_is_fatal() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new().on("npm config list", 0, "; cwd = /somewhere/else\n");
        let err = check_npm_can_read_cwd(&runner, temp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThemeError>(),
            Some(ThemeError::NpmCwdMismatch { .. })
        ));
    }

    #[test]
    fn npm_cwd_match_or_absence_is_fine() {
        let temp = TempDir::new().unwrap();
        let listing = format!("; userconfig\n; cwd = {}\n", temp.path().display());
        let runner = FakeRunner::new().on("npm config list", 0, &listing);
        assert!(check_npm_can_read_cwd(&runner, temp.path()).is_ok());

        let runner = FakeRunner::new().missing("npm");
        assert!(check_npm_can_read_cwd(&runner, temp.path()).is_ok());
    }

    #[test]
    fn old_npm_is_reported() {
        let runner = FakeRunner::new().on("npm --version", 0, "2.15.1\n");
        assert_eq!(
            check_npm_version(&runner, Path::new(".")).as_deref(),
            Some("2.15.1")
        );
        let runner = FakeRunner::new().on("npm --version", 0, "10.2.4\n");
        assert_eq!(check_npm_version(&runner, Path::new(".")), None);
    }
}
