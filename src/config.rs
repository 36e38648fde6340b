use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Generator package fetched into every theme
pub const SCRIPTS_PACKAGE: &str = "softserve-scripts";

/// Where the theme directory is placed relative to the current directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallMode {
    /// `<cwd>/<theme>`
    #[default]
    Default,
    /// `<cwd>/<theme>`, but cwd must be a `themes` directory
    Here,
    /// `<cwd>/wp-content/themes/<theme>`, cwd must be a WordPress root
    Root,
}

/// The record threaded through every pipeline stage
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    pub theme_name: String,
    pub mode: InstallMode,
    /// Install directory, resolved by the planner
    pub root: PathBuf,
    /// cwd at invocation time
    pub original_directory: PathBuf,
    /// Directory the next subprocess runs in
    pub working_dir: PathBuf,
    pub use_yarn: bool,
    pub is_online: bool,
    pub package_to_install: String,
    pub verbose: bool,
    pub version: Option<String>,
    pub init_git: bool,
    /// Topmost directory created to hold `root`, set by the install stage
    pub created_dir: Option<PathBuf>,
}

impl ThemeConfig {
    /// Build the initial record. `root` starts as the default-mode target
    /// and is replaced once the directory has been planned.
    pub fn new(theme_name: impl Into<String>, original_directory: impl Into<PathBuf>) -> Self {
        let theme_name = theme_name.into();
        let original_directory = original_directory.into();
        Self {
            root: original_directory.join(&theme_name),
            working_dir: original_directory.clone(),
            theme_name,
            mode: InstallMode::Default,
            original_directory,
            use_yarn: true,
            is_online: true,
            package_to_install: SCRIPTS_PACKAGE.to_string(),
            verbose: false,
            version: None,
            init_git: true,
            created_dir: None,
        }
    }

    /// Apply user defaults; explicit CLI choices are applied afterwards
    pub fn with_user_config(mut self, user: &UserConfig) -> Self {
        if user.use_npm {
            self.use_yarn = false;
        }
        if self.version.is_none() {
            self.version = user.scripts_version.clone();
        }
        self.init_git = user.git;
        self
    }
}

/// Defaults read from `~/.softserve/config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Never try yarn
    pub use_npm: bool,
    /// Pin the generator package to this version
    pub scripts_version: Option<String>,
    /// Create a git repository in new themes
    pub git: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            use_npm: false,
            scripts_version: None,
            git: true,
        }
    }
}

impl UserConfig {
    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::user_config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded user config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn new_config_targets_cwd_child() {
        let config = ThemeConfig::new("my-theme", "/srv/site");
        assert_eq!(config.root, PathBuf::from("/srv/site/my-theme"));
        assert_eq!(config.working_dir, PathBuf::from("/srv/site"));
        assert_eq!(config.package_to_install, "softserve-scripts");
        assert!(config.use_yarn);
    }

    #[test]
    fn missing_user_config_uses_defaults() -> Result<()> {
        let temp = TempDir::new()?;
        let config = UserConfig::load_from(&temp.path().join("config.toml"))?;
        assert_eq!(config, UserConfig::default());
        Ok(())
    }

    #[test]
    fn user_config_applies_defaults() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.toml");
        fs::write(&path, "use_npm = true\nscripts_version = \"1.2.0\"\ngit = false\n")?;

        let user = UserConfig::load_from(&path)?;
        let config = ThemeConfig::new("my-theme", temp.path()).with_user_config(&user);

        assert!(!config.use_yarn);
        assert!(!config.init_git);
        assert_eq!(config.version.as_deref(), Some("1.2.0"));
        Ok(())
    }

    #[test]
    fn malformed_user_config_is_an_error() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.toml");
        fs::write(&path, "use_npm = \"sometimes\"")?;
        assert!(UserConfig::load_from(&path).is_err());
        Ok(())
    }
}
