//! Theme initializers
//!
//! The generator package decides what a new theme looks like. Each
//! supported generator has an [`Initializer`] registered under its package
//! name; the pipeline looks it up after the package has been installed.

mod checks;
mod names;
mod scripts;

pub use checks::{check_dependency_declared, check_node_engine, package_base_name, satisfies};
pub use names::ThemeNames;
pub use scripts::{copy_tree, default_browsers, ScriptsInitializer};

use anyhow::Result;
use colored::Colorize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::SCRIPTS_PACKAGE;
use crate::error::ThemeError;
use crate::package_manager::PackageManager;
use crate::process::CommandRunner;

/// Arguments handed to an initializer
#[derive(Debug, Clone, Copy)]
pub struct InitRequest<'a> {
    pub root: &'a Path,
    pub theme_name: &'a str,
    pub verbose: bool,
    pub original_directory: &'a Path,
}

/// Trait for generator-specific theme setup
pub trait Initializer {
    /// Name of this initializer
    fn name(&self) -> &'static str;

    /// Turn an installed theme root into a ready-to-use theme
    fn initialize(&self, request: &InitRequest<'_>) -> Result<Summary>;
}

/// What an initializer produced, rendered as the closing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub theme_name: String,
    pub root: PathBuf,
    /// Shortest way to `cd` into the theme from the original directory
    pub cd_path: String,
    pub package_manager: PackageManager,
    pub readme_renamed: bool,
    pub git_initialized: bool,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.package_manager.run_script("start");
        let build = self.package_manager.run_script("build");

        if self.git_initialized {
            writeln!(f, "Initialized git repository")?;
            writeln!(f)?;
        }
        writeln!(
            f,
            "Success! Created {} at {}",
            self.theme_name,
            self.root.display()
        )?;
        writeln!(f, "Inside that directory, you can run several commands:")?;
        writeln!(f)?;
        writeln!(f, "{}", format!("  {start}").cyan())?;
        writeln!(f, "    Bundles the theme and watches for changes.")?;
        writeln!(f)?;
        writeln!(f, "{}", format!("  {build}").cyan())?;
        writeln!(f, "    Bundles the theme into static files for production.")?;
        writeln!(f)?;
        writeln!(f, "We suggest that you begin by typing:")?;
        writeln!(f)?;
        writeln!(f, "{} {}", "  cd".cyan(), self.cd_path)?;
        writeln!(f, "  {}", start.cyan())?;
        if self.readme_renamed {
            writeln!(f)?;
            writeln!(
                f,
                "{}",
                "You had a `README.md` file, we renamed it to `README.old.md`".yellow()
            )?;
        }
        writeln!(f)?;
        write!(f, "Happy Hacking!")
    }
}

/// Initializers by generator package name
#[derive(Default)]
pub struct InitializerRegistry {
    initializers: HashMap<String, Box<dyn Initializer>>,
}

impl InitializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `softserve-scripts` initializer
    pub fn with_defaults(runner: Rc<dyn CommandRunner>, init_git: bool) -> Self {
        let mut registry = Self::new();
        registry.register(
            SCRIPTS_PACKAGE,
            Box::new(ScriptsInitializer::new(runner, init_git)),
        );
        registry
    }

    pub fn register(&mut self, package: impl Into<String>, initializer: Box<dyn Initializer>) {
        self.initializers.insert(package.into(), initializer);
    }

    /// Look up by package name; a version suffix (`pkg@1.2.3`) is ignored
    pub fn get(&self, package: &str) -> Result<&dyn Initializer> {
        let name = package_base_name(package);
        self.initializers
            .get(name)
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| {
                ThemeError::MissingInitializer {
                    package: name.to_string(),
                }
                .into()
            })
    }
}
