//! Typed failures of the theme pipeline
//!
//! Every expected failure mode has a variant here. They travel inside
//! `anyhow::Error` and the CLI recovers them with `downcast_ref` to decide
//! how to report the failure.

use std::path::PathBuf;
use thiserror::Error;

/// Broad class of a failure, used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input detected before anything was created
    Validation,
    /// The toolchain or the installed generator is not usable
    Environment,
    /// An external command exited unsuccessfully or could not be spawned
    Subprocess,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    // ========== Validation ==========
    #[error("Could not create a project called \"{name}\" because of npm naming restrictions:{}", bullet_list(errors.iter().chain(warnings.iter())))]
    InvalidName {
        name: String,
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    #[error(
        "We cannot create a project called {name} because a dependency with the same name exists.\n\
         Due to the way npm works, the following names are not allowed:\n{}\n\n\
         Please choose a different project name.",
        indented(reserved)
    )]
    ReservedName { name: String, reserved: Vec<String> },

    #[error(
        "We cannot create a project called {name} because a directory with the same name exists.\n{}\n\n\
         Please choose a different project name.",
        indented(existing)
    )]
    NameCollision { name: String, existing: Vec<String> },

    #[error(
        "You are running the generator in the wrong location.\n\n\
         The directory that you need to be in is: {expected}\n\
         However, the directory you are in is: {actual}\n\n\
         Just change directories to the correct location and run the generator again.\n\
         If you would like to generate the files in a different location drop the --here flag."
    )]
    WrongDirectory { expected: String, actual: String },

    #[error(
        "You are running the generator in the wrong location.\n\n\
         The directory that you are in ({}) does not contain a wp-content directory.\n\n\
         Just change directories to the root of your WordPress project (where the wp-content \
         directory and wp-config.php file are located) and run the generator again.",
        cwd.display()
    )]
    NotProjectRoot { cwd: PathBuf },

    #[error(
        "The directory {name} contains files that could conflict:\n{}\n\n\
         Either try using a new directory name, or remove the files listed above.",
        indented(conflicts)
    )]
    DirectoryConflict { name: String, conflicts: Vec<String> },

    // ========== Environment ==========
    #[error(
        "Could not start an npm process in the right directory.\n\n\
         The current directory is: {}\n\
         However, a newly started npm process runs in: {npm_cwd}\n\n\
         This is probably caused by a misconfigured system terminal shell.",
        cwd.display()
    )]
    NpmCwdMismatch { cwd: PathBuf, npm_cwd: String },

    #[error(
        "You are running Node {current}.\n\
         Softserve requires Node {required}.\n\
         Please update your version of Node."
    )]
    UnsupportedNode { current: String, required: String },

    #[error("Missing dependencies in package.json")]
    MissingDependencies,

    #[error("Unable to find {package} in package.json")]
    MissingDependency { package: String },

    #[error(
        "{package} was not installed: {} is missing.\n\
         The package manager reported success, check its output above.",
        path.display()
    )]
    PackageNotInstalled { package: String, path: PathBuf },

    #[error("No initializer is registered for {package}")]
    MissingInitializer { package: String },

    #[error("Could not locate supplied template: {}", path.display())]
    MissingTemplate { path: PathBuf },

    // ========== Subprocess ==========
    #[error("{command} has failed.")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("{command} could not be started: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ThemeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidName { .. }
            | Self::ReservedName { .. }
            | Self::NameCollision { .. }
            | Self::WrongDirectory { .. }
            | Self::NotProjectRoot { .. }
            | Self::DirectoryConflict { .. } => ErrorCategory::Validation,
            Self::NpmCwdMismatch { .. }
            | Self::UnsupportedNode { .. }
            | Self::MissingDependencies
            | Self::MissingDependency { .. }
            | Self::PackageNotInstalled { .. }
            | Self::MissingInitializer { .. }
            | Self::MissingTemplate { .. } => ErrorCategory::Environment,
            Self::CommandFailed { .. } | Self::Spawn { .. } => ErrorCategory::Subprocess,
        }
    }

    /// The command line that failed, for subprocess errors
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { command, .. } | Self::Spawn { command, .. } => Some(command),
            _ => None,
        }
    }
}

fn indented(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bullet_list<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(|item| format!("\n  *  {item}")).collect()
}
