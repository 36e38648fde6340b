//! Create a new WordPress theme
//!
//! # Example
//!
//! ```no_run
//! use softserve::config::InstallMode;
//!
//! let options = ThemeOptions {
//!     name: "my-theme".to_string(),
//!     mode: InstallMode::Default,
//!     verbose: false,
//!     use_npm: false,
//!     scripts_version: None,
//!     no_git: false,
//! };
//! let exit_code = execute(options)?;
//! ```

use anyhow::Result;
use colored::Colorize;
use softserve::config::{InstallMode, ThemeConfig, UserConfig};
use softserve::pipeline::{failure_message, Pipeline, Services};
use std::env;

/// Theme options collected from the command line
#[derive(Debug, Clone)]
pub struct ThemeOptions {
    pub name: String,
    pub mode: InstallMode,
    pub verbose: bool,
    pub use_npm: bool,
    pub scripts_version: Option<String>,
    pub no_git: bool,
}

/// Build the theme config and run the creation pipeline
///
/// # Configuration
///
/// User defaults from `~/.softserve/config.toml` are applied first; flags
/// given on the command line override them.
///
/// # Returns
///
/// The process exit code: 0 when the theme was created, 1 when the run
/// failed. Failures are reported before returning.
///
/// # Errors
///
/// Only for problems outside the pipeline, such as an unreadable current
/// directory or a malformed user config.
pub fn execute(options: ThemeOptions) -> Result<i32> {
    let user = UserConfig::load()?;
    let mut config = build_config(options, env::current_dir()?, &user);
    tracing::debug!(?config, "starting theme creation");

    let services = Services::system(config.init_git);
    match Pipeline::new(&services).run(&mut config) {
        Ok(summary) => {
            println!();
            println!("{summary}");
            Ok(0)
        }
        Err(failure) => {
            if failure.aborted {
                println!("Done.");
            } else {
                eprintln!("{}", failure_message(&failure.error).red());
            }
            Ok(1)
        }
    }
}

fn build_config(options: ThemeOptions, cwd: std::path::PathBuf, user: &UserConfig) -> ThemeConfig {
    let mut config = ThemeConfig::new(options.name, cwd).with_user_config(user);
    config.mode = options.mode;
    config.verbose = options.verbose;
    if options.use_npm {
        config.use_yarn = false;
    }
    if options.scripts_version.is_some() {
        config.version = options.scripts_version;
    }
    if options.no_git {
        config.init_git = false;
    }
    config
}
