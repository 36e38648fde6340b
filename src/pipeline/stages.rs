//! The individual pipeline stages

use anyhow::Result;
use colored::Colorize;

use super::Services;
use crate::config::ThemeConfig;
use crate::initializer::{
    check_dependency_declared, check_node_engine, package_base_name, InitRequest, Summary,
};
use crate::package_manager;
use crate::planner;
use crate::validation;

pub(super) fn validate_name(config: &ThemeConfig) -> Result<()> {
    validation::validate_theme_name(&config.theme_name, &config.original_directory)
}

/// Resolve the theme root and make sure creating it is safe
pub(super) fn plan_directory(config: &mut ThemeConfig) -> Result<()> {
    let root = planner::plan_root(&config.original_directory, &config.theme_name, config.mode)?;
    planner::ensure_safe_to_create(&root, &config.theme_name)?;

    println!();
    println!(
        "Creating a new WordPress theme in {}.",
        root.display().to_string().green()
    );
    println!();
    config.root = root;
    Ok(())
}

/// Settle yarn vs npm and connectivity; nothing later re-decides them
pub(super) fn probe_package_manager(config: &mut ThemeConfig, services: &Services) -> Result<()> {
    let result = package_manager::probe(
        config.use_yarn,
        services.runner.as_ref(),
        services.resolver.as_ref(),
        &config.working_dir,
    );
    config.use_yarn = result.use_yarn;
    config.is_online = result.is_online;
    config.package_to_install = package_manager::package_to_install(config.version.as_deref());
    tracing::debug!(
        use_yarn = config.use_yarn,
        is_online = config.is_online,
        package = %config.package_to_install,
        "probe complete"
    );
    Ok(())
}

pub(super) fn install(config: &mut ThemeConfig, services: &Services) -> Result<()> {
    config.working_dir = config.root.clone();
    package_manager::install(config, services.runner.as_ref())
}

/// Pre-flight checks on the installed generator, then hand over to it
pub(super) fn initialize(config: &mut ThemeConfig, services: &Services) -> Result<Summary> {
    let package = package_base_name(&config.package_to_install);
    check_node_engine(services.runner.as_ref(), &config.root, package)?;
    check_dependency_declared(&config.root, package)?;

    let initializer = services.initializers.get(package)?;
    tracing::debug!(initializer = initializer.name(), root = %config.root.display(), "initializing");
    initializer.initialize(&InitRequest {
        root: &config.root,
        theme_name: &config.theme_name,
        verbose: config.verbose,
        original_directory: &config.original_directory,
    })
}
