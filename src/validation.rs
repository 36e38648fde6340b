//! Theme name validation
//!
//! A theme name becomes the `name` of the generated `package.json`, so it
//! has to pass npm's rules for new packages. It also may not shadow the
//! generator package or an existing directory next to the new theme.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::config::SCRIPTS_PACKAGE;
use crate::error::ThemeError;

const MAX_NAME_LENGTH: usize = 214;

const BLACKLISTED: &[&str] = &["node_modules", "favicon.ico"];

/// Names npm refuses because they shadow node core modules
const CORE_MODULES: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

static SCOPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@([^/]+?)/)?([^/]+?)$").expect("scoped name pattern is valid")
});

/// Result of checking a name against npm's package-name rules
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameReport {
    /// Names that npm rejects outright
    pub errors: Vec<String>,
    /// Names npm still reads but refuses for new packages
    pub warnings: Vec<String>,
}

impl NameReport {
    pub fn valid_for_new_packages(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Check `name` against npm's naming rules
pub fn check_package_name(name: &str) -> NameReport {
    let mut report = NameReport::default();

    if name.is_empty() {
        report
            .errors
            .push("name length must be greater than zero".to_string());
    }
    if name.starts_with('.') {
        report
            .errors
            .push("name cannot start with a period".to_string());
    }
    if name.starts_with('_') {
        report
            .errors
            .push("name cannot start with an underscore".to_string());
    }
    if name.trim() != name {
        report
            .errors
            .push("name cannot contain leading or trailing spaces".to_string());
    }
    for blacklisted in BLACKLISTED {
        if name.eq_ignore_ascii_case(blacklisted) {
            report.errors.push(format!("{blacklisted} is a blacklisted name"));
        }
    }

    if CORE_MODULES.contains(&name.to_lowercase().as_str()) {
        report.warnings.push(format!("{name} is a core module name"));
    }
    if name.len() > MAX_NAME_LENGTH {
        report.warnings.push(format!(
            "name can no longer contain more than {MAX_NAME_LENGTH} characters"
        ));
    }
    if name.to_lowercase() != name {
        report
            .warnings
            .push("name can no longer contain capital letters".to_string());
    }
    let last_segment = name.rsplit('/').next().unwrap_or(name);
    if last_segment.contains(['~', '\'', '!', '(', ')', '*']) {
        report.warnings.push(
            "name can no longer contain special characters (\"~'!()*\")".to_string(),
        );
    }

    if !is_uri_component_safe(name) && !is_safe_scoped_name(name) {
        report
            .errors
            .push("name can only contain URL-friendly characters".to_string());
    }

    report
}

/// `@scope/name` where both parts are URL-safe on their own
fn is_safe_scoped_name(name: &str) -> bool {
    SCOPED
        .captures(name)
        .and_then(|caps| Some((caps.get(1)?, caps.get(2)?)))
        .is_some_and(|(scope, pkg)| {
            is_uri_component_safe(scope.as_str()) && is_uri_component_safe(pkg.as_str())
        })
}

/// True when URI-component encoding would leave `s` unchanged
fn is_uri_component_safe(s: &str) -> bool {
    s.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
    })
}

/// Run every name check. Fails with the first violated group of rules.
pub fn validate_theme_name(name: &str, original_directory: &Path) -> Result<()> {
    let report = check_package_name(name);
    if !report.valid_for_new_packages() {
        return Err(ThemeError::InvalidName {
            name: name.to_string(),
            errors: report.errors,
            warnings: report.warnings,
        }
        .into());
    }

    check_not_dependency(name)?;
    check_no_sibling_directory(name, original_directory)?;

    tracing::debug!(name, "theme name accepted");
    Ok(())
}

/// Reject names that collide with the packages the theme depends on
pub fn check_not_dependency(name: &str) -> Result<()> {
    let mut dependencies = vec![SCRIPTS_PACKAGE.to_string()];
    dependencies.sort();
    if dependencies.iter().any(|dep| dep == name) {
        return Err(ThemeError::ReservedName {
            name: name.to_string(),
            reserved: dependencies,
        }
        .into());
    }
    Ok(())
}

/// Reject names already taken by a directory in `dir`
pub fn check_no_sibling_directory(name: &str, dir: &Path) -> Result<()> {
    let existing = list_directories(dir)?;
    if existing.iter().any(|d| d == name) {
        return Err(ThemeError::NameCollision {
            name: name.to_string(),
            existing,
        }
        .into());
    }
    Ok(())
}

/// Sorted names of the directories directly inside `dir`, including
/// symlinks that point at directories
pub fn list_directories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?
    {
        let entry = entry?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
