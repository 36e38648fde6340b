//! Checks run before an initializer is invoked

use anyhow::{Context, Result};
use semver::{Version, VersionReq};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::ThemeError;
use crate::paths;
use crate::process::{CommandLine, CommandRunner};

/// `softserve-scripts@1.2.3` -> `softserve-scripts`, scopes preserved
pub fn package_base_name(spec: &str) -> &str {
    match spec.rfind('@') {
        Some(at) if at > 0 => &spec[..at],
        _ => spec,
    }
}

fn read_manifest(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Does `version` satisfy the npm-style `range`? `None` when the range
/// cannot be understood.
///
/// Supports `||` alternatives, space separated comparators, `a - b` hyphen
/// ranges and wildcards.
pub fn satisfies(range: &str, version: &Version) -> Option<bool> {
    let mut any_parsed = false;
    for alternative in range.split("||") {
        let Some(req) = to_version_req(alternative.trim()) else {
            continue;
        };
        any_parsed = true;
        if req.matches(version) {
            return Some(true);
        }
    }
    any_parsed.then_some(false)
}

fn to_version_req(range: &str) -> Option<VersionReq> {
    if range.is_empty() || range == "*" || range.eq_ignore_ascii_case("x") {
        return Some(VersionReq::STAR);
    }

    let tokens: Vec<&str> = range.split_whitespace().collect();
    if let [low, "-", high] = tokens.as_slice() {
        return VersionReq::parse(&format!(">={low}, <={high}")).ok();
    }

    // Re-attach operators written apart from their version (`>= 6`)
    let mut comparators: Vec<String> = Vec::new();
    let mut pending = String::new();
    for token in tokens {
        if token.chars().all(|c| "<>=~^".contains(c)) {
            pending.push_str(token);
            continue;
        }
        let token = token.trim_start_matches('v');
        let is_plain = token.chars().all(|c| c.is_ascii_digit() || c == '.');
        let comparator = if pending.is_empty() && is_plain {
            // npm reads a bare version as exact, semver's default is caret
            format!("={token}")
        } else {
            format!("{pending}{token}")
        };
        comparators.push(comparator);
        pending.clear();
    }
    VersionReq::parse(&comparators.join(", ")).ok()
}

/// Installed node version, from `node --version`
fn node_version(runner: &dyn CommandRunner, cwd: &Path) -> Option<Version> {
    let raw = runner.first_line(&CommandLine::new("node", ["--version"]), cwd)?;
    Version::parse(raw.trim_start_matches('v')).ok()
}

/// Fail when the running node does not satisfy the generator's
/// `engines.node` range. Unknown ranges or versions are skipped.
pub fn check_node_engine(runner: &dyn CommandRunner, root: &Path, package: &str) -> Result<()> {
    let manifest = read_manifest(&paths::installed_package_json(root, package))?;
    let Some(required) = manifest.pointer("/engines/node").and_then(Value::as_str) else {
        return Ok(());
    };
    let Some(current) = node_version(runner, root) else {
        tracing::warn!(required, "could not determine node version, skipping engine check");
        return Ok(());
    };
    match satisfies(required, &current) {
        Some(true) => Ok(()),
        Some(false) => Err(ThemeError::UnsupportedNode {
            current: format!("v{current}"),
            required: required.to_string(),
        }
        .into()),
        None => {
            tracing::warn!(required, "unparsable engines.node range, skipping engine check");
            Ok(())
        }
    }
}

/// The theme manifest must list the generator package as a dependency
pub fn check_dependency_declared(root: &Path, package: &str) -> Result<()> {
    let manifest = read_manifest(&paths::package_json(root))?;
    let Some(dependencies) = manifest.get("dependencies").and_then(Value::as_object) else {
        return Err(ThemeError::MissingDependencies.into());
    };
    if !dependencies.contains_key(package) {
        return Err(ThemeError::MissingDependency {
            package: package.to_string(),
        }
        .into());
    }
    Ok(())
}
