use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::SCRIPTS_PACKAGE;
use crate::paths;
use crate::process::{CommandLine, CommandRunner, SystemRunner};

/// Tools a theme build relies on
const TOOLS: &[&str] = &["node", "npm", "yarn", "git", "hg"];

#[derive(Debug, Serialize, Deserialize)]
pub struct Environment {
    pub os: String,
    pub arch: String,
    pub current_dir: String,
    pub softserve: String,
    pub tools: BTreeMap<String, ToolInfo>,
    /// Generator packages installed below the current directory
    pub packages: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolInfo {
    pub available: bool,
    pub version: Option<String>,
    pub path: Option<String>,
}

impl Environment {
    pub fn detect() -> Result<Self> {
        Ok(Self::detect_with(&SystemRunner, &env::current_dir()?))
    }

    pub fn detect_with(runner: &dyn CommandRunner, cwd: &Path) -> Self {
        let mut env = Environment {
            os: env::consts::OS.to_string(),
            arch: env::consts::ARCH.to_string(),
            current_dir: cwd.display().to_string(),
            softserve: env!("CARGO_PKG_VERSION").to_string(),
            tools: BTreeMap::new(),
            packages: BTreeMap::new(),
        };

        env.detect_tools(runner, cwd);
        env.packages.insert(
            SCRIPTS_PACKAGE.to_string(),
            installed_version(cwd, SCRIPTS_PACKAGE),
        );
        env
    }

    fn detect_tools(&mut self, runner: &dyn CommandRunner, cwd: &Path) {
        for tool in TOOLS {
            let path = which::which(tool).ok().map(|p| p.display().to_string());
            let version = runner.first_line(&CommandLine::new(tool, ["--version"]), cwd);
            let info = ToolInfo {
                available: path.is_some() || version.is_some(),
                version,
                path,
            };
            self.tools.insert(tool.to_string(), info);
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `version` field of `node_modules/<package>/package.json`
fn installed_version(cwd: &Path, package: &str) -> Option<String> {
    let content = fs::read_to_string(paths::installed_package_json(cwd, package)).ok()?;
    let manifest: Value = serde_json::from_str(&content).ok()?;
    manifest
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Environment Info:")?;
        writeln!(f)?;
        writeln!(f, "  System:")?;
        writeln!(f, "    OS: {} ({})", self.os, self.arch)?;
        writeln!(f, "    Directory: {}", self.current_dir)?;
        writeln!(f, "    softserve: {}", self.softserve)?;
        writeln!(f, "  Binaries:")?;
        for (tool, info) in &self.tools {
            match (&info.version, &info.path) {
                (Some(version), Some(path)) => writeln!(f, "    {tool}: {version} - {path}")?,
                (Some(version), None) => writeln!(f, "    {tool}: {version}")?,
                (None, Some(path)) => writeln!(f, "    {tool}: unknown version - {path}")?,
                (None, None) => writeln!(f, "    {tool}: Not Found")?,
            }
        }
        writeln!(f, "  npmPackages:")?;
        for (package, version) in &self.packages {
            writeln!(
                f,
                "    {package}: {}",
                version.as_deref().unwrap_or("Not Found")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::FakeRunner;
    use tempfile::TempDir;

    #[test]
    fn reports_versions_and_installed_generator() {
        let temp = TempDir::new().unwrap();
        let manifest = paths::installed_package_json(temp.path(), SCRIPTS_PACKAGE);
        fs::create_dir_all(manifest.parent().unwrap()).unwrap();
        fs::write(&manifest, r#"{"name": "softserve-scripts", "version": "1.4.0"}"#).unwrap();
        let runner = FakeRunner::new()
            .on("node --version", 0, "v18.19.0\n")
            .missing("hg");

        let env = Environment::detect_with(&runner, temp.path());

        assert_eq!(env.tools["node"].version.as_deref(), Some("v18.19.0"));
        assert_eq!(env.tools["hg"].version, None);
        assert_eq!(env.tools.len(), TOOLS.len());
        assert_eq!(env.packages[SCRIPTS_PACKAGE].as_deref(), Some("1.4.0"));

        let text = env.to_string();
        assert!(text.contains("node: v18.19.0"));
        assert!(text.contains("softserve-scripts: 1.4.0"));
    }

    #[test]
    fn json_lists_every_tool() {
        let temp = TempDir::new().unwrap();
        let env = Environment::detect_with(&FakeRunner::new(), temp.path());
        let json: Value = serde_json::from_str(&env.to_json().unwrap()).unwrap();
        for tool in TOOLS {
            assert!(json["tools"].get(tool).is_some(), "missing {tool}");
        }
        assert_eq!(json["packages"][SCRIPTS_PACKAGE], Value::Null);
    }
}
