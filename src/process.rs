//! Subprocess and DNS seams
//!
//! The pipeline never calls `std::process::Command` or the resolver
//! directly. It goes through [`CommandRunner`] and [`HostResolver`] so the
//! whole flow can run against fakes, and every command receives an explicit
//! working directory instead of relying on the process cwd.

use anyhow::Result;
use std::fmt;
use std::net::ToSocketAddrs;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::ThemeError;

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Program and args joined by single spaces
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a quiet command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands
pub trait CommandRunner {
    /// Run with inherited stdio and wait for exit. Returns the exit code
    /// (`None` when killed by a signal). Errors only when spawning fails.
    fn run(&self, command: &CommandLine, cwd: &Path) -> Result<Option<i32>>;

    /// Run quietly and capture stdout. Errors only when spawning fails.
    fn output(&self, command: &CommandLine, cwd: &Path) -> Result<CommandOutput>;

    /// True when the command can be spawned and exits with status 0
    fn succeeds(&self, command: &CommandLine, cwd: &Path) -> bool {
        self.output(command, cwd)
            .map(|out| out.success())
            .unwrap_or(false)
    }

    /// First line of stdout when the command succeeds
    fn first_line(&self, command: &CommandLine, cwd: &Path) -> Option<String> {
        let out = self.output(command, cwd).ok()?;
        if !out.success() {
            return None;
        }
        out.stdout
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
    }
}

/// Run a command and turn a non-zero exit into [`ThemeError::CommandFailed`]
pub fn run_checked(runner: &dyn CommandRunner, command: &CommandLine, cwd: &Path) -> Result<()> {
    tracing::debug!(command = %command, cwd = %cwd.display(), "running");
    let code = runner.run(command, cwd)?;
    if code != Some(0) {
        return Err(ThemeError::CommandFailed {
            command: command.to_string(),
            code,
        }
        .into());
    }
    Ok(())
}

/// Runner backed by real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(command: &CommandLine, cwd: &Path) -> Command {
        // Resolve through PATH/PATHEXT so `npm` finds `npm.cmd` on Windows
        let program = which::which(&command.program)
            .map(|p| p.into_os_string())
            .unwrap_or_else(|_| command.program.clone().into());
        let mut cmd = Command::new(program);
        cmd.args(&command.args).current_dir(cwd);
        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandLine, cwd: &Path) -> Result<Option<i32>> {
        let status = Self::command(command, cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ThemeError::Spawn {
                command: command.to_string(),
                source,
            })?;
        Ok(status.code())
    }

    fn output(&self, command: &CommandLine, cwd: &Path) -> Result<CommandOutput> {
        let output = Self::command(command, cwd)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| ThemeError::Spawn {
                command: command.to_string(),
                source,
            })?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Answers "does this host name resolve?"
pub trait HostResolver {
    fn resolves(&self, host: &str) -> bool;
}

/// Resolver backed by the system's getaddrinfo
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolves(&self, host: &str) -> bool {
        match (host, 443).to_socket_addrs() {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(err) => {
                tracing::debug!(host, error = %err, "lookup failed");
                false
            }
        }
    }
}
