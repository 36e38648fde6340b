//! Package manager and connectivity probe

use std::path::Path;

use crate::process::{CommandLine, CommandRunner, HostResolver};

/// Host pinged to decide whether yarn can reach its registry
pub const YARN_REGISTRY: &str = "registry.yarnpkg.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub use_yarn: bool,
    pub is_online: bool,
}

/// Environment variable lookup
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Decide the package manager and connectivity, once.
///
/// A requested yarn is kept only if `yarn --version` succeeds. npm skips
/// the network probe entirely and is assumed online.
pub fn probe(
    requested_yarn: bool,
    runner: &dyn CommandRunner,
    resolver: &dyn HostResolver,
    cwd: &Path,
) -> ProbeResult {
    probe_with_env(requested_yarn, runner, resolver, cwd, &|var| {
        std::env::var(var).ok()
    })
}

/// [`probe`] with proxy variables read through `env`
pub fn probe_with_env(
    requested_yarn: bool,
    runner: &dyn CommandRunner,
    resolver: &dyn HostResolver,
    cwd: &Path,
    env: EnvLookup<'_>,
) -> ProbeResult {
    let use_yarn = requested_yarn && yarn_works(runner, cwd);
    if requested_yarn && !use_yarn {
        tracing::debug!("yarn is not usable, falling back to npm");
    }

    let is_online = if use_yarn {
        check_online(resolver, || configured_proxy(runner, cwd, env))
    } else {
        true
    };

    ProbeResult {
        use_yarn,
        is_online,
    }
}

/// Liveness check for the yarn binary
pub fn yarn_works(runner: &dyn CommandRunner, cwd: &Path) -> bool {
    runner.succeeds(&CommandLine::new("yarn", ["--version"]), cwd)
}

/// Resolve the yarn registry; when that fails, resolving the proxy host
/// counts as being online. The proxy is only looked up when needed.
pub fn check_online(resolver: &dyn HostResolver, proxy: impl FnOnce() -> Option<String>) -> bool {
    if resolver.resolves(YARN_REGISTRY) {
        return true;
    }
    match proxy().as_deref().and_then(proxy_host) {
        Some(host) => {
            tracing::debug!(host = %host, "registry lookup failed, trying proxy");
            resolver.resolves(&host)
        }
        None => false,
    }
}

/// Host part of a proxy URL; bare `host:port` values are accepted too
pub fn proxy_host(proxy: &str) -> Option<String> {
    let parse = |s: &str| {
        url::Url::parse(s)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    };
    parse(proxy).or_else(|| parse(&format!("http://{proxy}")))
}

/// `https_proxy`, then `HTTPS_PROXY`, then npm's `https-proxy` setting
fn configured_proxy(runner: &dyn CommandRunner, cwd: &Path, env: EnvLookup<'_>) -> Option<String> {
    for var in ["https_proxy", "HTTPS_PROXY"] {
        if let Some(value) = env(var) {
            if !value.trim().is_empty() {
                return Some(value);
            }
        }
    }
    runner
        .first_line(&CommandLine::new("npm", ["config", "get", "https-proxy"]), cwd)
        .filter(|value| value != "null" && value != "undefined")
}
