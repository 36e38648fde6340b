//! Package manager selection and invocation
//!
//! - `probe`: decide between yarn and npm, and whether we are online
//! - `install`: seed the theme manifest and fetch the generator package

mod install;
mod probe;

pub use install::{
    check_npm_can_read_cwd, check_npm_version, install, install_command, package_to_install,
    write_seed_manifest, MIN_NPM_VERSION,
};
pub use probe::{
    check_online, probe, probe_with_env, proxy_host, yarn_works, EnvLookup, ProbeResult,
    YARN_REGISTRY,
};

/// The two supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Yarn,
    Npm,
}

impl PackageManager {
    pub fn from_use_yarn(use_yarn: bool) -> Self {
        if use_yarn {
            Self::Yarn
        } else {
            Self::Npm
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::Yarn => "yarn",
            Self::Npm => "npm",
        }
    }

    /// How to run a package script, e.g. `npm run build` / `yarn build`
    pub fn run_script(self, script: &str) -> String {
        match (self, script) {
            (_, "start") | (Self::Yarn, _) => format!("{} {script}", self.program()),
            (Self::Npm, _) => format!("npm run {script}"),
        }
    }
}
