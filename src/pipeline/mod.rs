//! Theme creation pipeline
//!
//! An ordered list of fallible stages run one after another over a single
//! [`ThemeConfig`]. The first failure stops the run; once the install
//! directory has been planned, a failure also rolls back whatever the
//! pipeline created.
//!
//! ```text
//! Idle → NameValidated → DirectoryPlanned → ProbeComplete → Installed → Initialized
//!   └──────────────┴───────────────┴────────────────┴─────────────┴──→ Failed
//! ```
//!
//! # Example
//!
//! ```no_run
//! use softserve::config::ThemeConfig;
//! use softserve::pipeline::{Pipeline, Services};
//!
//! let mut config = ThemeConfig::new("my-theme", std::env::current_dir()?);
//! let services = Services::system(config.init_git);
//! match Pipeline::new(&services).run(&mut config) {
//!     Ok(summary) => println!("{summary}"),
//!     Err(failure) => eprintln!("{}", failure.error),
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

mod stages;

use anyhow::anyhow;
use colored::Colorize;
use std::fmt;
use std::rc::Rc;

use crate::config::ThemeConfig;
use crate::error::{ErrorCategory, ThemeError};
use crate::initializer::{InitializerRegistry, Summary};
use crate::process::{CommandRunner, HostResolver, SystemResolver, SystemRunner};
use crate::rollback::{rollback, RollbackReport};

/// Progress of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Idle,
    NameValidated,
    DirectoryPlanned,
    ProbeComplete,
    Installed,
    Initialized,
    Failed,
}

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateName,
    PlanDirectory,
    ProbePackageManager,
    Install,
    Initialize,
}

impl Stage {
    /// Execution order
    pub const ORDER: [Stage; 5] = [
        Stage::ValidateName,
        Stage::PlanDirectory,
        Stage::ProbePackageManager,
        Stage::Install,
        Stage::Initialize,
    ];

    /// State reached when this stage succeeds
    pub fn reaches(self) -> PipelineState {
        match self {
            Stage::ValidateName => PipelineState::NameValidated,
            Stage::PlanDirectory => PipelineState::DirectoryPlanned,
            Stage::ProbePackageManager => PipelineState::ProbeComplete,
            Stage::Install => PipelineState::Installed,
            Stage::Initialize => PipelineState::Initialized,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ValidateName => "validate name",
            Stage::PlanDirectory => "plan directory",
            Stage::ProbePackageManager => "probe package manager",
            Stage::Install => "install",
            Stage::Initialize => "initialize",
        };
        f.write_str(name)
    }
}

/// External collaborators of the pipeline
pub struct Services {
    pub runner: Rc<dyn CommandRunner>,
    pub resolver: Rc<dyn HostResolver>,
    pub initializers: InitializerRegistry,
}

impl Services {
    /// Real processes, real DNS and the built-in initializers
    pub fn system(init_git: bool) -> Self {
        let runner: Rc<dyn CommandRunner> = Rc::new(SystemRunner);
        Self {
            initializers: InitializerRegistry::with_defaults(runner.clone(), init_git),
            runner,
            resolver: Rc::new(SystemResolver),
        }
    }
}

/// A failed run
#[derive(Debug)]
pub struct PipelineFailure {
    /// Stage that failed
    pub stage: Stage,
    pub error: anyhow::Error,
    /// Files may have been created; the abort was announced and a
    /// rollback attempted
    pub aborted: bool,
    /// Present when a rollback ran and succeeded
    pub rollback: Option<RollbackReport>,
}

/// Text shown to the user for a failed run
pub fn failure_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ThemeError>() {
        Some(err) if err.category() == ErrorCategory::Subprocess => format!("  {err}"),
        Some(err) => err.to_string(),
        None => format!("Unexpected error. Please report it as a bug:\n{error:#}"),
    }
}

/// Sequential runner with rollback on the failure path
pub struct Pipeline<'a> {
    services: &'a Services,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl<'a> Pipeline<'a> {
    pub fn new(services: &'a Services) -> Self {
        Self {
            services,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state the run passed through, in order
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Run every stage over `config`
    pub fn run(&mut self, config: &mut ThemeConfig) -> Result<Summary, PipelineFailure> {
        let mut summary = None;
        for stage in Stage::ORDER {
            tracing::debug!(%stage, state = ?self.state, "starting stage");
            let result = match stage {
                Stage::ValidateName => stages::validate_name(config),
                Stage::PlanDirectory => stages::plan_directory(config),
                Stage::ProbePackageManager => stages::probe_package_manager(config, self.services),
                Stage::Install => stages::install(config, self.services),
                Stage::Initialize => {
                    stages::initialize(config, self.services).map(|s| summary = Some(s))
                }
            };
            if let Err(error) = result {
                return Err(self.fail(stage, error, config));
            }
            self.advance(stage.reaches());
        }

        summary.ok_or_else(|| {
            self.fail(
                Stage::Initialize,
                anyhow!("initializer returned no summary"),
                config,
            )
        })
    }

    fn advance(&mut self, state: PipelineState) {
        self.state = state;
        self.history.push(state);
    }

    fn fail(&mut self, stage: Stage, error: anyhow::Error, config: &mut ThemeConfig) -> PipelineFailure {
        tracing::debug!(%stage, error = %error, "stage failed");
        // Nothing exists on disk before the directory has been planned
        let aborted = self.state >= PipelineState::DirectoryPlanned;
        let rollback = if aborted {
            println!();
            println!("Aborting installation.");
            println!("{}", failure_message(&error).red());
            match rollback(&config.root, config.created_dir.as_deref()) {
                Ok(report) => {
                    if let Some(dir) = &report.working_dir {
                        config.working_dir = dir.clone();
                    }
                    Some(report)
                }
                Err(err) => {
                    tracing::error!(error = %err, root = %config.root.display(), "rollback failed");
                    None
                }
            }
        } else {
            None
        };
        self.advance(PipelineState::Failed);
        PipelineFailure {
            stage,
            error,
            aborted,
            rollback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstallMode;
    use crate::error::ThemeError;
    use crate::initializer::{InitRequest, Initializer};
    use crate::package_manager::PackageManager;
    use crate::process::fake::{FakeResolver, FakeRunner};
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Records its invocation instead of touching the theme
    #[derive(Default)]
    struct RecordingInitializer {
        seen: Rc<RefCell<Vec<(PathBuf, String, bool, PathBuf)>>>,
    }

    impl Initializer for RecordingInitializer {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn initialize(&self, request: &InitRequest<'_>) -> anyhow::Result<Summary> {
            self.seen.borrow_mut().push((
                request.root.to_path_buf(),
                request.theme_name.to_string(),
                request.verbose,
                request.original_directory.to_path_buf(),
            ));
            Ok(Summary {
                theme_name: request.theme_name.to_string(),
                root: request.root.to_path_buf(),
                cd_path: request.theme_name.to_string(),
                package_manager: PackageManager::Npm,
                readme_renamed: false,
                git_initialized: false,
            })
        }
    }

    /// npm install that behaves like the real one: the package lands in
    /// node_modules and is recorded in package.json
    fn npm_installing() -> FakeRunner {
        FakeRunner::new()
            .on("yarn --version", 1, "")
            .hook("npm install", |_, cwd: &Path| {
                let pkg = cwd.join("node_modules").join("softserve-scripts");
                fs::create_dir_all(&pkg).unwrap();
                fs::write(pkg.join("package.json"), r#"{"name": "softserve-scripts"}"#).unwrap();
                let manifest = cwd.join("package.json");
                let mut json: serde_json::Value =
                    serde_json::from_str(&fs::read_to_string(&manifest).unwrap()).unwrap();
                json["dependencies"] = serde_json::json!({"softserve-scripts": "1.0.0"});
                fs::write(&manifest, json.to_string()).unwrap();
            })
    }

    fn services(runner: FakeRunner) -> (Services, Rc<RefCell<Vec<(PathBuf, String, bool, PathBuf)>>>) {
        let recorder = RecordingInitializer::default();
        let seen = recorder.seen.clone();
        let mut initializers = InitializerRegistry::new();
        initializers.register("softserve-scripts", Box::new(recorder));
        let services = Services {
            runner: Rc::new(runner),
            resolver: Rc::new(FakeResolver::default()),
            initializers,
        };
        (services, seen)
    }

    #[test]
    fn selects_npm_when_yarn_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let (services, seen) = services(npm_installing());
        let mut config = ThemeConfig::new("my-theme", temp.path());
        let mut pipeline = Pipeline::new(&services);

        let summary = pipeline.run(&mut config).unwrap();

        assert!(!config.use_yarn);
        assert!(config.is_online);
        assert_eq!(summary.root, temp.path().join("my-theme"));
        assert_eq!(
            *seen.borrow(),
            vec![(
                temp.path().join("my-theme"),
                "my-theme".to_string(),
                false,
                temp.path().to_path_buf()
            )]
        );
        assert_eq!(
            pipeline.history(),
            &[
                PipelineState::Idle,
                PipelineState::NameValidated,
                PipelineState::DirectoryPlanned,
                PipelineState::ProbeComplete,
                PipelineState::Installed,
                PipelineState::Initialized,
            ]
        );
    }

    #[test]
    fn validation_failure_skips_rollback() {
        let temp = TempDir::new().unwrap();
        let existing = temp.path().join("my-theme");
        fs::create_dir(&existing).unwrap();
        fs::write(existing.join("package.json"), "{}").unwrap();
        let (services, _) = services(npm_installing());
        let mut config = ThemeConfig::new("my-theme", temp.path());

        let failure = Pipeline::new(&services).run(&mut config).unwrap_err();

        assert_eq!(failure.stage, Stage::ValidateName);
        assert!(!failure.aborted);
        assert!(failure.rollback.is_none());
        assert!(existing.join("package.json").exists());
    }

    #[test]
    fn planning_failure_skips_rollback() {
        let temp = TempDir::new().unwrap();
        let (services, _) = services(npm_installing());
        let mut config = ThemeConfig::new("my-theme", temp.path());
        config.mode = InstallMode::Root;

        let mut pipeline = Pipeline::new(&services);
        let failure = pipeline.run(&mut config).unwrap_err();

        assert_eq!(failure.stage, Stage::PlanDirectory);
        assert!(failure.rollback.is_none());
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn install_failure_rolls_back() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new()
            .on("yarn --version", 1, "")
            .on("npm install", 2, "");
        let (services, seen) = services(runner);
        let mut config = ThemeConfig::new("my-theme", temp.path());

        let failure = Pipeline::new(&services).run(&mut config).unwrap_err();

        assert_eq!(failure.stage, Stage::Install);
        assert!(failure.aborted);
        assert_eq!(
            failure_message(&failure.error),
            "  npm install --save --save-exact --loglevel error softserve-scripts has failed."
        );
        assert_eq!(
            failure.error.downcast_ref::<ThemeError>().and_then(ThemeError::command),
            Some("npm install --save --save-exact --loglevel error softserve-scripts")
        );
        let report = failure.rollback.unwrap();
        assert!(report.removed_root);
        assert!(!temp.path().join("my-theme").exists());
        assert_eq!(config.working_dir, temp.path());
        assert!(seen.borrow().is_empty());
    }

    fn failing_npm_install() -> FakeRunner {
        FakeRunner::new()
            .on("yarn --version", 1, "")
            .on("npm install", 2, "")
    }

    fn remaining_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn scoped_name_rollback_removes_scope_directory() {
        let temp = TempDir::new().unwrap();
        let (services, _) = services(failing_npm_install());
        let mut config = ThemeConfig::new("@acme/theme", temp.path());

        let failure = Pipeline::new(&services).run(&mut config).unwrap_err();

        assert_eq!(failure.stage, Stage::Install);
        let report = failure.rollback.unwrap();
        assert!(report.removed_root);
        assert_eq!(report.removed_parents, vec![temp.path().join("@acme")]);
        assert!(remaining_entries(temp.path()).is_empty());
        assert_eq!(config.working_dir, temp.path());
    }

    #[test]
    fn root_mode_rollback_removes_created_themes_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("wp-content")).unwrap();
        let (services, _) = services(failing_npm_install());
        let mut config = ThemeConfig::new("my-theme", temp.path());
        config.mode = InstallMode::Root;

        let failure = Pipeline::new(&services).run(&mut config).unwrap_err();

        assert!(failure.rollback.unwrap().removed_root);
        assert_eq!(remaining_entries(temp.path()), vec!["wp-content"]);
        assert!(remaining_entries(&temp.path().join("wp-content")).is_empty());
        assert_eq!(config.working_dir, temp.path().join("wp-content"));
    }

    #[test]
    fn existing_themes_directory_survives_rollback() {
        let temp = TempDir::new().unwrap();
        let themes = temp.path().join("wp-content").join("themes");
        fs::create_dir_all(&themes).unwrap();
        let (services, _) = services(failing_npm_install());
        let mut config = ThemeConfig::new("my-theme", temp.path());
        config.mode = InstallMode::Root;

        let failure = Pipeline::new(&services).run(&mut config).unwrap_err();

        assert!(failure.rollback.unwrap().removed_parents.is_empty());
        assert!(themes.is_dir());
        assert!(remaining_entries(&themes).is_empty());
    }

    #[test]
    fn missing_dependency_declaration_rolls_back() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new()
            .on("yarn --version", 1, "")
            .hook("npm install", |_, cwd: &Path| {
                let pkg = cwd.join("node_modules").join("softserve-scripts");
                fs::create_dir_all(&pkg).unwrap();
                fs::write(pkg.join("package.json"), "{}").unwrap();
            });
        let (services, seen) = services(runner);
        let mut config = ThemeConfig::new("my-theme", temp.path());

        let failure = Pipeline::new(&services).run(&mut config).unwrap_err();

        assert_eq!(failure.stage, Stage::Initialize);
        assert!(matches!(
            failure.error.downcast_ref::<ThemeError>(),
            Some(ThemeError::MissingDependencies)
        ));
        assert!(failure.rollback.unwrap().removed_root);
        assert!(seen.borrow().is_empty());
    }
}
