pub mod config;
pub mod environment;
pub mod error;
pub mod git;
pub mod initializer;
pub mod package_manager;
pub mod paths;
pub mod pipeline;
pub mod planner;
pub mod process;
pub mod rollback;
pub mod validation;

// Re-export commonly used types
pub use config::{InstallMode, ThemeConfig, UserConfig};
pub use environment::Environment;
pub use error::{ErrorCategory, ThemeError};
pub use pipeline::{Pipeline, PipelineFailure, PipelineState, Services};
