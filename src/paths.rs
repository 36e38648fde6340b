//! Single source of truth for every path softserve reads or writes.
//!
//! No I/O, no validation. One file shows the whole layout.
//!
//! # User Level (~/.softserve/)
//!
//! ```text
//! ~/.softserve/
//! └── config.toml              # User defaults (use_npm, scripts_version, git)
//! ```
//!
//! # WordPress Project
//!
//! ```text
//! <wordpress-root>/
//! ├── wp-config.php
//! └── wp-content/
//!     └── themes/
//!         └── <theme>/             # Theme root
//!             ├── package.json
//!             ├── .gitignore       # Renamed from template `gitignore`
//!             └── node_modules/
//!                 └── softserve-scripts/
//!                     ├── package.json
//!                     └── template/
//! ```

use std::path::{Path, PathBuf};

/// Marker directory of a WordPress installation
pub const WP_CONTENT: &str = "wp-content";

/// Directory themes live in, below `wp-content`
pub const THEMES: &str = "themes";

// =============================================================================
// User Level (~/.softserve/)
// =============================================================================

/// User's softserve home: `$SOFTSERVE_HOME` or `~/.softserve/`
pub fn softserve_home() -> PathBuf {
    if let Some(home) = std::env::var_os("SOFTSERVE_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".softserve")
}

/// User defaults: `~/.softserve/config.toml`
pub fn user_config_path() -> PathBuf {
    softserve_home().join("config.toml")
}

// =============================================================================
// WordPress Project
// =============================================================================

/// Themes directory of a WordPress root: `<root>/wp-content/themes`
pub fn themes_dir(wordpress_root: &Path) -> PathBuf {
    wordpress_root.join(WP_CONTENT).join(THEMES)
}

// =============================================================================
// Theme Root
// =============================================================================

/// Theme manifest: `<theme>/package.json`
pub fn package_json(theme_root: &Path) -> PathBuf {
    theme_root.join("package.json")
}

/// Installed package directory: `<theme>/node_modules/<package>`
pub fn installed_package(theme_root: &Path, package: &str) -> PathBuf {
    theme_root.join("node_modules").join(package)
}

/// Manifest of an installed package
pub fn installed_package_json(theme_root: &Path, package: &str) -> PathBuf {
    installed_package(theme_root, package).join("package.json")
}

/// Template tree shipped by the generator package
pub fn template_dir(theme_root: &Path, package: &str) -> PathBuf {
    installed_package(theme_root, package).join("template")
}

/// Yarn lockfile, present when the theme was installed with yarn
pub fn yarn_lock(theme_root: &Path) -> PathBuf {
    theme_root.join("yarn.lock")
}
