//! Config file location.
//!
//! `ConfigLocator` finds the TOML config for a project using, in order, an
//! explicit path, a `{PROJECT}_CONFIG` environment variable, and the platform
//! config directory (`~/.config/{project}/config.toml` on Linux).
//!
//! # Example
//!
//! ```no_run
//! use sporelens_core::util::resolver::ConfigLocator;
//!
//! let locator = ConfigLocator::new("sporelens");
//! if let Some(path) = locator.resolve(None) {
//!     println!("Config: {}", path.display());
//! }
//! ```

use std::borrow::Cow;
use std::env;
use std::path::PathBuf;

/// File name used inside the platform config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolves the config file path for a specific project.
#[derive(Debug, Clone)]
pub struct ConfigLocator {
    /// Project name (e.g., "sporelens")
    project_name: String,
    /// Environment variable prefix (e.g., "SPORELENS")
    env_prefix: String,
}

impl ConfigLocator {
    /// Create a new locator for the given project name.
    ///
    /// The project name is converted to an environment variable prefix:
    /// - "sporelens" → "SPORELENS"
    /// - "spore-lens" → "SPORE_LENS"
    pub fn new(project_name: &str) -> Self {
        let env_prefix = project_name.to_uppercase().replace(['-', ' '], "_");
        Self {
            project_name: project_name.to_string(),
            env_prefix,
        }
    }

    /// Get the environment variable name for a given suffix.
    ///
    /// # Example
    /// ```
    /// use sporelens_core::util::resolver::ConfigLocator;
    ///
    /// let locator = ConfigLocator::new("sporelens");
    /// assert_eq!(locator.env_var("CONFIG"), "SPORELENS_CONFIG");
    /// ```
    pub fn env_var(&self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix, suffix)
    }

    /// Default config path in the platform config directory.
    pub fn default_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(&self.project_name).join(CONFIG_FILE_NAME))
    }

    /// Resolve the config path.
    ///
    /// Checks in order:
    /// 1. `explicit` (e.g., a `--config` flag)
    /// 2. `{PROJECT}_CONFIG` environment variable
    /// 3. Platform default path
    ///
    /// Paths are returned whether or not they exist; the caller decides
    /// whether a missing file means "use defaults".
    pub fn resolve(&self, explicit: Option<&str>) -> Option<PathBuf> {
        self.resolve_from(explicit, env::var(self.env_var("CONFIG")).ok())
    }

    fn resolve_from(&self, explicit: Option<&str>, from_env: Option<String>) -> Option<PathBuf> {
        if let Some(path) = explicit.filter(|p| !p.trim().is_empty()) {
            return Some(expand_path(path));
        }
        if let Some(path) = from_env.filter(|p| !p.trim().is_empty()) {
            return Some(expand_path(&path));
        }
        self.default_path()
    }

    /// Get the project name.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Get the environment variable prefix.
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }
}

/// Expand `~` and `$VAR`/`${VAR}` in a user-provided path.
///
/// Unknown variables are left as written.
pub fn expand_path(input: &str) -> PathBuf {
    let with_env = shellexpand::env(input).unwrap_or(Cow::Borrowed(input));
    let expanded = shellexpand::tilde(&with_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_simple_name() {
        let locator = ConfigLocator::new("sporelens");
        assert_eq!(locator.project_name(), "sporelens");
        assert_eq!(locator.env_prefix(), "SPORELENS");
    }

    #[test]
    fn test_new_kebab_case_name() {
        let locator = ConfigLocator::new("spore-lens");
        assert_eq!(locator.env_prefix(), "SPORE_LENS");
        assert_eq!(locator.env_var("CONFIG"), "SPORE_LENS_CONFIG");
    }

    #[test]
    fn test_explicit_path_wins() {
        let locator = ConfigLocator::new("sporelens");
        let resolved = locator.resolve_from(Some("/etc/sporelens.toml"), Some("/tmp/env.toml".into()));
        assert_eq!(resolved, Some(PathBuf::from("/etc/sporelens.toml")));
    }

    #[test]
    fn test_env_path_used_without_explicit() {
        let locator = ConfigLocator::new("sporelens");
        let resolved = locator.resolve_from(None, Some("/tmp/env.toml".into()));
        assert_eq!(resolved, Some(PathBuf::from("/tmp/env.toml")));
    }

    #[test]
    fn test_blank_values_fall_through_to_default() {
        let locator = ConfigLocator::new("sporelens");
        let resolved = locator.resolve_from(Some("  "), Some(String::new()));
        assert_eq!(resolved, locator.default_path());
    }

    #[test]
    fn test_default_path_shape() {
        let locator = ConfigLocator::new("sporelens");
        if let Some(path) = locator.default_path() {
            assert!(path.ends_with("sporelens/config.toml"));
        }
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("/data/fungi.json"), PathBuf::from("/data/fungi.json"));
    }

    #[test]
    fn test_expand_path_unknown_var_kept() {
        let path = expand_path("$SPORELENS_DEFINITELY_UNSET_VAR/x.toml");
        assert_eq!(path, PathBuf::from("$SPORELENS_DEFINITELY_UNSET_VAR/x.toml"));
    }
}
