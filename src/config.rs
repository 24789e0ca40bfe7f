//! Invocation settings
//!
//! Everything the library needs to know about its surroundings (working
//! directory, definitions file, project name) lives here and is handed to
//! [`crate::project::Project`] explicitly.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default definitions file name
pub const DEFAULT_DEFINITIONS_FILE: &str = "fig.yml";

/// Project name used when none can be derived from the working directory
pub const FALLBACK_PROJECT_NAME: &str = "default";

/// Settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory relative paths are resolved against
    pub working_dir: PathBuf,
    /// Definitions file, relative to `working_dir` unless absolute
    pub file: PathBuf,
    /// Normalized project name
    pub project_name: String,
    /// Variables available to `${VAR}` interpolation in the definitions
    pub environment: BTreeMap<String, String>,
}

impl Settings {
    /// Create settings rooted at `working_dir` with every default applied
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        let project_name = working_dir
            .file_name()
            .and_then(|s| s.to_str())
            .map(normalize_project_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string());

        Self {
            working_dir,
            file: PathBuf::from(DEFAULT_DEFINITIONS_FILE),
            project_name,
            environment: BTreeMap::new(),
        }
    }

    /// Use an alternate definitions file
    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }

    /// Use an explicit project name
    pub fn project_name(mut self, name: &str) -> Self {
        let normalized = normalize_project_name(name);
        if !normalized.is_empty() {
            self.project_name = normalized;
        }
        self
    }

    /// Variables for definitions interpolation
    pub fn environment<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.environment = vars.into_iter().collect();
        self
    }

    /// Variables for definitions interpolation from raw OS strings
    ///
    /// Entries whose name or value is not valid UTF-8 are skipped.
    pub fn environment_os<I>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let vars = vars.into_iter().filter_map(|(key, value)| {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (Ok(key), Err(_)) => {
                    tracing::warn!("Ignoring environment variable {}: value is not valid UTF-8", key);
                    None
                }
                (Err(key), _) => {
                    tracing::warn!("Ignoring environment variable {:?}: name is not valid UTF-8", key);
                    None
                }
            }
        });
        self.environment(vars)
    }

    /// Absolute path of the definitions file
    pub fn definitions_path(&self) -> PathBuf {
        resolve(&self.working_dir, &self.file)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Lowercase the name and drop everything outside `[a-z0-9]`
pub fn normalize_project_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
