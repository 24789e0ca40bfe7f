//! Definitions file parser

use super::config::{CommandConfig, Definitions, EnvironmentConfig, ScalarValue};
use crate::error::{Result, RuneCtlError};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Definitions file parser
pub struct ComposeParser;

impl ComposeParser {
    /// Parse a definitions file from path
    pub fn parse_file(path: &Path) -> Result<Definitions> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuneCtlError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_str(&content)
    }

    /// Parse definitions from string
    pub fn parse_str(content: &str) -> Result<Definitions> {
        if content.trim().is_empty() {
            return Err(RuneCtlError::ComposeParse("no services defined".to_string()));
        }

        serde_yaml::from_str(content)
            .map_err(|e| RuneCtlError::ComposeParse(format!("Failed to parse YAML: {}", e)))
    }

    /// Validate definitions
    pub fn validate(definitions: &Definitions) -> Result<()> {
        for (name, service) in definitions {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(RuneCtlError::ComposeParse(format!(
                    "Invalid service name '{}': only [a-zA-Z0-9] are allowed",
                    name
                )));
            }

            if service.image.is_none() && service.build.is_none() {
                return Err(RuneCtlError::ComposeParse(format!(
                    "Service '{}' must have either 'image' or 'build' specified",
                    name
                )));
            }

            if service.image.is_some() && service.build.is_some() {
                return Err(RuneCtlError::ComposeParse(format!(
                    "Service '{}' has both 'image' and 'build' specified",
                    name
                )));
            }

            for linked in service.linked_services() {
                if !definitions.contains_key(linked) {
                    return Err(RuneCtlError::ComposeParse(format!(
                        "Service '{}' links to unknown service '{}'",
                        name, linked
                    )));
                }
            }
        }

        Ok(())
    }

    /// Interpolate `$VAR`, `${VAR}` and `${VAR:-default}` in image, command
    /// and environment values
    pub fn interpolate(definitions: &mut Definitions, env: &BTreeMap<String, String>) {
        for service in definitions.values_mut() {
            if let Some(ref mut image) = service.image {
                *image = interpolate_string(image, env);
            }

            if let Some(ref mut command) = service.command {
                match command {
                    CommandConfig::Shell(s) => *s = interpolate_string(s, env),
                    CommandConfig::Exec(arr) => {
                        for arg in arr.iter_mut() {
                            *arg = interpolate_string(arg, env);
                        }
                    }
                }
            }

            if let Some(ref mut environment) = service.environment {
                match environment {
                    EnvironmentConfig::Map(map) => {
                        for value in map.values_mut() {
                            if let Some(ScalarValue::String(v)) = value {
                                *v = interpolate_string(v, env);
                            }
                        }
                    }
                    EnvironmentConfig::Array(arr) => {
                        for item in arr.iter_mut() {
                            *item = interpolate_string(item, env);
                        }
                    }
                }
            }
        }
    }
}

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\$(?:(\$)|\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}|([A-Za-z_][A-Za-z0-9_]*))",
        )
        .expect("variable pattern is valid")
    })
}

/// Interpolate environment variables in a string; `$$` is a literal `$`
fn interpolate_string(s: &str, env: &BTreeMap<String, String>) -> String {
    variable_pattern()
        .replace_all(s, |caps: &Captures| {
            if caps.get(1).is_some() {
                return "$".to_string();
            }

            let var = caps
                .get(2)
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());

            match (env.get(var), caps.get(3)) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default.as_str().to_string(),
                (None, None) => {
                    tracing::warn!("The {} variable is not set, substituting a blank string", var);
                    String::new()
                }
            }
        })
        .into_owned()
}
