//! Service definition types
//!
//! A definitions file is a top-level YAML mapping from service name to
//! [`ServiceDefinition`]. Keys this tool does not act on are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Declared services, keyed and iterated by name
pub type Definitions = BTreeMap<String, ServiceDefinition>;

/// One declared service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Image name
    #[serde(default)]
    pub image: Option<String>,
    /// Build context directory
    #[serde(default)]
    pub build: Option<String>,
    /// Command to run
    #[serde(default)]
    pub command: Option<CommandConfig>,
    /// Entrypoint
    #[serde(default)]
    pub entrypoint: Option<CommandConfig>,
    /// Links to other services, `service` or `service:alias`
    #[serde(default)]
    pub links: Vec<String>,
    /// Port mappings
    #[serde(default)]
    pub ports: Vec<PortConfig>,
    /// Ports exposed to linked services only
    #[serde(default)]
    pub expose: Vec<PortConfig>,
    /// Volume mounts, `[host:]container[:mode]`
    #[serde(default)]
    pub volumes: Vec<String>,
    /// Environment variables
    #[serde(default)]
    pub environment: Option<EnvironmentConfig>,
    /// Working directory
    #[serde(default)]
    pub working_dir: Option<String>,
    /// User
    #[serde(default)]
    pub user: Option<String>,
    /// Hostname
    #[serde(default)]
    pub hostname: Option<String>,
}

impl ServiceDefinition {
    /// Names of the services this one links to
    pub fn linked_services(&self) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .map(|link| link.split_once(':').map_or(link.as_str(), |(name, _)| name))
    }

}

/// Command configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandConfig {
    /// Shell command string
    Shell(String),
    /// Exec form array
    Exec(Vec<String>),
}

impl fmt::Display for CommandConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandConfig::Shell(s) => write!(f, "{}", s),
            CommandConfig::Exec(arr) => write!(f, "{}", arr.join(" ")),
        }
    }
}

/// Environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvironmentConfig {
    /// Array of KEY=value strings
    Array(Vec<String>),
    /// Map of key to value
    Map(BTreeMap<String, Option<ScalarValue>>),
}

/// A YAML scalar as written in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Port configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortConfig {
    /// Bare container port: `3000`
    Number(u16),
    /// Short syntax: "8080:80", "127.0.0.1:8080:80/udp"
    Short(String),
}

impl fmt::Display for PortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortConfig::Number(n) => write!(f, "{}", n),
            PortConfig::Short(s) => write!(f, "{}", s),
        }
    }
}
