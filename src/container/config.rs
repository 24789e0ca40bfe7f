//! Process records and containers

use serde::{Deserialize, Serialize};

/// Raw container state as reported by the process lister
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Container ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Comma-separated names, including link aliases
    #[serde(rename = "Names")]
    pub names: String,
    /// Command line
    #[serde(rename = "Command", default)]
    pub command: String,
    /// Status text, e.g. `Up 5 minutes` or `Exited (0) 2 hours ago`
    #[serde(rename = "Status", default)]
    pub status: String,
    /// Port bindings
    #[serde(rename = "Ports", default)]
    pub ports: String,
}

impl ProcessRecord {
    /// The container's own name: the entry of `names` without a link path
    pub fn canonical_name(&self) -> Option<&str> {
        self.names
            .split(',')
            .map(|name| name.trim().trim_start_matches('/'))
            .find(|name| !name.is_empty() && !name.contains('/'))
    }
}

/// One container owned by a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Container ID
    pub id: String,
    /// Container name
    pub name: String,
    /// Instance number parsed from the name
    pub number: u32,
    /// Command line
    pub command: String,
    /// Status text
    pub status: String,
    /// Port bindings
    pub ports: String,
}

impl Container {
    /// Build a container from a matched record
    pub fn from_record(record: ProcessRecord, name: &str, number: u32) -> Self {
        Self {
            id: record.id,
            name: name.to_string(),
            number,
            command: record.command,
            status: record.status,
            ports: record.ports,
        }
    }

    /// Check if the container is running
    pub fn is_running(&self) -> bool {
        self.status.starts_with("Up")
    }
}
