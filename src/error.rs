//! Error types for runectl

use thiserror::Error;

/// Result type for runectl operations
pub type Result<T> = std::result::Result<T, RuneCtlError>;

/// runectl error types
#[derive(Error, Debug)]
pub enum RuneCtlError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Definitions file parse error: {0}")]
    ComposeParse(String),

    #[error("{0}: service does not exist")]
    ServiceNotFound(String),

    #[error("Process query failed: {0}")]
    ProcessQuery(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Service {service}: {source}")]
    ActionFailed {
        service: String,
        #[source]
        source: Box<RuneCtlError>,
    },

    #[error("Service {service}: failed to follow logs: {source}")]
    ProducerLaunch {
        service: String,
        #[source]
        source: Box<RuneCtlError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuneCtlError {
    /// Wrap an external call failure with the service it was issued for
    pub fn action(service: &str, source: RuneCtlError) -> Self {
        RuneCtlError::ActionFailed {
            service: service.to_string(),
            source: Box::new(source),
        }
    }

    /// Wrap a log-follow launch failure with the service it was issued for
    pub fn producer_launch(service: &str, source: RuneCtlError) -> Self {
        RuneCtlError::ProducerLaunch {
            service: service.to_string(),
            source: Box::new(source),
        }
    }
}
