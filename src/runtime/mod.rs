//! Container runtime access
//!
//! Everything that touches live container state goes through
//! [`ContainerRuntime`]: querying processes, the per-container lifecycle
//! primitives, and opening log streams. Each call is an independent
//! external effect.

pub mod docker;
#[cfg(test)]
pub(crate) mod fake;

pub use docker::DockerCli;

use crate::container::{Container, ProcessRecord};
use crate::error::Result;
use crate::logs::StreamKind;
use std::future::Future;
use tokio::io::AsyncBufRead;

/// A buffered byte stream read line by line
pub type LineReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// Options for following container logs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Keep streaming new output
    pub follow: bool,
    /// Prefix lines with the runtime's timestamps
    pub timestamps: bool,
    /// Only show the last N lines
    pub tail: Option<usize>,
}

/// An opened log source for one container
pub struct LogSource {
    /// Output streams, each read independently
    pub streams: Vec<(StreamKind, LineReader)>,
    /// Backing process, if any; reaped once every stream is drained
    pub child: Option<tokio::process::Child>,
}

impl LogSource {
    /// A source over in-memory or otherwise prepared streams
    pub fn from_streams(streams: Vec<(StreamKind, LineReader)>) -> Self {
        Self {
            streams,
            child: None,
        }
    }
}

impl std::fmt::Debug for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSource")
            .field("streams", &self.streams.len())
            .field("child", &self.child.as_ref().and_then(|c| c.id()))
            .finish()
    }
}

/// Access to live container state
///
/// Lifecycle calls run the runtime's client to completion, so they are
/// async and must not block the executor.
pub trait ContainerRuntime: Send + Sync {
    /// Query every container known to the runtime, running or not
    fn list_processes(&self) -> impl Future<Output = Result<Vec<ProcessRecord>>> + Send;

    /// Start a container
    fn start(&self, container: &Container) -> impl Future<Output = Result<()>> + Send;

    /// Stop a container, waiting up to `timeout` seconds before killing it
    fn stop(
        &self,
        container: &Container,
        timeout: Option<u64>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Send a signal to a container (the runtime's default when `None`)
    fn kill(
        &self,
        container: &Container,
        signal: Option<&str>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a container
    fn remove(&self, container: &Container, force: bool) -> impl Future<Output = Result<()>> + Send;

    /// Open the log streams of a container
    ///
    /// Spawning the follower does not wait for it, so this stays synchronous.
    fn follow_logs(&self, container: &Container, options: &LogOptions) -> Result<LogSource>;
}
