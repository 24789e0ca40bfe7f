//! In-memory runtime for tests

use super::{ContainerRuntime, LineReader, LogOptions, LogSource};
use crate::container::{Container, ProcessRecord};
use crate::error::{Result, RuneCtlError};
use crate::logs::StreamKind;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Records every call and fails on request
#[derive(Default)]
pub(crate) struct FakeRuntime {
    records: Vec<ProcessRecord>,
    fail_query: bool,
    /// Container IDs whose lifecycle calls fail
    failing: HashSet<String>,
    /// Container IDs whose log launch fails
    failing_logs: HashSet<String>,
    logs: Mutex<HashMap<String, Vec<(StreamKind, LineReader)>>>,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) queries: AtomicUsize,
}

pub(crate) fn record(id: &str, name: &str) -> ProcessRecord {
    ProcessRecord {
        id: id.to_string(),
        names: name.to_string(),
        command: format!("run {}", name),
        status: "Up 2 minutes".to_string(),
        ports: String::new(),
    }
}

impl FakeRuntime {
    pub(crate) fn new(records: Vec<ProcessRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub(crate) fn failing_query(mut self) -> Self {
        self.fail_query = true;
        self
    }

    pub(crate) fn fail_on(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub(crate) fn fail_logs_on(mut self, id: &str) -> Self {
        self.failing_logs.insert(id.to_string());
        self
    }

    /// Finite stdout for a container
    pub(crate) fn with_logs(self, id: &str, lines: &[&str]) -> Self {
        self.with_stream(id, StreamKind::Stdout, finite(lines))
    }

    /// Finite stderr for a container
    pub(crate) fn with_stderr_logs(self, id: &str, lines: &[&str]) -> Self {
        self.with_stream(id, StreamKind::Stderr, finite(lines))
    }

    /// Arbitrary stdout reader for a container
    pub(crate) fn with_log_reader(self, id: &str, reader: LineReader) -> Self {
        self.with_stream(id, StreamKind::Stdout, reader)
    }

    /// Add one stream to a container's log source
    fn with_stream(self, id: &str, kind: StreamKind, reader: LineReader) -> Self {
        if let Ok(mut logs) = self.logs.lock() {
            logs.entry(id.to_string()).or_default().push((kind, reader));
        }
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn call(&self, action: &str, container: &Container) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{} {}", action, container.name));
        }
        if self.failing.contains(&container.id) {
            return Err(RuneCtlError::Command(format!(
                "{} {}: no such container",
                action, container.id
            )));
        }
        Ok(())
    }
}

fn finite(lines: &[&str]) -> LineReader {
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    Box::new(std::io::Cursor::new(text.into_bytes()))
}

impl ContainerRuntime for FakeRuntime {
    async fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_query {
            return Err(RuneCtlError::ProcessQuery("daemon not reachable".to_string()));
        }
        Ok(self.records.clone())
    }

    async fn start(&self, container: &Container) -> Result<()> {
        self.call("start", container)
    }

    async fn stop(&self, container: &Container, _timeout: Option<u64>) -> Result<()> {
        self.call("stop", container)
    }

    async fn kill(&self, container: &Container, _signal: Option<&str>) -> Result<()> {
        self.call("kill", container)
    }

    async fn remove(&self, container: &Container, _force: bool) -> Result<()> {
        self.call("rm", container)
    }

    fn follow_logs(&self, container: &Container, _options: &LogOptions) -> Result<LogSource> {
        if self.failing_logs.contains(&container.id) {
            return Err(RuneCtlError::Command(format!("logs {}: cannot attach", container.id)));
        }

        let streams = match self.logs.lock().ok().and_then(|mut logs| logs.remove(&container.id)) {
            Some(streams) => streams,
            None => vec![(StreamKind::Stdout, finite(&[]))],
        };

        Ok(LogSource::from_streams(streams))
    }
}
