//! Log fan-in
//!
//! One producer task per service writes complete lines into a shared
//! queue. The consumer side counts outstanding producers and reports the
//! stream as closed once every producer has signalled completion.

use super::line::{LogLine, StreamKind};
use crate::error::{Result, RuneCtlError};
use crate::project::Service;
use crate::runtime::{ContainerRuntime, LineReader, LogOptions, LogSource};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Message written into the shared queue
#[derive(Debug)]
enum SinkEvent {
    /// A complete line
    Line(LogLine),
    /// A producer finished
    Done(String),
}

/// Write half of the shared queue, cloned into every producer
#[derive(Debug, Clone)]
struct LogSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl LogSink {
    /// Enqueue a line; `false` once the consumer is gone
    fn write(&self, line: LogLine) -> bool {
        self.tx.send(SinkEvent::Line(line)).is_ok()
    }
}

/// Signals producer completion when dropped, including on panic
struct CompletionGuard {
    sink: LogSink,
    service: String,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let _ = self
            .sink
            .tx
            .send(SinkEvent::Done(std::mem::take(&mut self.service)));
    }
}

/// Merged, arrival-ordered stream of log lines
#[derive(Debug)]
pub struct LogStream {
    rx: mpsc::UnboundedReceiver<SinkEvent>,
    remaining: usize,
    width: usize,
}

impl LogStream {
    fn new(rx: mpsc::UnboundedReceiver<SinkEvent>, producers: usize, width: usize) -> Self {
        Self {
            rx,
            remaining: producers,
            width,
        }
    }

    /// A stream with no producers; already closed
    pub fn closed() -> Self {
        let (_tx, rx) = mpsc::unbounded_channel();
        Self::new(rx, 0, 0)
    }

    /// Next line from any producer, `None` once every producer finished
    pub async fn next(&mut self) -> Option<LogLine> {
        while self.remaining > 0 {
            match self.rx.recv().await {
                Some(SinkEvent::Line(line)) => return Some(line),
                Some(SinkEvent::Done(service)) => {
                    self.remaining -= 1;
                    tracing::debug!(
                        "log producer for {} finished, {} remaining",
                        service,
                        self.remaining
                    );
                }
                None => self.remaining = 0,
            }
        }
        None
    }

    /// Whether the stream has closed
    pub fn is_closed(&self) -> bool {
        self.remaining == 0
    }

    /// Width of the widest container name, for aligned rendering
    pub fn prefix_width(&self) -> usize {
        self.width
    }

    /// Drain the stream into a vector
    pub async fn collect(mut self) -> Vec<LogLine> {
        let mut lines = Vec::new();
        while let Some(line) = self.next().await {
            lines.push(line);
        }
        lines
    }
}

/// Opened sources of one service, not yet running
struct Producer {
    service: String,
    sources: Vec<(String, LogSource)>,
}

impl Producer {
    async fn run(self, sink: LogSink) {
        let _guard = CompletionGuard {
            sink: sink.clone(),
            service: self.service.clone(),
        };

        let mut readers = JoinSet::new();
        let mut children = Vec::new();

        for (container, source) in self.sources {
            for (stream, reader) in source.streams {
                readers.spawn(read_lines(
                    sink.clone(),
                    self.service.clone(),
                    container.clone(),
                    stream,
                    reader,
                ));
            }
            if let Some(child) = source.child {
                children.push((container, child));
            }
        }

        while let Some(result) = readers.join_next().await {
            if let Err(e) = result {
                tracing::warn!("Log reader for {} failed: {}", self.service, e);
            }
        }

        for (container, mut child) in children {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!("Log follower for {} exited with {}", container, status);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to reap log follower for {}: {}", container, e),
            }
        }
    }
}

/// Forward one stream into the sink, line by line
async fn read_lines(
    sink: LogSink,
    service: String,
    container: String,
    stream: StreamKind,
    mut reader: LineReader,
) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
                let line = LogLine {
                    service: service.clone(),
                    container: container.clone(),
                    stream,
                    text: String::from_utf8_lossy(&buf).into_owned(),
                };
                if !sink.write(line) {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Failed to read {} of {}: {}", stream, container, e);
                break;
            }
        }
    }
}

/// Fans in the logs of a set of services
pub struct LogAggregator<'a, R: ContainerRuntime + ?Sized> {
    runtime: &'a R,
    options: LogOptions,
}

impl<'a, R: ContainerRuntime + ?Sized> LogAggregator<'a, R> {
    /// Create an aggregator over `runtime`
    pub fn new(runtime: &'a R, options: LogOptions) -> Self {
        Self { runtime, options }
    }

    /// Launch one producer per service with containers
    ///
    /// Every log source is opened before any producer starts, so a launch
    /// failure aborts the whole call before a single line is emitted.
    /// Returns the number of producers launched and the merged stream.
    pub async fn launch(&self, services: &[Service]) -> Result<(usize, LogStream)> {
        let mut producers = Vec::new();

        for service in services.iter().filter(|s| !s.containers.is_empty()) {
            let mut sources = Vec::with_capacity(service.containers.len());
            for container in &service.containers {
                let source = self
                    .runtime
                    .follow_logs(container, &self.options)
                    .map_err(|e| RuneCtlError::producer_launch(&service.name, e))?;
                sources.push((container.name.clone(), source));
            }
            producers.push(Producer {
                service: service.name.clone(),
                sources,
            });
        }

        if producers.is_empty() {
            return Ok((0, LogStream::closed()));
        }

        let width = services
            .iter()
            .flat_map(|s| s.containers.iter())
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0);

        let count = producers.len();
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = LogSink { tx };

        tracing::info!("Following logs of {} services", count);
        for producer in producers {
            tokio::spawn(producer.run(sink.clone()));
        }

        Ok((count, LogStream::new(rx, count, width)))
    }
}
