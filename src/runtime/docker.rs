//! Runtime backed by the `docker` command line client

use super::{ContainerRuntime, LineReader, LogOptions, LogSource};
use crate::container::{Container, ProcessRecord};
use crate::error::{Result, RuneCtlError};
use crate::logs::StreamKind;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use tokio::io::BufReader;

/// Default client binary
pub const DEFAULT_DOCKER_BINARY: &str = "docker";

/// Runtime invoking the docker CLI
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_BINARY)
    }
}

impl DockerCli {
    /// Create a runtime using the given client binary
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn describe(&self, args: &[String]) -> String {
        format!("{} {}", self.binary.display(), args.join(" "))
    }

    /// Run the client to completion and return its stdout
    async fn run(&self, args: Vec<String>) -> Result<String> {
        let command_line = self.describe(&args);
        tracing::debug!("running: {}", command_line);

        let output = tokio::process::Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| RuneCtlError::Command(format!("{}: {}", command_line, e)))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        Err(RuneCtlError::Command(format!(
            "{}: {}",
            command_line,
            stderr_or_status(&output)
        )))
    }
}

fn stderr_or_status(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }

    format!("exit status {}", output.status)
}

/// Decode `docker ps --format '{{json .}}'` output, one object per line
pub fn parse_ps_output(output: &str) -> Result<Vec<ProcessRecord>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| -> Result<ProcessRecord> {
            let mut record: ProcessRecord = serde_json::from_str(line)
                .map_err(|e| RuneCtlError::ProcessQuery(format!("undecodable ps line: {}", e)))?;
            record.command = record.command.trim_matches('"').to_string();
            Ok(record)
        })
        .collect()
}

fn log_args(container: &Container, options: &LogOptions) -> Vec<String> {
    let mut args = vec!["logs".to_string()];
    if options.follow {
        args.push("--follow".to_string());
    }
    if options.timestamps {
        args.push("--timestamps".to_string());
    }
    if let Some(tail) = options.tail {
        args.push("--tail".to_string());
        args.push(tail.to_string());
    }
    args.push(container.id.clone());
    args
}

impl ContainerRuntime for DockerCli {
    async fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        let args: Vec<String> = ["ps", "--all", "--no-trunc", "--format", "{{json .}}"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let output = self
            .run(args)
            .await
            .map_err(|e| RuneCtlError::ProcessQuery(e.to_string()))?;
        parse_ps_output(&output)
    }

    async fn start(&self, container: &Container) -> Result<()> {
        self.run(vec!["start".to_string(), container.id.clone()]).await?;
        Ok(())
    }

    async fn stop(&self, container: &Container, timeout: Option<u64>) -> Result<()> {
        let mut args = vec!["stop".to_string()];
        if let Some(t) = timeout {
            args.push("--time".to_string());
            args.push(t.to_string());
        }
        args.push(container.id.clone());
        self.run(args).await?;
        Ok(())
    }

    async fn kill(&self, container: &Container, signal: Option<&str>) -> Result<()> {
        let mut args = vec!["kill".to_string()];
        if let Some(sig) = signal {
            args.push("--signal".to_string());
            args.push(sig.to_string());
        }
        args.push(container.id.clone());
        self.run(args).await?;
        Ok(())
    }

    async fn remove(&self, container: &Container, force: bool) -> Result<()> {
        let mut args = vec!["rm".to_string()];
        if force {
            args.push("--force".to_string());
        }
        args.push(container.id.clone());
        self.run(args).await?;
        Ok(())
    }

    fn follow_logs(&self, container: &Container, options: &LogOptions) -> Result<LogSource> {
        let args = log_args(container, options);
        let command_line = self.describe(&args);
        tracing::debug!("spawning: {}", command_line);

        let mut child = tokio::process::Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RuneCtlError::Command(format!("{}: {}", command_line, e)))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            RuneCtlError::Command(format!("{}: stdout not captured", command_line))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            RuneCtlError::Command(format!("{}: stderr not captured", command_line))
        })?;

        let stdout: LineReader = Box::new(BufReader::new(stdout));
        let stderr: LineReader = Box::new(BufReader::new(stderr));

        Ok(LogSource {
            streams: vec![(StreamKind::Stdout, stdout), (StreamKind::Stderr, stderr)],
            child: Some(child),
        })
    }
}
