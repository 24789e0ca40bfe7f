//! runectl - A fig-compatible control tool for container deployments
//!
//! This is the main CLI entry point for runectl.

use clap::{Parser, Subcommand};
use runectl::config::{Settings, DEFAULT_DEFINITIONS_FILE};
use runectl::error::Result;
use runectl::project::{Action, ActionOutcome, Project, PsRow};
use runectl::runtime::{DockerCli, LogOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// runectl - fig-compatible deployment control
#[derive(Parser)]
#[command(name = "runectl")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "Control the containers of a fig project", long_about = None)]
struct Cli {
    /// Show more output
    #[arg(long, global = true)]
    verbose: bool,

    /// Specify an alternate definitions file
    #[arg(short, long, global = true, env = "FIG_FILE", default_value = DEFAULT_DEFINITIONS_FILE)]
    file: PathBuf,

    /// Specify an alternate project name
    #[arg(short, long, global = true, env = "FIG_PROJECT_NAME")]
    project_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Force stop service containers
    Kill {
        /// Signal to send
        #[arg(short, long)]
        signal: Option<String>,
        /// Services (all when omitted)
        services: Vec<String>,
    },

    /// View output from services
    Logs {
        /// Show timestamps
        #[arg(short, long)]
        timestamps: bool,
        /// Print the available output and exit
        #[arg(long)]
        no_follow: bool,
        /// Number of lines to show from the end of each container's log
        #[arg(short = 'n', long)]
        tail: Option<usize>,
        /// Services (all when omitted)
        services: Vec<String>,
    },

    /// List containers
    Ps {
        /// Services (all when omitted)
        services: Vec<String>,
    },

    /// Remove stopped service containers
    #[command(name = "rm")]
    Remove {
        /// Remove running containers too
        #[arg(long)]
        force: bool,
        /// Services (all when omitted)
        services: Vec<String>,
    },

    /// Start existing containers for a service
    Start {
        /// Services (all when omitted)
        services: Vec<String>,
    },

    /// Stop existing containers without removing them
    Stop {
        /// Seconds to wait before killing
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Services (all when omitted)
        services: Vec<String>,
    },
}

impl Commands {
    fn into_action(self) -> (Action, Vec<String>) {
        match self {
            Commands::Kill { signal, services } => (Action::Kill { signal }, services),
            Commands::Logs {
                timestamps,
                no_follow,
                tail,
                services,
            } => (
                Action::Logs(LogOptions {
                    follow: !no_follow,
                    timestamps,
                    tail,
                }),
                services,
            ),
            Commands::Ps { services } => (Action::Ps, services),
            Commands::Remove { force, services } => (Action::Remove { force }, services),
            Commands::Start { services } => (Action::Start, services),
            Commands::Stop { timeout, services } => (Action::Stop { timeout }, services),
        }
    }
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells.map(str::len).max().unwrap_or(0).max(header.len())
}

fn print_ps(rows: &[PsRow]) {
    let name_w = column_width("NAME", rows.iter().map(|r| r.name.as_str()));
    let cmd_w = column_width("COMMAND", rows.iter().map(|r| r.command.as_str()));
    let state_w = column_width("STATE", rows.iter().map(|r| r.status.as_str()));

    println!(
        "{:<name_w$}  {:<cmd_w$}  {:<state_w$}  {}",
        "NAME", "COMMAND", "STATE", "PORTS"
    );
    for r in rows {
        println!(
            "{:<name_w$}  {:<cmd_w$}  {:<state_w$}  {}",
            r.name, r.command, r.status, r.ports
        );
    }
}

async fn run(cli: Cli) -> Result<()> {
    let working_dir = std::env::current_dir()?;

    let mut settings = Settings::new(working_dir)
        .file(cli.file)
        .environment_os(std::env::vars_os());
    if let Some(ref name) = cli.project_name {
        settings = settings.project_name(name);
    }
    tracing::debug!("Project {} at {}", settings.project_name, settings.working_dir.display());

    let project = Project::new(settings, DockerCli::default());
    let (action, services) = cli.command.into_action();

    match project.run(action, &services).await? {
        ActionOutcome::Listed(rows) => print_ps(&rows),
        ActionOutcome::Applied(names) => {
            for name in names {
                println!("{}", name);
            }
        }
        ActionOutcome::Streaming {
            producers,
            mut stream,
        } => {
            if producers == 0 {
                tracing::warn!("No containers to follow");
            }
            let width = stream.prefix_width();
            while let Some(line) = stream.next().await {
                println!("{}", line.render(width));
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
