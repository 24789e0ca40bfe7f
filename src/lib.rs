//! runectl - A fig-compatible control tool for container deployments
//!
//! runectl reads a declarative set of services, finds the containers the
//! runtime reports for each of them, and applies group commands to the
//! result:
//!
//! - Listing containers (`ps`)
//! - Starting, stopping, killing and removing containers
//! - Following the merged logs of every service

pub mod compose;
pub mod config;
pub mod container;
pub mod error;
pub mod logs;
pub mod project;
pub mod runtime;

pub use config::Settings;
pub use error::{Result, RuneCtlError};
pub use project::{Action, ActionOutcome, Project};
