//! Service definitions
//!
//! This module reads the fig-style definitions file that declares the
//! services of a project.

pub mod config;
pub mod parser;

pub use config::{Definitions, ServiceDefinition};
pub use parser::ComposeParser;
