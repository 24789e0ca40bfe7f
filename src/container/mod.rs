//! Container records
//!
//! Raw process state reported by the runtime, the containers built from
//! it, and the naming convention tying containers to services.

pub mod config;
pub mod naming;

pub use config::{Container, ProcessRecord};
pub use naming::NamingConvention;
