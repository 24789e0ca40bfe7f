//! Log aggregation
//!
//! Follows the output of every container of a set of services and merges
//! it into one stream.

pub mod aggregator;
pub mod line;

pub use aggregator::{LogAggregator, LogStream};
pub use line::{LogLine, StreamKind};
