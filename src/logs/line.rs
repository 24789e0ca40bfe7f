//! Log lines

use std::fmt;

/// Output stream a line was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// One complete line of container output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Service the container belongs to
    pub service: String,
    /// Container name
    pub container: String,
    /// Stream the line came from
    pub stream: StreamKind,
    /// Line text without the trailing newline
    pub text: String,
}

impl LogLine {
    /// Render as `<container> | <text>` with the container column padded to `width`
    pub fn render(&self, width: usize) -> String {
        format!("{:<width$} | {}", self.container, self.text, width = width)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.container, self.text)
    }
}
