//! Error types for dashtier-terminal.

use thiserror::Error;

/// Errors surfaced by the rendering engine.
#[derive(Debug, Error)]
pub enum DashError {
    /// IO error from terminal operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A layer, output or staging buffer could not be allocated.
    #[error("allocation failed for {what} ({bytes} bytes)")]
    Allocation {
        /// Buffer being allocated.
        what: &'static str,
        /// Requested size in bytes.
        bytes: usize,
    },

    /// A series index outside the widget's series list.
    #[error("invalid series index {index} (widget has {len} series)")]
    InvalidSeriesIndex {
        /// Index that was passed.
        index: usize,
        /// Number of series the widget owns.
        len: usize,
    },

    /// Dashboard configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Dashboard configuration could not be parsed.
    #[error("configuration parse error: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    /// The terminal capability probe failed.
    #[error("capability probe failed: {0}")]
    ProbeFailed(String),

    /// Terminal not available.
    #[error("Terminal not available")]
    TerminalNotAvailable,
}

impl DashError {
    /// Whether the error aborts engine construction rather than a single frame.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Allocation { .. } | Self::TerminalNotAvailable)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DashError>;
