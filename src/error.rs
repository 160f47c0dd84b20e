//! Error types for the data frame core.
//!
//! Application code (the CLI and session replay) wraps these in
//! `anyhow::Error` with context; the core itself only ever returns
//! [`FrameError`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FrameError>;

/// Which axis of a frame an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Rows,
    Columns,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Rows => write!(f, "row"),
            Axis::Columns => write!(f, "column"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    /// Positional access outside the frame bounds.
    #[error("{axis} index {index} is out of range for length {len}")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },

    /// Label lookup miss on a direct access API.
    #[error("{axis} label '{label}' not found")]
    LabelNotFound { axis: Axis, label: String },

    /// The reader was told to expect header lines the input does not have.
    #[error("expected {expected} header line(s) but input has {found} line(s)")]
    MissingHeader { expected: usize, found: usize },

    /// Reader or writer configured with an unusable option.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A data row whose width does not match the column count.
    #[error("row {row} has {found} cell(s) but the frame has {expected} column(s)")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Label set whose length disagrees with the data it labels.
    #[error("{axis} labels have length {found} but the frame has {expected}")]
    LengthMismatch {
        axis: Axis,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column label '{0}'")]
    DuplicateColumn(String),

    #[error("failed to parse delimited text: {0}")]
    Parse(String),

    #[error("failed to write delimited text: {0}")]
    Write(String),
}
