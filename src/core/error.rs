//! Error types for the course map pipeline.
//!
//! Per-document problems ([`ExtractionError`]) are collected on the scan
//! result and never abort a run. Rendering problems ([`RenderError`]) and
//! whole-invocation problems ([`CourseMapError`]) are returned to the caller.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::ConfigError;

/// 1-based position inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number, starting at 1
    pub line: usize,
    /// Column number, starting at 1
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[allow(clippy::ref_option)]
fn at_position(position: &Option<SourcePosition>) -> String {
    position.map_or_else(String::new, |p| format!(" at {p}"))
}

/// Failure to turn one document into a course record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The document has no front matter, or the front matter has no course block
    #[error("missing course metadata: {0}")]
    MissingMetadata(String),

    /// The front matter exists but is not valid YAML
    #[error("malformed front matter{}: {message}", at_position(.position))]
    Malformed {
        /// Location in the document, when the YAML parser reports one
        position: Option<SourcePosition>,
        /// Parser diagnostic
        message: String,
    },

    /// A required field is absent
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has an unusable value
    #[error("invalid value for `{field}`: {message}")]
    InvalidField {
        /// Field name
        field: String,
        /// What is wrong with it
        message: String,
    },
}

impl ExtractionError {
    /// Classify this error for a [`ParseFailure`](crate::core::models::ParseFailure)
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::MissingMetadata(_) => FailureKind::MissingMetadata,
            Self::Malformed { .. } => FailureKind::Malformed,
            Self::MissingField(_) => FailureKind::MissingField,
            Self::InvalidField { .. } => FailureKind::InvalidField,
        }
    }
}

/// Kind of a per-document failure recorded during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// File or directory could not be read
    Unreadable,
    /// No metadata block / no course block
    MissingMetadata,
    /// Metadata block is syntactically broken
    Malformed,
    /// Required field missing
    MissingField,
    /// Field present with an unusable value
    InvalidField,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unreadable => "unreadable",
            Self::MissingMetadata => "missing-metadata",
            Self::Malformed => "malformed",
            Self::MissingField => "missing-field",
            Self::InvalidField => "invalid-field",
        };
        f.write_str(name)
    }
}

/// Failure while producing a rendered artifact
#[derive(Debug, Error)]
pub enum RenderError {
    /// The engine executable could not be started
    #[error("rendering engine `{engine}` not found: {message}")]
    EngineNotFound {
        /// Executable that was looked up
        engine: String,
        /// Underlying spawn error
        message: String,
    },

    /// The engine ran but did not produce a usable result
    #[error("rendering engine `{engine}` failed: {message}")]
    EngineExecutionFailed {
        /// Executable that was run
        engine: String,
        /// Exit status and captured diagnostics
        message: String,
    },

    /// The graph could not be encoded as a graph description
    #[error("cannot encode graph description: {0}")]
    SerializationFailed(String),
}

/// Coarse classification of [`CourseMapError`] for callers that branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input directory missing or unreadable
    InputNotFound,
    /// Configuration file missing or invalid
    Config,
    /// Rendering engine not installed or not reachable
    EngineNotFound,
    /// Rendering engine returned a failure
    EngineExecutionFailed,
    /// Graph description could not be produced
    SerializationFailed,
    /// Output file could not be written
    OutputWriteFailed,
    /// Engine probe reported the engine as unusable
    EngineUnavailable,
}

/// Fatal error for one course map invocation
#[derive(Debug, Error)]
pub enum CourseMapError {
    /// Input directory missing, not a directory, or unreadable
    #[error("input directory `{}` not found: {message}", .path.display())]
    InputNotFound {
        /// Directory that was requested
        path: PathBuf,
        /// Why it could not be opened
        message: String,
    },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rendering failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The rendered artifact could not be written
    #[error("cannot write output `{}`: {source}", .path.display())]
    OutputWriteFailed {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The engine probe did not find a usable engine
    #[error("rendering engine `{engine}` is unavailable: {details}")]
    EngineUnavailable {
        /// Executable that was probed
        engine: String,
        /// Probe diagnostics
        details: String,
    },
}

impl CourseMapError {
    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InputNotFound { .. } => ErrorKind::InputNotFound,
            Self::Config(_) => ErrorKind::Config,
            Self::Render(RenderError::EngineNotFound { .. }) => ErrorKind::EngineNotFound,
            Self::Render(RenderError::EngineExecutionFailed { .. }) => {
                ErrorKind::EngineExecutionFailed
            }
            Self::Render(RenderError::SerializationFailed(_)) => ErrorKind::SerializationFailed,
            Self::OutputWriteFailed { .. } => ErrorKind::OutputWriteFailed,
            Self::EngineUnavailable { .. } => ErrorKind::EngineUnavailable,
        }
    }
}
