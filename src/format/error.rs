//! Error types for label file decoding and persistence.

use std::path::PathBuf;
use thiserror::Error;

/// What was wrong with a malformed label line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Fewer than four coordinate fields after the class id
    #[error("expected at least 4 coordinates after the class id, found {found}")]
    TooFewFields {
        /// Number of coordinate fields present
        found: usize,
    },

    /// Polygon tail with an odd number of coordinates
    #[error("polygon needs x/y pairs, found {found} coordinates")]
    OddPolygonTail {
        /// Number of coordinate fields present
        found: usize,
    },

    /// Class id is not a non-negative integer
    #[error("invalid class id '{token}'")]
    InvalidClassId {
        /// The offending token
        token: String,
    },

    /// Coordinate is not a finite number
    #[error("invalid number '{token}'")]
    InvalidNumber {
        /// The offending token
        token: String,
    },
}

/// A malformed line in a label file. The whole file is treated as suspect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct DecodeError {
    /// 1-based line number in the file
    pub line: usize,
    /// What went wrong
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(line: usize, kind: DecodeErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Which filesystem step of a save failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistAction {
    CreateDir,
    Write,
    Remove,
}

impl PersistAction {
    fn verb(&self) -> &'static str {
        match self {
            PersistAction::CreateDir => "create directory for",
            PersistAction::Write => "write",
            PersistAction::Remove => "remove",
        }
    }
}

/// Writing or removing a label file failed. The in-memory edit is kept.
#[derive(Error, Debug)]
#[error("failed to {verb} {path:?}: {source}", verb = .action.verb())]
pub struct PersistError {
    /// Label file being saved
    pub path: PathBuf,
    /// Failed step
    pub action: PersistAction,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}

impl PersistError {
    pub fn new(path: impl Into<PathBuf>, action: PersistAction, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            action,
            source,
        }
    }
}

/// Errors that can occur while loading or saving label data.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Label file content is malformed
    #[error("Corrupted label file {path:?}: {error}")]
    Decode {
        /// File that failed to decode
        path: PathBuf,
        /// First bad line
        error: DecodeError,
    },

    /// Saving a label file failed
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// Image header could not be read
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid dataset folder or layout
    #[error("Invalid dataset: {message}")]
    InvalidDataset {
        /// Description of the problem
        message: String,
    },
}

impl FormatError {
    /// Create an invalid dataset error with a message.
    pub fn invalid_dataset(message: impl Into<String>) -> Self {
        Self::InvalidDataset {
            message: message.into(),
        }
    }

    /// The decode error if this is a corrupted file.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            FormatError::Decode { error, .. } => Some(error),
            _ => None,
        }
    }
}
