//! Crate-level error types.

use std::fmt;
use std::path::PathBuf;

use crate::convert::TargetKind;

/// Errors produced by the atomlens crate.
#[derive(Debug)]
pub enum AtomlensError {
    /// Malformed property schema declaration.
    Schema(String),
    /// Input data variant incompatible with the requested target format.
    UnsupportedConversion {
        /// Kind of input data that was supplied.
        input: &'static str,
        /// Target data format that was requested.
        target: TargetKind,
    },
    /// Tabular conversion is missing required out-of-band data.
    MissingAuxiliaryData(String),
    /// Operation not valid for the plot's construction mode or current state.
    InvalidOperation(String),
    /// Failed to parse a configuration document.
    ConfigParse {
        /// File the document was read from.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// Filesystem failure on read or write.
    Io {
        /// File the operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Embedded browser shell failure.
    #[cfg(feature = "gui")]
    Shell(String),
}

impl AtomlensError {
    /// I/O error carrying the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for AtomlensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(msg) => write!(f, "schema error: {msg}"),
            Self::UnsupportedConversion { input, target } => {
                write!(
                    f,
                    "unsupported conversion: {input} input cannot be \
                     converted to {target} data"
                )
            }
            Self::MissingAuxiliaryData(msg) => {
                write!(f, "missing auxiliary data: {msg}")
            }
            Self::InvalidOperation(msg) => {
                write!(f, "invalid operation: {msg}")
            }
            Self::ConfigParse { path, message } => {
                write!(
                    f,
                    "failed to parse configuration {}: {message}",
                    path.display()
                )
            }
            Self::Io { path, source } => {
                write!(f, "I/O error on {}: {source}", path.display())
            }
            #[cfg(feature = "gui")]
            Self::Shell(msg) => write!(f, "render shell error: {msg}"),
        }
    }
}

impl std::error::Error for AtomlensError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
