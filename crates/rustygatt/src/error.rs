//! Error types for the rustygatt compiler
//!
//! Fatal conditions abort the whole compile and are reported through
//! [`CompileError`]. Conditions the compiler can step over are collected as
//! [`CompileWarning`] values on the compilation context.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a compile
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot resolve UUID '{0}'")]
    UnresolvedUuid(String),

    #[error("INCLUDE_SERVICE references unknown or still open service '{0}'")]
    UnknownService(String),

    #[error("CHARACTERISTIC_AGGREGATE_FORMAT references undefined format '{0}'")]
    UnknownFormat(String),

    #[error("{keyword}: missing field {index}")]
    MissingField { keyword: &'static str, index: usize },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Attribute handle space exhausted")]
    HandleOverflow,

    #[error("Malformed attribute record at offset {0}")]
    MalformedRecord(usize),
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for compiler operations
pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Non-fatal diagnostics; compilation continues after each of these
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileWarning {
    #[error("property {0} undefined")]
    UnknownProperty(String),

    #[error("{0} not implemented yet")]
    Unimplemented(String),

    #[error("unknown token: {0}")]
    UnknownKeyword(String),

    #[error("#import in file {file} - line {line} neither <name.gatt> nor \"name.gatt\" form")]
    MalformedImport { file: String, line: usize },

    #[error("import of {path} failed: {reason}")]
    ImportFailed { path: PathBuf, reason: String },

    #[error("#TODO in file {file} - line {line} not handled, skipping declaration")]
    Todo { file: String, line: usize },
}
