//! Error types for the public API
//!
//! Problems found *inside* Humdrum data are never returned as errors; they are
//! recorded as diagnostics on the file (see [`crate::diagnostics`]). The
//! errors here cover misuse of the API: bad indices, edits that would break
//! the line format, and malformed configuration.

use thiserror::Error;

use crate::models::TokenId;

/// Top-level error type for file access and mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HumdrumError {
    /// Line index past the end of the file
    #[error("line index {index} out of range (file has {count} lines)")]
    LineOutOfRange { index: usize, count: usize },

    /// Token id not present in the file's arena
    #[error("token {0} does not exist")]
    UnknownToken(TokenId),

    /// Replacement text would change the field layout of its line
    #[error("token text `{0}` contains a field or line separator")]
    SeparatorInText(String),

    /// Inserted line text spans more than one line
    #[error("line text contains a line break")]
    MultilineInput,

    /// Configuration could not be decoded
    #[error("invalid analysis configuration: {0}")]
    Config(String),

    /// Report serialization failed
    #[error("report serialization failed: {0}")]
    Report(String),
}

pub type Result<T> = std::result::Result<T, HumdrumError>;
