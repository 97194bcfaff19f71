//! Error kinds raised by the change-script algebra.
//!
//! Builder methods never fail; only the algebra over embeds and the
//! document-only `diff` entry point return errors.

use std::fmt;
use thiserror::Error;

/// Which side of a `diff` call contained a non-insert operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSide {
    /// The receiver of the call.
    Left,
    /// The argument of the call.
    Right,
}

impl fmt::Display for DiffSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffSide::Left => f.write_str("with"),
            DiffSide::Right => f.write_str("on"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeltaError {
    #[error("cannot retain a non-object value")]
    CannotRetainNonObject,
    #[error("embed types not matched: {left} != {right}")]
    EmbedTypeMismatch { left: String, right: String },
    #[error("no embed handler registered for \"{0}\"")]
    UnknownEmbedType(String),
    #[error("diff() called {0} a script that is not a document")]
    NotADocument(DiffSide),
}
