//! Compiler error types.
//!
//! The taxonomy follows the pipeline: a unit can fail while being read, while
//! being scanned, while being parsed, or while instructions are generated.
//! None of these are recovered from. The compiler itself never touches the
//! filesystem, so `IoError` is only reported by the command-line layer, which
//! keeps the failing path alongside the `std::io::Error`.

use crate::SourcePosition;
use std::fmt;
use thiserror::Error;

/// The stage of compilation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The source file could not be read or an artifact could not be written
    IoError,
    /// Unterminated string or comment, or a character outside the language
    LexicalError,
    /// A token did not match what the grammar expected
    SyntaxError,
    /// The code generator met a tree shape it does not handle
    GenerationError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::IoError => "i/o error",
            ErrorKind::LexicalError => "lexical error",
            ErrorKind::SyntaxError => "syntax error",
            ErrorKind::GenerationError => "generation error",
        };
        f.write_str(name)
    }
}

/// A fatal error for one compilation unit.
///
/// # Examples
///
/// ```
/// use core_types::{CompileError, ErrorKind};
///
/// let error = CompileError::lexical("Unterminated string literal", None);
/// assert!(matches!(error.kind, ErrorKind::LexicalError));
/// assert_eq!(error.to_string(), "lexical error: Unterminated string literal");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}{}: {message}", position_suffix(.source_position))]
pub struct CompileError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Source position where the error occurred
    pub source_position: Option<SourcePosition>,
}

fn position_suffix(position: &Option<SourcePosition>) -> String {
    match position {
        Some(pos) => format!(" at {}", pos),
        None => String::new(),
    }
}

impl CompileError {
    /// Create an error of the given kind
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        source_position: Option<SourcePosition>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source_position,
        }
    }

    /// Create a lexical error
    pub fn lexical(message: impl Into<String>, position: Option<SourcePosition>) -> Self {
        Self::new(ErrorKind::LexicalError, message, position)
    }

    /// Create a syntax error
    pub fn syntax(message: impl Into<String>, position: Option<SourcePosition>) -> Self {
        Self::new(ErrorKind::SyntaxError, message, position)
    }

    /// Create a code generation error
    pub fn generation(message: impl Into<String>, position: Option<SourcePosition>) -> Self {
        Self::new(ErrorKind::GenerationError, message, position)
    }
}

/// Result type used throughout the compiler
pub type CompileResult<T> = Result<T, CompileError>;
