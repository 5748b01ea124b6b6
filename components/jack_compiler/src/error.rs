//! Compiler error helpers

use crate::lexer::Token;
use core_types::{CompileError, SourcePosition};

/// Create a syntax error at a given position
pub fn syntax_error(message: impl Into<String>, position: Option<SourcePosition>) -> CompileError {
    CompileError::syntax(message, position)
}

/// Create an unexpected token error
pub fn unexpected_token(expected: &str, got: &Token) -> CompileError {
    syntax_error(
        format!("Expected {}, got {}", expected, got.describe()),
        Some(got.position),
    )
}

/// Create an unexpected end of input error
pub fn unexpected_eof(expected: &str, position: Option<SourcePosition>) -> CompileError {
    syntax_error(format!("Expected {}, got end of input", expected), position)
}

/// Create a code generation error
pub fn generation_error(
    message: impl Into<String>,
    position: Option<SourcePosition>,
) -> CompileError {
    CompileError::generation(message, position)
}
