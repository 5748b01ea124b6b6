//! Shared error and source-location types for the Jack toolchain.
//!
//! Every stage of the compiler (scanner, parser, code generator) and the
//! command-line driver reports failures through the same error value, so a
//! unit either compiles completely or yields exactly one [`CompileError`].
//!
//! # Overview
//!
//! - [`CompileError`] - A fatal failure for one compilation unit
//! - [`ErrorKind`] - Which stage of the pipeline failed
//! - [`SourcePosition`] - Source code location
//!
//! # Examples
//!
//! ```
//! use core_types::{CompileError, ErrorKind, SourcePosition};
//!
//! let error = CompileError::syntax(
//!     "Expected symbol ';', got keyword 'let'",
//!     Some(SourcePosition::new(3, 9, 41)),
//! );
//! assert_eq!(error.kind, ErrorKind::SyntaxError);
//! assert_eq!(
//!     error.to_string(),
//!     "syntax error at 3:9: Expected symbol ';', got keyword 'let'"
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;

pub use error::{CompileError, CompileResult, ErrorKind};
pub use source::SourcePosition;
