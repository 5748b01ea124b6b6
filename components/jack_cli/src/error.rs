//! Error types for the CLI

use core_types::{CompileError, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// A source could not be read or an artifact could not be written
    #[error("i/o error on '{}': {source}", .path.display())]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A unit failed to compile
    #[error("{}: {source}", .path.display())]
    Compile {
        /// Source file of the unit
        path: PathBuf,
        /// Underlying error
        #[source]
        source: CompileError,
    },

    /// A directory held no `.jack` files
    #[error("no .jack files found in '{}'", .0.display())]
    NoSources(PathBuf),
}

impl CliError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wrap a compile error with the path of its unit
    pub fn compile(path: &Path, source: CompileError) -> Self {
        CliError::Compile {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Pipeline stage that failed, in compile-error terms
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::Io { .. } | CliError::NoSources(_) => ErrorKind::IoError,
            CliError::Compile { source, .. } => source.kind,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
