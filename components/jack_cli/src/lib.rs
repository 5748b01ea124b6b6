//! Jack Compiler CLI Library
//!
//! Provides argument parsing and the batch driver behind the `jackc` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod driver;
pub mod error;

pub use cli::Cli;
pub use driver::{collect_sources, BatchReport, CompiledFile, Driver};
pub use error::{CliError, CliResult};
