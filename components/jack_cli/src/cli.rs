//! Command-line argument definitions

use crate::driver::Driver;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Compile Jack classes to VM code
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "jackc", version, about = "Compile Jack classes to VM code")]
pub struct Cli {
    /// A .jack file, or a directory whose .jack files are compiled
    pub path: PathBuf,

    /// Also write the token stream as XML (<Name>T.xml)
    #[arg(long)]
    pub emit_tokens: bool,

    /// Also write the annotated syntax tree as XML (<Name>.xml)
    #[arg(long)]
    pub emit_tree: bool,

    /// Also write the annotated syntax tree as JSON (<Name>.json)
    #[arg(long)]
    pub emit_json: bool,

    /// Print VM code to stdout instead of writing .vm files
    #[arg(long)]
    pub stdout: bool,

    /// Write artifacts into DIR instead of next to the sources
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Create a CLI configuration for a path with default settings
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            emit_tokens: false,
            emit_tree: false,
            emit_json: false,
            stdout: false,
            out_dir: None,
            verbose: 0,
            quiet: false,
        }
    }

    /// Log level selected by `-v` and `-q`
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Build the batch driver these arguments describe
    pub fn driver(&self) -> Driver {
        let driver = Driver::new()
            .with_emit_tokens(self.emit_tokens)
            .with_emit_tree(self.emit_tree)
            .with_emit_json(self.emit_json)
            .with_stdout(self.stdout);
        match &self.out_dir {
            Some(dir) => driver.with_out_dir(dir.clone()),
            None => driver,
        }
    }
}
