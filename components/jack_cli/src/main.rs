//! Jack compiler CLI
//!
//! Entry point for `jackc`. Parses CLI arguments, installs logging and
//! delegates to the batch driver.

use clap::Parser as ClapParser;
use jack_cli::Cli;
use std::process::ExitCode;
use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, prelude::*};

fn init_logging(level: LevelFilter) {
    let layer_stderr = tracing_subscriber::fmt::Layer::default()
        .with_ansi(false)
        .with_target(false)
        .with_writer(BoxMakeWriter::new(std::io::stderr))
        .with_filter(level);
    tracing_subscriber::registry().with(layer_stderr).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let driver = cli.driver();
    match driver.run(&cli.path) {
        Ok(report) => {
            if driver.writes_stdout() {
                for file in &report.compiled {
                    print!("{}", file.unit.chunk.to_text());
                }
            }
            ExitCode::from(report.exit_code())
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
