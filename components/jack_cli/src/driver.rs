//! Batch compilation driver
//!
//! Collects the sources named on the command line, compiles every unit
//! independently and writes the artifacts each one produces. Units share no
//! state, so a batch is compiled in parallel; results are reported in input
//! order.

use crate::error::{CliError, CliResult};
use jack_compiler::{compile_unit, tokens_to_xml, tree_to_json, tree_to_xml, CompilationUnit};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// File extension of Jack sources
pub const SOURCE_EXTENSION: &str = "jack";

/// Find the sources to compile
///
/// A file is taken as-is. A directory yields its `.jack` entries, not
/// recursing into subdirectories, sorted by file name.
pub fn collect_sources(path: &Path) -> CliResult<Vec<PathBuf>> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io(path, e))?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            CliError::io(path, source)
        })?;
        let is_source = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .map(|ext| ext == SOURCE_EXTENSION)
                .unwrap_or(false);
        if is_source {
            sources.push(entry.into_path());
        }
    }

    if sources.is_empty() {
        return Err(CliError::NoSources(path.to_path_buf()));
    }
    debug!(dir = %path.display(), count = sources.len(), "collected sources");
    Ok(sources)
}

/// A unit that compiled successfully
#[derive(Debug)]
pub struct CompiledFile {
    /// Source file
    pub source: PathBuf,
    /// Artifacts written for it, `.vm` first
    pub outputs: Vec<PathBuf>,
    /// Tokens, tree and instructions
    pub unit: CompilationUnit,
}

/// Outcome of one batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Units that compiled, in input order
    pub compiled: Vec<CompiledFile>,
    /// Units that failed, in input order
    pub failures: Vec<CliError>,
}

impl BatchReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one unit
    pub fn add_result(&mut self, result: CliResult<CompiledFile>) {
        match result {
            Ok(file) => self.compiled.push(file),
            Err(err) => self.failures.push(err),
        }
    }

    /// Number of units attempted
    pub fn total(&self) -> usize {
        self.compiled.len() + self.failures.len()
    }

    /// Whether every unit compiled
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status: 0 when every unit compiled, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Batch driver with its output settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Driver {
    emit_tokens: bool,
    emit_tree: bool,
    emit_json: bool,
    stdout: bool,
    out_dir: Option<PathBuf>,
}

impl Driver {
    /// Create a driver that writes only `.vm` files next to the sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write the token stream as `<Name>T.xml`
    pub fn with_emit_tokens(mut self, enabled: bool) -> Self {
        self.emit_tokens = enabled;
        self
    }

    /// Also write the annotated tree as `<Name>.xml`
    pub fn with_emit_tree(mut self, enabled: bool) -> Self {
        self.emit_tree = enabled;
        self
    }

    /// Also write the annotated tree as `<Name>.json`
    pub fn with_emit_json(mut self, enabled: bool) -> Self {
        self.emit_json = enabled;
        self
    }

    /// Leave VM code to the caller instead of writing `.vm` files
    pub fn with_stdout(mut self, enabled: bool) -> Self {
        self.stdout = enabled;
        self
    }

    /// Write artifacts into `dir` instead of next to the sources
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Whether VM code goes to stdout
    pub fn writes_stdout(&self) -> bool {
        self.stdout
    }

    /// Compile everything `path` names
    ///
    /// Only problems with `path` itself are errors; per-unit failures are
    /// logged and recorded in the report.
    pub fn run(&self, path: &Path) -> CliResult<BatchReport> {
        let sources = collect_sources(path)?;
        if let Some(dir) = &self.out_dir {
            fs::create_dir_all(dir).map_err(|e| CliError::io(dir, e))?;
        }
        Ok(self.compile_all(&sources))
    }

    /// Compile a list of sources in parallel
    pub fn compile_all(&self, sources: &[PathBuf]) -> BatchReport {
        let results: Vec<CliResult<CompiledFile>> = sources
            .par_iter()
            .map(|source| self.compile_file(source))
            .collect();

        let mut report = BatchReport::new();
        for result in results {
            match &result {
                Ok(file) => info!(
                    source = %file.source.display(),
                    instructions = file.unit.chunk.instruction_count(),
                    "compiled"
                ),
                Err(err) => error!("{}", err),
            }
            report.add_result(result);
        }
        info!(
            total = report.total(),
            failed = report.failures.len(),
            "batch finished"
        );
        report
    }

    /// Compile one source file and write its artifacts
    pub fn compile_file(&self, source: &Path) -> CliResult<CompiledFile> {
        let text = fs::read_to_string(source).map_err(|e| CliError::io(source, e))?;
        debug!(source = %source.display(), "compiling");
        let unit = compile_unit(&text).map_err(|e| CliError::compile(source, e))?;

        let mut outputs = Vec::new();
        if !self.stdout {
            outputs.push(self.write_artifact(source, ".vm", &unit.chunk.to_text())?);
        }
        if self.emit_tokens {
            outputs.push(self.write_artifact(source, "T.xml", &tokens_to_xml(&unit.tokens))?);
        }
        if self.emit_tree {
            outputs.push(self.write_artifact(source, ".xml", &tree_to_xml(&unit.tree, true))?);
        }
        if self.emit_json {
            let json = tree_to_json(&unit.tree).map_err(|e| CliError::compile(source, e))?;
            outputs.push(self.write_artifact(source, ".json", &json)?);
        }

        Ok(CompiledFile {
            source: source.to_path_buf(),
            outputs,
            unit,
        })
    }

    /// Where the artifact with `suffix` for `source` goes
    pub fn output_path(&self, source: &Path, suffix: &str) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{}{}", stem, suffix);
        match &self.out_dir {
            Some(dir) => dir.join(file_name),
            None => source.with_file_name(file_name),
        }
    }

    fn write_artifact(&self, source: &Path, suffix: &str, contents: &str) -> CliResult<PathBuf> {
        let path = self.output_path(source, suffix);
        fs::write(&path, contents).map_err(|e| CliError::io(&path, e))?;
        debug!(artifact = %path.display(), "wrote");
        Ok(path)
    }
}
