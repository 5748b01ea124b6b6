//! VM chunk - the generated instructions for one class
//!
//! A chunk is what one compilation unit produces and what one `.vm` file
//! holds.

use crate::opcode::{Opcode, VmParseError};
use serde::Serialize;
use std::fmt;

/// The stack-machine instructions compiled from one class
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VmChunk {
    /// Name of the class the instructions were compiled from
    pub name: String,
    /// Sequence of instructions in emission order
    pub instructions: Vec<Opcode>,
}

impl VmChunk {
    /// Create a new empty chunk for the named class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: Vec::new(),
        }
    }

    /// Append an instruction
    pub fn emit(&mut self, opcode: Opcode) {
        self.instructions.push(opcode);
    }

    /// Get the number of instructions
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Check whether nothing has been emitted yet
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of `function` headers in the chunk
    pub fn function_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|op| matches!(op, Opcode::Function(..)))
            .count()
    }

    /// Render each instruction as one wire-format line
    pub fn lines(&self) -> Vec<String> {
        self.instructions.iter().map(Opcode::to_string).collect()
    }

    /// Serialize the chunk to the text wire format, one newline-terminated
    /// instruction per line
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for op in &self.instructions {
            text.push_str(&op.to_string());
            text.push('\n');
        }
        text
    }

    /// Deserialize a chunk from the text wire format
    ///
    /// Blank lines and `//` comments (whole-line or trailing) are ignored.
    pub fn from_text(name: impl Into<String>, text: &str) -> Result<Self, VmParseError> {
        let mut chunk = VmChunk::new(name);

        for (number, raw) in text.lines().enumerate() {
            let line = match raw.find("//") {
                Some(idx) => &raw[..idx],
                None => raw,
            };
            if line.trim().is_empty() {
                continue;
            }
            let opcode = Opcode::parse_line(line).map_err(|err| VmParseError::AtLine {
                line: number + 1,
                source: Box::new(err),
            })?;
            chunk.emit(opcode);
        }

        Ok(chunk)
    }
}

impl fmt::Display for VmChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
