//! Jack Compiler Component
//!
//! Provides the scanner, scope tables, resolving parser and VM code
//! generator for the Jack class language, plus the analyzer's XML and JSON
//! dumps.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes Jack source code
//! - [`Token`] - Keywords, identifiers, symbols and literals
//! - [`Parser`] - Recursive descent parser producing an annotated tree
//! - [`ASTNode`] - Syntax tree node with resolved identifier leaves
//! - [`Scopes`] - Class-level and subroutine-level symbol tables
//! - [`CodeGenerator`] - Converts a class tree to VM instructions
//!
//! # Example
//!
//! ```
//! use jack_compiler::{CodeGenerator, Parser};
//!
//! let source = "class Main { function void main() { return; } }";
//! let mut parser = Parser::new(source);
//! let tree = parser.parse().unwrap();
//!
//! let mut gen = CodeGenerator::new();
//! let chunk = gen.generate(&tree).unwrap();
//! assert_eq!(chunk.lines()[0], "function Main.main 0");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod codegen;
pub mod dump;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod scope;

pub use ast::{ASTNode, Binding, Identifier, IdentifierCategory, NodeKind};
pub use codegen::CodeGenerator;
pub use dump::{tokens_to_xml, tree_to_json, tree_to_xml};
pub use lexer::{tokenize, Keyword, Lexer, Token, TokenKind};
pub use parser::{parse, Parser, MAX_NESTING_DEPTH};
pub use scope::{Scopes, Symbol, SymbolKind, SymbolTable};

use core_types::CompileResult;
use vm_system::VmChunk;

/// Compile one class from source text to VM instructions
pub fn compile(source: &str) -> CompileResult<VmChunk> {
    let tree = parse(source)?;
    CodeGenerator::new().generate(&tree)
}

/// Everything one compilation produces
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    /// Scanned tokens
    pub tokens: Vec<Token>,
    /// Annotated syntax tree
    pub tree: ASTNode,
    /// Generated instructions
    pub chunk: VmChunk,
}

impl CompilationUnit {
    /// Name of the compiled class
    pub fn class_name(&self) -> &str {
        &self.chunk.name
    }
}

/// Compile one class, keeping the tokens and tree for dumps
pub fn compile_unit(source: &str) -> CompileResult<CompilationUnit> {
    let tokens = tokenize(source)?;
    let tree = Parser::from_tokens(tokens.clone()).parse()?;
    let chunk = CodeGenerator::new().generate(&tree)?;
    Ok(CompilationUnit {
        tokens,
        tree,
        chunk,
    })
}
