//! Analyzer output: token and syntax tree dumps
//!
//! The XML forms match the analyzer conventions of the Jack toolchain: one
//! element per token or node, leaf text padded with a space on each side,
//! two spaces of indentation per tree level.

use crate::ast::{ASTNode, Identifier};
use crate::error::generation_error;
use crate::lexer::{Token, TokenKind};
use core_types::CompileResult;
use std::fmt::Write;

/// XML element name for a token kind
pub fn token_tag(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Keyword => "keyword",
        TokenKind::Symbol => "symbol",
        TokenKind::IntegerLiteral => "integerConstant",
        TokenKind::StringLiteral => "stringConstant",
        TokenKind::Identifier => "identifier",
    }
}

/// Escape the characters XML reserves
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render a token stream as a `<tokens>` document
pub fn tokens_to_xml(tokens: &[Token]) -> String {
    let mut out = String::from("<tokens>\n");
    for token in tokens {
        let tag = token_tag(token.kind);
        let _ = writeln!(out, "<{tag}> {} </{tag}>", escape_xml(&token.text));
    }
    out.push_str("</tokens>\n");
    out
}

/// Render a syntax tree as indented XML
///
/// With `annotate` set, identifier elements also carry their resolution:
/// `category`, `index` and `type` when known, and `declaration`.
pub fn tree_to_xml(node: &ASTNode, annotate: bool) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0, annotate);
    out
}

fn write_node(out: &mut String, node: &ASTNode, depth: usize, annotate: bool) {
    let indent = "  ".repeat(depth);
    match node {
        ASTNode::Node { kind, children } => {
            let tag = kind.tag();
            let _ = writeln!(out, "{indent}<{tag}>");
            for child in children {
                write_node(out, child, depth + 1, annotate);
            }
            let _ = writeln!(out, "{indent}</{tag}>");
        }
        ASTNode::Keyword(keyword) => write_leaf(out, &indent, "keyword", keyword.as_str()),
        ASTNode::Symbol(symbol) => write_leaf(out, &indent, "symbol", &symbol.to_string()),
        ASTNode::IntegerLiteral(text) => write_leaf(out, &indent, "integerConstant", text),
        ASTNode::StringLiteral(text) => write_leaf(out, &indent, "stringConstant", text),
        ASTNode::Identifier(identifier) if annotate => {
            let _ = writeln!(
                out,
                "{indent}<identifier{}> {} </identifier>",
                identifier_attributes(identifier),
                escape_xml(&identifier.name)
            );
        }
        ASTNode::Identifier(identifier) => {
            write_leaf(out, &indent, "identifier", &identifier.name)
        }
    }
}

fn write_leaf(out: &mut String, indent: &str, tag: &str, text: &str) {
    let _ = writeln!(out, "{indent}<{tag}> {} </{tag}>", escape_xml(text));
}

fn identifier_attributes(identifier: &Identifier) -> String {
    let mut attributes = format!(" category=\"{}\"", identifier.category.as_str());
    if let Some(index) = identifier.index() {
        let _ = write!(attributes, " index=\"{}\"", index);
    }
    if let Some(declared_type) = identifier.declared_type() {
        let _ = write!(attributes, " type=\"{}\"", escape_xml(declared_type));
    }
    let _ = write!(attributes, " declaration=\"{}\"", identifier.is_declaration);
    attributes
}

/// Render a syntax tree as pretty-printed JSON
pub fn tree_to_json(node: &ASTNode) -> CompileResult<String> {
    serde_json::to_string_pretty(node)
        .map_err(|e| generation_error(format!("failed to serialize syntax tree: {}", e), None))
}
