//! Symbol tables for identifier resolution
//!
//! A class is compiled against two tables: one for static and field
//! variables that lives as long as the class, and one for arguments and
//! locals that is replaced at every subroutine boundary.

use serde::Serialize;
use std::fmt;

/// Declaration class of a symbol. Each kind numbers its symbols independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    /// Class-wide variable shared by all instances
    Static,
    /// Per-instance variable
    Field,
    /// Subroutine local variable
    Var,
    /// Subroutine argument
    Arg,
}

impl SymbolKind {
    /// Whether symbols of this kind belong in the class-level table
    pub fn is_class_level(self) -> bool {
        matches!(self, SymbolKind::Static | SymbolKind::Field)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolKind::Static => "static",
            SymbolKind::Field => "field",
            SymbolKind::Var => "var",
            SymbolKind::Arg => "argument",
        };
        f.write_str(name)
    }
}

/// A declared name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    /// Declared name
    pub name: String,
    /// Declared type (`int`, `char`, `boolean` or a class name)
    pub declared_type: String,
    /// Declaration class
    pub kind: SymbolKind,
    /// Position within its kind, in declaration order
    pub index: u16,
}

/// Ordered collection of symbols for one scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol and return its index within `kind`
    pub fn define(&mut self, name: &str, declared_type: &str, kind: SymbolKind) -> u16 {
        let index = self.var_count(kind);
        self.symbols.push(Symbol {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            kind,
            index,
        });
        index
    }

    /// Number of symbols of the given kind
    pub fn var_count(&self, kind: SymbolKind) -> u16 {
        self.symbols.iter().filter(|s| s.kind == kind).count() as u16
    }

    /// Look up a symbol by name
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Whether `name` is declared in this table
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Kind of the named symbol
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.get(name).map(|s| s.kind)
    }

    /// Declared type of the named symbol
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|s| s.declared_type.as_str())
    }

    /// Index of the named symbol within its kind
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.get(name).map(|s| s.index)
    }

    /// All symbols in declaration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of symbols of every kind
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table holds no symbols
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// The two-level scope model used while parsing one class
#[derive(Debug, Clone, Default)]
pub struct Scopes {
    class_table: SymbolTable,
    subroutine_table: Option<SymbolTable>,
    finished: Vec<(String, SymbolTable)>,
}

impl Scopes {
    /// Create scopes for a new class
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a subroutine with an empty subroutine-level table
    pub fn enter_subroutine(&mut self) {
        self.subroutine_table = Some(SymbolTable::new());
    }

    /// Close the current subroutine, keeping its table for later inspection
    pub fn exit_subroutine(&mut self, name: &str) {
        if let Some(table) = self.subroutine_table.take() {
            self.finished.push((name.to_string(), table));
        }
    }

    /// Register a declaration in the table its kind belongs to
    ///
    /// Returns `None` when the name is already declared in that table.
    pub fn declare(&mut self, name: &str, declared_type: &str, kind: SymbolKind) -> Option<u16> {
        let table = if kind.is_class_level() {
            &mut self.class_table
        } else {
            self.subroutine_table.get_or_insert_with(SymbolTable::new)
        };
        if table.contains(name) {
            return None;
        }
        Some(table.define(name, declared_type, kind))
    }

    /// Resolve a usage: the subroutine table shadows the class table
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_table
            .as_ref()
            .and_then(|table| table.get(name))
            .or_else(|| self.class_table.get(name))
    }

    /// The class-level table
    pub fn class_table(&self) -> &SymbolTable {
        &self.class_table
    }

    /// The table a finished subroutine was compiled against
    pub fn subroutine_table(&self, name: &str) -> Option<&SymbolTable> {
        self.finished
            .iter()
            .find(|(sub, _)| sub == name)
            .map(|(_, table)| table)
    }
}
