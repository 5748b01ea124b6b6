//! Annotated syntax tree node definitions
//!
//! The tree mirrors the grammar one production per node: every non-leaf node
//! owns its children in source order, including the keyword and symbol
//! tokens the production consumed. Identifier leaves carry the result of
//! scope resolution.

use crate::lexer::Keyword;
use crate::scope::SymbolKind;
use core_types::SourcePosition;
use serde::Serialize;

/// Grammar production a non-leaf node was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    /// `class Name { ... }`
    Class,
    /// `static|field type name (, name)* ;`
    ClassVarDec,
    /// `constructor|function|method type name ( params ) body`
    SubroutineDec,
    /// Formal parameters, possibly empty
    ParameterList,
    /// `{ varDec* statements }`
    SubroutineBody,
    /// `var type name (, name)* ;`
    VarDec,
    /// Zero or more statements
    Statements,
    /// `let name ([ expr ])? = expr ;`
    LetStatement,
    /// `if ( expr ) { statements } (else { statements })?`
    IfStatement,
    /// `while ( expr ) { statements }`
    WhileStatement,
    /// `do call ;`
    DoStatement,
    /// `return expr? ;`
    ReturnStatement,
    /// `term (op term)*`
    Expression,
    /// Operand of an expression
    Term,
    /// Call arguments, possibly empty
    ExpressionList,
}

impl NodeKind {
    /// Element name used when the tree is rendered as XML
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::ClassVarDec => "classVarDec",
            NodeKind::SubroutineDec => "subroutineDec",
            NodeKind::ParameterList => "parameterList",
            NodeKind::SubroutineBody => "subroutineBody",
            NodeKind::VarDec => "varDec",
            NodeKind::Statements => "statements",
            NodeKind::LetStatement => "letStatement",
            NodeKind::IfStatement => "ifStatement",
            NodeKind::WhileStatement => "whileStatement",
            NodeKind::DoStatement => "doStatement",
            NodeKind::ReturnStatement => "returnStatement",
            NodeKind::Expression => "expression",
            NodeKind::Term => "term",
            NodeKind::ExpressionList => "expressionList",
        }
    }
}

/// What an identifier names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IdentifierCategory {
    /// Static variable
    Static,
    /// Field variable
    Field,
    /// Local variable
    Var,
    /// Argument
    Arg,
    /// Class name (declared, used as a type, or a call qualifier)
    ClassName,
    /// Subroutine name
    SubroutineName,
}

impl IdentifierCategory {
    /// Whether the identifier denotes a storage location
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            IdentifierCategory::Static
                | IdentifierCategory::Field
                | IdentifierCategory::Var
                | IdentifierCategory::Arg
        )
    }

    /// Lowercase name used in annotated dumps
    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierCategory::Static => "static",
            IdentifierCategory::Field => "field",
            IdentifierCategory::Var => "var",
            IdentifierCategory::Arg => "arg",
            IdentifierCategory::ClassName => "class",
            IdentifierCategory::SubroutineName => "subroutine",
        }
    }
}

impl From<SymbolKind> for IdentifierCategory {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Static => IdentifierCategory::Static,
            SymbolKind::Field => IdentifierCategory::Field,
            SymbolKind::Var => IdentifierCategory::Var,
            SymbolKind::Arg => IdentifierCategory::Arg,
        }
    }
}

/// Scope-table entry an identifier resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Declared type of the variable
    pub declared_type: String,
    /// Index within its kind
    pub index: u16,
}

/// Identifier leaf with its resolution payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    /// Source name
    pub name: String,
    /// What the name denotes
    pub category: IdentifierCategory,
    /// Present for variables, absent for class and subroutine names
    pub binding: Option<Binding>,
    /// True at the declaring occurrence, false at usages
    pub is_declaration: bool,
    /// Source location
    pub position: SourcePosition,
}

impl Identifier {
    /// Index within the symbol's kind, if the identifier is a variable
    pub fn index(&self) -> Option<u16> {
        self.binding.as_ref().map(|b| b.index)
    }

    /// Declared type, if the identifier is a variable
    pub fn declared_type(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.declared_type.as_str())
    }

    /// Whether the identifier denotes a storage location
    pub fn is_variable(&self) -> bool {
        self.category.is_variable()
    }
}

/// Node of the annotated syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ASTNode {
    /// Non-leaf node built from one grammar production
    Node {
        /// Production
        kind: NodeKind,
        /// Children in source order
        children: Vec<ASTNode>,
    },
    /// Keyword leaf
    Keyword(Keyword),
    /// Symbol leaf
    Symbol(char),
    /// Integer literal leaf, digits as written
    IntegerLiteral(String),
    /// String literal leaf, quotes excluded
    StringLiteral(String),
    /// Identifier leaf
    Identifier(Identifier),
}

impl ASTNode {
    /// Build a non-leaf node
    pub fn node(kind: NodeKind, children: Vec<ASTNode>) -> Self {
        ASTNode::Node { kind, children }
    }

    /// Production of a non-leaf node
    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            ASTNode::Node { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Check for a non-leaf node of the given production
    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Children of a non-leaf node; leaves have none
    pub fn children(&self) -> &[ASTNode] {
        match self {
            ASTNode::Node { children, .. } => children,
            _ => &[],
        }
    }

    /// Children built from the given production
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &ASTNode> {
        self.children().iter().filter(move |child| child.is(kind))
    }

    /// First child built from the given production
    pub fn first_child(&self, kind: NodeKind) -> Option<&ASTNode> {
        self.children_of_kind(kind).next()
    }

    /// Identifier children in order
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.children().iter().filter_map(ASTNode::as_identifier)
    }

    /// The identifier payload, if this is an identifier leaf
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            ASTNode::Identifier(identifier) => Some(identifier),
            _ => None,
        }
    }

    /// The keyword, if this is a keyword leaf
    pub fn as_keyword(&self) -> Option<Keyword> {
        match self {
            ASTNode::Keyword(keyword) => Some(*keyword),
            _ => None,
        }
    }

    /// The symbol, if this is a symbol leaf
    pub fn as_symbol(&self) -> Option<char> {
        match self {
            ASTNode::Symbol(symbol) => Some(*symbol),
            _ => None,
        }
    }

    /// Check for a specific symbol leaf
    pub fn is_symbol(&self, symbol: char) -> bool {
        self.as_symbol() == Some(symbol)
    }

    /// Position of the first identifier at or below this node, for diagnostics
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            ASTNode::Identifier(identifier) => Some(identifier.position),
            ASTNode::Node { children, .. } => children.iter().find_map(ASTNode::position),
            _ => None,
        }
    }

    /// This node and all its descendants in depth-first order
    pub fn walk(&self) -> Vec<&ASTNode> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }
}
