//! Recursive descent parser for Jack
//!
//! Builds the annotated syntax tree and resolves identifiers in the same
//! pass: declarations are registered as they are parsed, so indices follow
//! source order, and every usage is looked up against the scopes that are
//! live at that point.

use crate::ast::{ASTNode, Binding, Identifier, IdentifierCategory, NodeKind};
use crate::error::{syntax_error, unexpected_eof, unexpected_token};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::scope::{Scopes, SymbolKind};
use core_types::{CompileResult, SourcePosition};
use std::collections::VecDeque;
use tracing::{debug, trace};

const BINARY_OPERATORS: [char; 9] = ['+', '-', '*', '/', '&', '|', '<', '>', '='];

/// Deepest nesting of terms or statement blocks the parser accepts
pub const MAX_NESTING_DEPTH: usize = 256;

/// Jack parser
pub struct Parser {
    lexer: Lexer,
    lookahead: VecDeque<Token>,
    scopes: Scopes,
    class_name: String,
    last_position: Option<SourcePosition>,
    depth: usize,
}

impl Parser {
    /// Create a parser that scans `source` on demand
    pub fn new(source: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: VecDeque::new(),
            scopes: Scopes::new(),
            class_name: String::new(),
            last_position: None,
            depth: 0,
        }
    }

    /// Create a parser over an already scanned token sequence
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            lookahead: tokens.into(),
            ..Self::new("")
        }
    }

    /// Parse one class, which must span the whole input
    pub fn parse(&mut self) -> CompileResult<ASTNode> {
        let class = self.parse_class()?;
        if let Some(token) = self.advance()? {
            return Err(unexpected_token("end of input", &token));
        }
        Ok(class)
    }

    /// Scopes built so far
    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    /// Name of the class being parsed
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    // ---- token access ----

    fn fill(&mut self, n: usize) -> CompileResult<()> {
        while self.lookahead.len() <= n {
            match self.lexer.next_token()? {
                Some(token) => self.lookahead.push_back(token),
                None => break,
            }
        }
        Ok(())
    }

    fn peek_nth(&mut self, n: usize) -> CompileResult<Option<&Token>> {
        self.fill(n)?;
        Ok(self.lookahead.get(n))
    }

    fn peek(&mut self) -> CompileResult<Option<&Token>> {
        self.peek_nth(0)
    }

    fn advance(&mut self) -> CompileResult<Option<Token>> {
        self.fill(0)?;
        let token = self.lookahead.pop_front();
        if let Some(token) = &token {
            self.last_position = Some(token.position);
        }
        Ok(token)
    }

    fn check_symbol(&mut self, symbol: char) -> CompileResult<bool> {
        Ok(self.peek()?.is_some_and(|t| t.is_symbol(symbol)))
    }

    fn peek_keyword(&mut self) -> CompileResult<Option<Keyword>> {
        Ok(self.peek()?.and_then(Token::keyword))
    }

    /// Consume the next token, checking its kind and/or text
    fn expect(&mut self, kind: Option<TokenKind>, text: Option<&str>) -> CompileResult<Token> {
        let expected = match (kind, text) {
            (Some(kind), Some(text)) => format!("{} '{}'", kind, text),
            (Some(kind), None) => kind.to_string(),
            (None, Some(text)) => format!("'{}'", text),
            (None, None) => "token".to_string(),
        };
        let token = match self.advance()? {
            Some(token) => token,
            None => return Err(unexpected_eof(&expected, self.eof_position())),
        };
        let kind_ok = kind.map_or(true, |k| token.kind == k);
        let text_ok = text.map_or(true, |t| token.text == t);
        if kind_ok && text_ok {
            Ok(token)
        } else {
            Err(unexpected_token(&expected, &token))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> CompileResult<ASTNode> {
        self.expect(Some(TokenKind::Keyword), Some(keyword.as_str()))?;
        Ok(ASTNode::Keyword(keyword))
    }

    fn expect_symbol(&mut self, symbol: char) -> CompileResult<ASTNode> {
        let mut buf = [0u8; 4];
        let text: &str = symbol.encode_utf8(&mut buf);
        self.expect(Some(TokenKind::Symbol), Some(text))?;
        Ok(ASTNode::Symbol(symbol))
    }

    /// Consume a keyword drawn from `allowed`
    fn expect_keyword_of(&mut self, allowed: &[Keyword], expected: &str) -> CompileResult<Keyword> {
        let token = match self.advance()? {
            Some(token) => token,
            None => return Err(unexpected_eof(expected, self.eof_position())),
        };
        match token.keyword() {
            Some(keyword) if allowed.contains(&keyword) => Ok(keyword),
            _ => Err(unexpected_token(expected, &token)),
        }
    }

    fn eof_position(&self) -> Option<SourcePosition> {
        self.last_position.or(Some(self.lexer.current_position()))
    }

    /// Run a recursive production one level deeper, failing past `MAX_NESTING_DEPTH`
    fn nested<T>(
        &mut self,
        what: &str,
        production: impl FnOnce(&mut Self) -> CompileResult<T>,
    ) -> CompileResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            let position = self.peek()?.map(|token| token.position);
            let position = position.or_else(|| self.eof_position());
            return Err(syntax_error(format!("{} nested too deeply", what), position));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    // ---- identifiers ----

    /// Consume an identifier and register it in the table for `kind`
    fn declare_variable(&mut self, declared_type: &str, kind: SymbolKind) -> CompileResult<ASTNode> {
        let token = self.expect(Some(TokenKind::Identifier), None)?;
        let index = self
            .scopes
            .declare(&token.text, declared_type, kind)
            .ok_or_else(|| {
                syntax_error(
                    format!("'{}' is already declared in this scope", token.text),
                    Some(token.position),
                )
            })?;
        trace!(name = %token.text, %kind, index, "declared");
        Ok(ASTNode::Identifier(Identifier {
            name: token.text,
            category: kind.into(),
            binding: Some(Binding {
                declared_type: declared_type.to_string(),
                index,
            }),
            is_declaration: true,
            position: token.position,
        }))
    }

    /// Consume an identifier that names a class or subroutine
    fn expect_name(
        &mut self,
        category: IdentifierCategory,
        is_declaration: bool,
    ) -> CompileResult<ASTNode> {
        let token = self.expect(Some(TokenKind::Identifier), None)?;
        Ok(ASTNode::Identifier(Identifier {
            name: token.text,
            category,
            binding: None,
            is_declaration,
            position: token.position,
        }))
    }

    /// Resolve a usage: subroutine scope first, then class scope. Unknown
    /// names become class names when a `.` follows, subroutine names otherwise.
    fn resolve_usage(&mut self, token: Token) -> CompileResult<ASTNode> {
        let resolved = self.scopes.resolve(&token.text).map(|symbol| {
            (
                IdentifierCategory::from(symbol.kind),
                Binding {
                    declared_type: symbol.declared_type.clone(),
                    index: symbol.index,
                },
            )
        });
        let (category, binding) = match resolved {
            Some((category, binding)) => (category, Some(binding)),
            None if self.check_symbol('.')? => (IdentifierCategory::ClassName, None),
            None => (IdentifierCategory::SubroutineName, None),
        };
        Ok(ASTNode::Identifier(Identifier {
            name: token.text,
            category,
            binding,
            is_declaration: false,
            position: token.position,
        }))
    }

    fn parse_variable_usage(&mut self) -> CompileResult<ASTNode> {
        let token = self.expect(Some(TokenKind::Identifier), None)?;
        self.resolve_usage(token)
    }

    // ---- program structure ----

    fn parse_class(&mut self) -> CompileResult<ASTNode> {
        let mut children = vec![self.expect_keyword(Keyword::Class)?];
        let name = self.expect_name(IdentifierCategory::ClassName, true)?;
        if let Some(identifier) = name.as_identifier() {
            self.class_name = identifier.name.clone();
        }
        debug!(class = %self.class_name, "parsing class");
        children.push(name);
        children.push(self.expect_symbol('{')?);

        while matches!(self.peek_keyword()?, Some(Keyword::Static | Keyword::Field)) {
            children.push(self.parse_class_var_dec()?);
        }
        while matches!(
            self.peek_keyword()?,
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            children.push(self.parse_subroutine_dec()?);
        }

        children.push(self.expect_symbol('}')?);
        Ok(ASTNode::node(NodeKind::Class, children))
    }

    fn parse_class_var_dec(&mut self) -> CompileResult<ASTNode> {
        let keyword =
            self.expect_keyword_of(&[Keyword::Static, Keyword::Field], "'static' or 'field'")?;
        let kind = if keyword == Keyword::Static {
            SymbolKind::Static
        } else {
            SymbolKind::Field
        };
        let mut children = vec![ASTNode::Keyword(keyword)];
        self.parse_declaration_list(kind, &mut children)?;
        Ok(ASTNode::node(NodeKind::ClassVarDec, children))
    }

    /// `type name (, name)* ;` shared by class and local variable declarations
    fn parse_declaration_list(
        &mut self,
        kind: SymbolKind,
        children: &mut Vec<ASTNode>,
    ) -> CompileResult<()> {
        let (type_node, declared_type) = self.parse_type(false)?;
        children.push(type_node);
        children.push(self.declare_variable(&declared_type, kind)?);
        while self.check_symbol(',')? {
            children.push(self.expect_symbol(',')?);
            children.push(self.declare_variable(&declared_type, kind)?);
        }
        children.push(self.expect_symbol(';')?);
        Ok(())
    }

    /// A primitive type keyword or a class name; returns the node and its spelling
    fn parse_type(&mut self, allow_void: bool) -> CompileResult<(ASTNode, String)> {
        let expected = if allow_void { "type or 'void'" } else { "type" };
        let token = match self.peek()? {
            Some(token) => token.clone(),
            None => return Err(unexpected_eof(expected, self.eof_position())),
        };
        match token.keyword() {
            Some(keyword @ (Keyword::Int | Keyword::Char | Keyword::Boolean)) => {
                self.advance()?;
                Ok((ASTNode::Keyword(keyword), token.text))
            }
            Some(Keyword::Void) if allow_void => {
                self.advance()?;
                Ok((ASTNode::Keyword(Keyword::Void), token.text))
            }
            None if token.kind == TokenKind::Identifier => {
                let node = self.expect_name(IdentifierCategory::ClassName, false)?;
                Ok((node, token.text))
            }
            _ => Err(unexpected_token(expected, &token)),
        }
    }

    fn parse_subroutine_dec(&mut self) -> CompileResult<ASTNode> {
        let keyword = self.expect_keyword_of(
            &[Keyword::Constructor, Keyword::Function, Keyword::Method],
            "'constructor', 'function' or 'method'",
        )?;
        let mut children = vec![ASTNode::Keyword(keyword)];
        let (return_type, _) = self.parse_type(true)?;
        children.push(return_type);

        let name = self.expect_name(IdentifierCategory::SubroutineName, true)?;
        let subroutine_name = name
            .as_identifier()
            .map(|identifier| identifier.name.clone())
            .unwrap_or_default();
        children.push(name);
        trace!(class = %self.class_name, subroutine = %subroutine_name, %keyword, "parsing subroutine");

        self.scopes.enter_subroutine();
        if keyword == Keyword::Method {
            let class_name = self.class_name.clone();
            let receiver = self.scopes.declare("this", &class_name, SymbolKind::Arg);
            debug_assert_eq!(receiver, Some(0), "method receiver must be argument 0");
        }

        children.push(self.expect_symbol('(')?);
        children.push(self.parse_parameter_list()?);
        children.push(self.expect_symbol(')')?);
        children.push(self.parse_subroutine_body()?);

        self.scopes.exit_subroutine(&subroutine_name);
        Ok(ASTNode::node(NodeKind::SubroutineDec, children))
    }

    fn parse_parameter_list(&mut self) -> CompileResult<ASTNode> {
        let mut children = Vec::new();
        if !self.check_symbol(')')? {
            loop {
                let (type_node, declared_type) = self.parse_type(false)?;
                children.push(type_node);
                children.push(self.declare_variable(&declared_type, SymbolKind::Arg)?);
                if !self.check_symbol(',')? {
                    break;
                }
                children.push(self.expect_symbol(',')?);
            }
        }
        Ok(ASTNode::node(NodeKind::ParameterList, children))
    }

    fn parse_subroutine_body(&mut self) -> CompileResult<ASTNode> {
        let mut children = vec![self.expect_symbol('{')?];
        while self.peek_keyword()? == Some(Keyword::Var) {
            children.push(self.parse_var_dec()?);
        }
        children.push(self.parse_statements()?);
        children.push(self.expect_symbol('}')?);
        Ok(ASTNode::node(NodeKind::SubroutineBody, children))
    }

    fn parse_var_dec(&mut self) -> CompileResult<ASTNode> {
        let mut children = vec![self.expect_keyword(Keyword::Var)?];
        self.parse_declaration_list(SymbolKind::Var, &mut children)?;
        Ok(ASTNode::node(NodeKind::VarDec, children))
    }

    // ---- statements ----

    fn parse_statements(&mut self) -> CompileResult<ASTNode> {
        let mut children = Vec::new();
        loop {
            let statement = match self.peek_keyword()? {
                Some(Keyword::Let) => self.parse_let()?,
                Some(Keyword::If) => self.parse_if()?,
                Some(Keyword::While) => self.parse_while()?,
                Some(Keyword::Do) => self.parse_do()?,
                Some(Keyword::Return) => self.parse_return()?,
                _ => break,
            };
            children.push(statement);
        }
        Ok(ASTNode::node(NodeKind::Statements, children))
    }

    fn parse_let(&mut self) -> CompileResult<ASTNode> {
        let mut children = vec![self.expect_keyword(Keyword::Let)?];
        children.push(self.parse_variable_usage()?);
        if self.check_symbol('[')? {
            children.push(self.expect_symbol('[')?);
            children.push(self.parse_expression()?);
            children.push(self.expect_symbol(']')?);
        }
        children.push(self.expect_symbol('=')?);
        children.push(self.parse_expression()?);
        children.push(self.expect_symbol(';')?);
        Ok(ASTNode::node(NodeKind::LetStatement, children))
    }

    fn parse_if(&mut self) -> CompileResult<ASTNode> {
        let mut children = vec![self.expect_keyword(Keyword::If)?];
        self.parse_condition_and_block(&mut children)?;
        if self.peek_keyword()? == Some(Keyword::Else) {
            children.push(self.expect_keyword(Keyword::Else)?);
            self.parse_block(&mut children)?;
        }
        Ok(ASTNode::node(NodeKind::IfStatement, children))
    }

    fn parse_while(&mut self) -> CompileResult<ASTNode> {
        let mut children = vec![self.expect_keyword(Keyword::While)?];
        self.parse_condition_and_block(&mut children)?;
        Ok(ASTNode::node(NodeKind::WhileStatement, children))
    }

    fn parse_condition_and_block(&mut self, children: &mut Vec<ASTNode>) -> CompileResult<()> {
        children.push(self.expect_symbol('(')?);
        children.push(self.parse_expression()?);
        children.push(self.expect_symbol(')')?);
        self.parse_block(children)
    }

    fn parse_block(&mut self, children: &mut Vec<ASTNode>) -> CompileResult<()> {
        children.push(self.expect_symbol('{')?);
        children.push(self.nested("statements", Self::parse_statements)?);
        children.push(self.expect_symbol('}')?);
        Ok(())
    }

    fn parse_do(&mut self) -> CompileResult<ASTNode> {
        let mut children = vec![self.expect_keyword(Keyword::Do)?];
        self.parse_subroutine_call_into(&mut children)?;
        children.push(self.expect_symbol(';')?);
        Ok(ASTNode::node(NodeKind::DoStatement, children))
    }

    fn parse_return(&mut self) -> CompileResult<ASTNode> {
        let mut children = vec![self.expect_keyword(Keyword::Return)?];
        if !self.check_symbol(';')? {
            children.push(self.parse_expression()?);
        }
        children.push(self.expect_symbol(';')?);
        Ok(ASTNode::node(NodeKind::ReturnStatement, children))
    }

    // ---- expressions ----

    fn parse_expression(&mut self) -> CompileResult<ASTNode> {
        let mut children = vec![self.parse_term()?];
        loop {
            let operator = self
                .peek()?
                .and_then(Token::symbol)
                .filter(|symbol| BINARY_OPERATORS.contains(symbol));
            match operator {
                Some(operator) => {
                    children.push(self.expect_symbol(operator)?);
                    children.push(self.parse_term()?);
                }
                None => break,
            }
        }
        Ok(ASTNode::node(NodeKind::Expression, children))
    }

    fn parse_term(&mut self) -> CompileResult<ASTNode> {
        self.nested("expression", Self::parse_term_at_depth)
    }

    fn parse_term_at_depth(&mut self) -> CompileResult<ASTNode> {
        let token = match self.peek()? {
            Some(token) => token.clone(),
            None => return Err(unexpected_eof("term", self.eof_position())),
        };
        let mut children = Vec::new();
        match token.kind {
            TokenKind::IntegerLiteral => {
                self.advance()?;
                children.push(ASTNode::IntegerLiteral(token.text));
            }
            TokenKind::StringLiteral => {
                self.advance()?;
                children.push(ASTNode::StringLiteral(token.text));
            }
            TokenKind::Keyword => match token.keyword() {
                Some(keyword @ (Keyword::True | Keyword::False | Keyword::Null | Keyword::This)) => {
                    self.advance()?;
                    children.push(ASTNode::Keyword(keyword));
                }
                _ => return Err(unexpected_token("term", &token)),
            },
            TokenKind::Symbol => match token.symbol() {
                Some('(') => {
                    children.push(self.expect_symbol('(')?);
                    children.push(self.parse_expression()?);
                    children.push(self.expect_symbol(')')?);
                }
                Some(operator @ ('-' | '~')) => {
                    children.push(self.expect_symbol(operator)?);
                    children.push(self.parse_term()?);
                }
                _ => return Err(unexpected_token("term", &token)),
            },
            TokenKind::Identifier => {
                let next = self.peek_nth(1)?.and_then(Token::symbol);
                match next {
                    Some('[') => {
                        children.push(self.parse_variable_usage()?);
                        children.push(self.expect_symbol('[')?);
                        children.push(self.parse_expression()?);
                        children.push(self.expect_symbol(']')?);
                    }
                    Some('(' | '.') => self.parse_subroutine_call_into(&mut children)?,
                    _ => children.push(self.parse_variable_usage()?),
                }
            }
        }
        Ok(ASTNode::node(NodeKind::Term, children))
    }

    /// `name ( args )` or `qualifier . name ( args )`, appended flat to `children`
    fn parse_subroutine_call_into(&mut self, children: &mut Vec<ASTNode>) -> CompileResult<()> {
        let is_qualified = self.peek_nth(1)?.is_some_and(|t| t.is_symbol('.'));
        if is_qualified {
            let qualifier = self.expect(Some(TokenKind::Identifier), None)?;
            children.push(self.resolve_usage(qualifier)?);
            children.push(self.expect_symbol('.')?);
        }
        children.push(self.expect_name(IdentifierCategory::SubroutineName, false)?);
        children.push(self.expect_symbol('(')?);
        children.push(self.parse_expression_list()?);
        children.push(self.expect_symbol(')')?);
        Ok(())
    }

    fn parse_expression_list(&mut self) -> CompileResult<ASTNode> {
        let mut children = Vec::new();
        if !self.check_symbol(')')? {
            children.push(self.parse_expression()?);
            while self.check_symbol(',')? {
                children.push(self.expect_symbol(',')?);
                children.push(self.parse_expression()?);
            }
        }
        Ok(ASTNode::node(NodeKind::ExpressionList, children))
    }
}

/// Parse a complete class from source text
pub fn parse(source: &str) -> CompileResult<ASTNode> {
    Parser::new(source).parse()
}
