//! Jack lexer - tokenizes source code into tokens

use core_types::{CompileError, CompileResult, SourcePosition};
use serde::Serialize;
use std::fmt;

/// Jack reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    /// class keyword
    Class,
    /// constructor keyword
    Constructor,
    /// function keyword
    Function,
    /// method keyword
    Method,
    /// field keyword
    Field,
    /// static keyword
    Static,
    /// var keyword
    Var,
    /// int keyword
    Int,
    /// char keyword
    Char,
    /// boolean keyword
    Boolean,
    /// void keyword
    Void,
    /// true keyword
    True,
    /// false keyword
    False,
    /// null keyword
    Null,
    /// this keyword
    This,
    /// let keyword
    Let,
    /// do keyword
    Do,
    /// if keyword
    If,
    /// else keyword
    Else,
    /// while keyword
    While,
    /// return keyword
    Return,
}

impl Keyword {
    /// Look up the keyword spelled by `text`
    pub fn from_text(text: &str) -> Option<Self> {
        let keyword = match text {
            "class" => Keyword::Class,
            "constructor" => Keyword::Constructor,
            "function" => Keyword::Function,
            "method" => Keyword::Method,
            "field" => Keyword::Field,
            "static" => Keyword::Static,
            "var" => Keyword::Var,
            "int" => Keyword::Int,
            "char" => Keyword::Char,
            "boolean" => Keyword::Boolean,
            "void" => Keyword::Void,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "this" => Keyword::This,
            "let" => Keyword::Let,
            "do" => Keyword::Do,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "return" => Keyword::Return,
            _ => return None,
        };
        Some(keyword)
    }

    /// Source spelling of this keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-character symbols of the language
pub const SYMBOLS: [char; 19] = [
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

/// Check whether `ch` is one of the language's symbols
pub fn is_symbol(ch: char) -> bool {
    SYMBOLS.contains(&ch)
}

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Reserved word
    Keyword,
    /// Identifier (class, subroutine or variable name)
    Identifier,
    /// Single-character symbol
    Symbol,
    /// Run of decimal digits
    IntegerLiteral,
    /// Double-quoted string, quotes excluded
    StringLiteral,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Symbol => "symbol",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::StringLiteral => "string literal",
        };
        f.write_str(name)
    }
}

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Lexical category
    pub kind: TokenKind,
    /// Source text of the token (string literals exclude the quotes)
    pub text: String,
    /// Where the token starts
    pub position: SourcePosition,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, text: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// The keyword this token spells, if it is a keyword token
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword => Keyword::from_text(&self.text),
            _ => None,
        }
    }

    /// The symbol character, if it is a symbol token
    pub fn symbol(&self) -> Option<char> {
        match self.kind {
            TokenKind::Symbol => self.text.chars().next(),
            _ => None,
        }
    }

    /// Check for a specific keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }

    /// Check for a specific symbol
    pub fn is_symbol(&self, symbol: char) -> bool {
        self.symbol() == Some(symbol)
    }

    /// Human-readable description used in diagnostics, e.g. `keyword 'let'`
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::StringLiteral => format!("{} \"{}\"", self.kind, self.text),
            _ => format!("{} '{}'", self.kind, self.text),
        }
    }
}

/// Lexer for Jack source code
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    current_token: Option<Token>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            current_token: None,
        }
    }

    /// Get the next token from the source, or `None` at end of input
    pub fn next_token(&mut self) -> CompileResult<Option<Token>> {
        if let Some(token) = self.current_token.take() {
            return Ok(Some(token));
        }
        self.scan_token()
    }

    /// Peek at the next token without consuming it
    pub fn peek_token(&mut self) -> CompileResult<Option<&Token>> {
        if self.current_token.is_none() {
            self.current_token = self.scan_token()?;
        }
        Ok(self.current_token.as_ref())
    }

    /// Scan the rest of the input
    pub fn tokenize(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Position of the next unscanned character
    pub fn current_position(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    fn scan_token(&mut self) -> CompileResult<Option<Token>> {
        self.skip_whitespace_and_comments()?;

        if self.is_at_end() {
            return Ok(None);
        }

        let start_pos = self.current_position();
        let ch = self.advance();

        let token = match ch {
            '"' => self.scan_string(start_pos)?,
            '0'..='9' => self.scan_integer(ch, start_pos),
            'a'..='z' | 'A'..='Z' | '_' => self.scan_word(ch, start_pos),
            _ if is_symbol(ch) => Token::new(TokenKind::Symbol, ch.to_string(), start_pos),
            _ => {
                return Err(CompileError::lexical(
                    format!("Unexpected character '{}'", ch.escape_default()),
                    Some(start_pos),
                ))
            }
        };

        Ok(Some(token))
    }

    fn scan_string(&mut self, start_pos: SourcePosition) -> CompileResult<Token> {
        let mut value = String::new();

        loop {
            if self.is_at_end() || self.peek() == '\n' || self.peek() == '\r' {
                return Err(CompileError::lexical(
                    "Unterminated string literal",
                    Some(start_pos),
                ));
            }
            let ch = self.advance();
            match ch {
                '"' => break,
                // An escaped character never closes the literal; both are kept verbatim.
                '\\' if !self.is_at_end() && self.peek() != '\n' && self.peek() != '\r' => {
                    value.push(ch);
                    value.push(self.advance());
                }
                _ => value.push(ch),
            }
        }

        Ok(Token::new(TokenKind::StringLiteral, value, start_pos))
    }

    fn scan_integer(&mut self, first: char, start_pos: SourcePosition) -> Token {
        let mut digits = String::from(first);
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            digits.push(self.advance());
        }
        Token::new(TokenKind::IntegerLiteral, digits, start_pos)
    }

    fn scan_word(&mut self, first: char, start_pos: SourcePosition) -> Token {
        let mut word = String::from(first);
        while !self.is_at_end() && is_word_continue(self.peek()) {
            word.push(self.advance());
        }
        let kind = if Keyword::from_text(&word).is_some() {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, word, start_pos)
    }

    fn skip_whitespace_and_comments(&mut self) -> CompileResult<()> {
        while !self.is_at_end() {
            match self.peek() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '/' if self.peek_next() == Some('/') => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    let comment_start = self.current_position();
                    self.advance(); // /
                    self.advance(); // *
                    let mut found_end = false;
                    while !self.is_at_end() {
                        if self.peek() == '*' && self.peek_next() == Some('/') {
                            self.advance(); // *
                            self.advance(); // /
                            found_end = true;
                            break;
                        }
                        self.advance();
                    }
                    if !found_end {
                        return Err(CompileError::lexical(
                            "Unterminated block comment",
                            Some(comment_start),
                        ));
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.position]
        }
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.position];
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }
}

fn is_word_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Scan a whole source text into tokens
pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
    Lexer::new(source).tokenize()
}
