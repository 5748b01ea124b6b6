//! VM code generation from the annotated syntax tree

use crate::ast::{ASTNode, Identifier, IdentifierCategory, NodeKind};
use crate::error::generation_error;
use crate::lexer::Keyword;
use core_types::{CompileError, CompileResult, SourcePosition};
use tracing::{debug, trace};
use vm_system::{Opcode, Segment, VmChunk};

/// Largest integer constant the VM can push
pub const MAX_INTEGER_CONSTANT: u16 = 32767;

/// Code generator that converts one class tree into VM instructions
///
/// Holds the per-class state: the field count used by constructors and the
/// label counter. Create a fresh generator for every class.
pub struct CodeGenerator {
    chunk: VmChunk,
    class_name: String,
    field_count: u16,
    label_counter: usize,
}

impl CodeGenerator {
    /// Create a new code generator
    pub fn new() -> Self {
        Self {
            chunk: VmChunk::default(),
            class_name: String::new(),
            field_count: 0,
            label_counter: 0,
        }
    }

    /// Generate the instructions for a `Class` tree
    pub fn generate(&mut self, class: &ASTNode) -> CompileResult<VmChunk> {
        if !class.is(NodeKind::Class) {
            return Err(unsupported("class", class));
        }
        self.class_name = class
            .identifiers()
            .next()
            .map(|identifier| identifier.name.clone())
            .ok_or_else(|| generation_error("class has no name", None))?;
        self.chunk = VmChunk::new(self.class_name.clone());
        self.label_counter = 0;
        self.field_count = class
            .children_of_kind(NodeKind::ClassVarDec)
            .flat_map(ASTNode::identifiers)
            .filter(|identifier| identifier.category == IdentifierCategory::Field)
            .count() as u16;
        debug!(class = %self.class_name, fields = self.field_count, "generating class");

        for subroutine in class.children_of_kind(NodeKind::SubroutineDec) {
            self.generate_subroutine(subroutine)?;
        }
        Ok(std::mem::take(&mut self.chunk))
    }

    fn emit(&mut self, opcode: Opcode) {
        self.chunk.emit(opcode);
    }

    fn next_label(&mut self) -> usize {
        let label = self.label_counter;
        self.label_counter += 1;
        label
    }

    fn generate_subroutine(&mut self, node: &ASTNode) -> CompileResult<()> {
        let children = node.children();
        let keyword = children
            .first()
            .and_then(ASTNode::as_keyword)
            .ok_or_else(|| unsupported("subroutine declaration", node))?;
        let name = node
            .identifiers()
            .find(|identifier| identifier.category == IdentifierCategory::SubroutineName)
            .ok_or_else(|| unsupported("subroutine declaration", node))?;
        let body = node
            .first_child(NodeKind::SubroutineBody)
            .ok_or_else(|| unsupported("subroutine declaration", node))?;

        let local_count = body
            .children_of_kind(NodeKind::VarDec)
            .flat_map(ASTNode::identifiers)
            .filter(|identifier| identifier.category == IdentifierCategory::Var)
            .count() as u16;
        let function_name = format!("{}.{}", self.class_name, name.name);
        trace!(function = %function_name, locals = local_count, "generating subroutine");
        self.emit(Opcode::Function(function_name, local_count));

        match keyword {
            Keyword::Constructor => {
                self.emit(Opcode::Push(Segment::Constant, self.field_count));
                self.emit(Opcode::Call("Memory.alloc".to_string(), 1));
                self.emit(Opcode::Pop(Segment::Pointer, 0));
            }
            Keyword::Method => {
                self.emit(Opcode::Push(Segment::Argument, 0));
                self.emit(Opcode::Pop(Segment::Pointer, 0));
            }
            _ => {}
        }

        let statements = body
            .first_child(NodeKind::Statements)
            .ok_or_else(|| unsupported("subroutine body", body))?;
        self.generate_statements(statements)
    }

    // ---- statements ----

    fn generate_statements(&mut self, node: &ASTNode) -> CompileResult<()> {
        for statement in node.children() {
            match statement.kind() {
                Some(NodeKind::LetStatement) => self.generate_let(statement)?,
                Some(NodeKind::IfStatement) => self.generate_if(statement)?,
                Some(NodeKind::WhileStatement) => self.generate_while(statement)?,
                Some(NodeKind::DoStatement) => self.generate_do(statement)?,
                Some(NodeKind::ReturnStatement) => self.generate_return(statement)?,
                _ => return Err(unsupported("statement", statement)),
            }
        }
        Ok(())
    }

    fn generate_let(&mut self, node: &ASTNode) -> CompileResult<()> {
        let target = node
            .identifiers()
            .next()
            .ok_or_else(|| unsupported("let statement", node))?;
        let (segment, index) = variable_location(target)?;
        let expressions: Vec<&ASTNode> = node.children_of_kind(NodeKind::Expression).collect();

        match expressions.as_slice() {
            [value] => {
                self.generate_expression(value)?;
                self.emit(Opcode::Pop(segment, index));
            }
            [subscript, value] => {
                self.emit(Opcode::Push(segment, index));
                self.generate_expression(subscript)?;
                self.emit(Opcode::Add);
                self.generate_expression(value)?;
                self.emit(Opcode::Pop(Segment::Temp, 0));
                self.emit(Opcode::Pop(Segment::Pointer, 1));
                self.emit(Opcode::Push(Segment::Temp, 0));
                self.emit(Opcode::Pop(Segment::That, 0));
            }
            _ => return Err(unsupported("let statement", node)),
        }
        Ok(())
    }

    fn generate_if(&mut self, node: &ASTNode) -> CompileResult<()> {
        let condition = node
            .first_child(NodeKind::Expression)
            .ok_or_else(|| unsupported("if statement", node))?;
        let branches: Vec<&ASTNode> = node.children_of_kind(NodeKind::Statements).collect();
        let (then_branch, else_branch) = match branches.as_slice() {
            [then_branch] => (*then_branch, None),
            [then_branch, else_branch] => (*then_branch, Some(*else_branch)),
            _ => return Err(unsupported("if statement", node)),
        };

        let n = self.next_label();
        let else_label = format!("ELSE{}", n);
        let end_label = format!("ENDIF{}", n);

        self.generate_expression(condition)?;
        self.emit(Opcode::Not);
        self.emit(Opcode::IfGoto(else_label.clone()));
        self.generate_statements(then_branch)?;
        self.emit(Opcode::Goto(end_label.clone()));
        self.emit(Opcode::Label(else_label));
        if let Some(else_branch) = else_branch {
            self.generate_statements(else_branch)?;
        }
        self.emit(Opcode::Label(end_label));
        Ok(())
    }

    fn generate_while(&mut self, node: &ASTNode) -> CompileResult<()> {
        let condition = node
            .first_child(NodeKind::Expression)
            .ok_or_else(|| unsupported("while statement", node))?;
        let body = node
            .first_child(NodeKind::Statements)
            .ok_or_else(|| unsupported("while statement", node))?;

        let n = self.next_label();
        let start_label = format!("STARTWHILE{}", n);
        let end_label = format!("ENDWHILE{}", n);

        self.emit(Opcode::Label(start_label.clone()));
        self.generate_expression(condition)?;
        self.emit(Opcode::Not);
        self.emit(Opcode::IfGoto(end_label.clone()));
        self.generate_statements(body)?;
        self.emit(Opcode::Goto(start_label));
        self.emit(Opcode::Label(end_label));
        Ok(())
    }

    fn generate_do(&mut self, node: &ASTNode) -> CompileResult<()> {
        let children = node.children();
        if children.len() < 3 {
            return Err(unsupported("do statement", node));
        }
        // strip `do` and `;`
        self.generate_call(&children[1..children.len() - 1], node)?;
        self.emit(Opcode::Pop(Segment::Temp, 0));
        Ok(())
    }

    fn generate_return(&mut self, node: &ASTNode) -> CompileResult<()> {
        match node.first_child(NodeKind::Expression) {
            Some(value) => self.generate_expression(value)?,
            None => self.emit(Opcode::Push(Segment::Constant, 0)),
        }
        self.emit(Opcode::Return);
        Ok(())
    }

    // ---- expressions ----

    fn generate_expression(&mut self, node: &ASTNode) -> CompileResult<()> {
        let children = node.children();
        let (first, rest) = children
            .split_first()
            .ok_or_else(|| unsupported("expression", node))?;
        self.generate_term(first)?;

        for pair in rest.chunks(2) {
            let (operator, term) = match pair {
                [operator, term] => (operator, term),
                _ => return Err(unsupported("expression", node)),
            };
            let symbol = operator
                .as_symbol()
                .ok_or_else(|| unsupported("operator", operator))?;
            self.generate_term(term)?;
            self.generate_operator(symbol, node)?;
        }
        Ok(())
    }

    fn generate_operator(&mut self, symbol: char, node: &ASTNode) -> CompileResult<()> {
        let opcode = match symbol {
            '+' => Opcode::Add,
            '-' => Opcode::Sub,
            '&' => Opcode::And,
            '|' => Opcode::Or,
            '=' => Opcode::Eq,
            '>' => Opcode::Gt,
            '<' => Opcode::Lt,
            '*' => Opcode::Call("Math.multiply".to_string(), 2),
            '/' => Opcode::Call("Math.divide".to_string(), 2),
            _ => {
                return Err(generation_error(
                    format!("unsupported operator '{}'", symbol),
                    node.position(),
                ))
            }
        };
        self.emit(opcode);
        Ok(())
    }

    fn generate_term(&mut self, node: &ASTNode) -> CompileResult<()> {
        if !node.is(NodeKind::Term) {
            return Err(unsupported("term", node));
        }
        let children = node.children();
        let first = children.first().ok_or_else(|| unsupported("term", node))?;

        match first {
            ASTNode::IntegerLiteral(text) => {
                let value = parse_integer_constant(text, node.position())?;
                self.emit(Opcode::Push(Segment::Constant, value));
            }
            ASTNode::StringLiteral(text) => self.generate_string(text, node)?,
            ASTNode::Keyword(keyword) => self.generate_keyword_constant(*keyword, node)?,
            ASTNode::Symbol('(') => {
                let inner = node
                    .first_child(NodeKind::Expression)
                    .ok_or_else(|| unsupported("parenthesized expression", node))?;
                self.generate_expression(inner)?;
            }
            ASTNode::Symbol(operator @ ('-' | '~')) => {
                let operand = node
                    .first_child(NodeKind::Term)
                    .ok_or_else(|| unsupported("unary expression", node))?;
                self.generate_term(operand)?;
                self.emit(if *operator == '-' { Opcode::Neg } else { Opcode::Not });
            }
            ASTNode::Identifier(identifier) => match children.get(1) {
                None => {
                    let (segment, index) = variable_location(identifier)?;
                    self.emit(Opcode::Push(segment, index));
                }
                Some(next) if next.is_symbol('[') => {
                    let subscript = node
                        .first_child(NodeKind::Expression)
                        .ok_or_else(|| unsupported("array access", node))?;
                    let (segment, index) = variable_location(identifier)?;
                    self.emit(Opcode::Push(segment, index));
                    self.generate_expression(subscript)?;
                    self.emit(Opcode::Add);
                    self.emit(Opcode::Pop(Segment::Pointer, 1));
                    self.emit(Opcode::Push(Segment::That, 0));
                }
                Some(_) => self.generate_call(children, node)?,
            },
            _ => return Err(unsupported("term", node)),
        }
        Ok(())
    }

    fn generate_keyword_constant(&mut self, keyword: Keyword, node: &ASTNode) -> CompileResult<()> {
        match keyword {
            Keyword::True => {
                self.emit(Opcode::Push(Segment::Constant, 1));
                self.emit(Opcode::Neg);
            }
            Keyword::False | Keyword::Null => self.emit(Opcode::Push(Segment::Constant, 0)),
            Keyword::This => self.emit(Opcode::Push(Segment::Pointer, 0)),
            _ => return Err(unsupported("keyword constant", node)),
        }
        Ok(())
    }

    fn generate_string(&mut self, text: &str, node: &ASTNode) -> CompileResult<()> {
        let codes = text
            .chars()
            .map(|ch| {
                u16::try_from(u32::from(ch))
                    .ok()
                    .filter(|code| *code <= MAX_INTEGER_CONSTANT)
                    .ok_or_else(|| {
                        generation_error(
                            format!(
                                "character {:?} (U+{:04X}) cannot be encoded as a constant",
                                ch,
                                u32::from(ch)
                            ),
                            node.position(),
                        )
                    })
            })
            .collect::<CompileResult<Vec<u16>>>()?;
        let length = u16::try_from(codes.len())
            .ok()
            .filter(|len| *len <= MAX_INTEGER_CONSTANT)
            .ok_or_else(|| generation_error("string literal is too long", node.position()))?;
        self.emit(Opcode::Push(Segment::Constant, length));
        self.emit(Opcode::Call("String.new".to_string(), 1));
        for code in codes {
            self.emit(Opcode::Push(Segment::Constant, code));
            self.emit(Opcode::Call("String.appendChar".to_string(), 2));
        }
        Ok(())
    }

    /// Emit a call from its flat pieces: `f ( args )` or `q . f ( args )`
    fn generate_call(&mut self, pieces: &[ASTNode], node: &ASTNode) -> CompileResult<()> {
        let names: Vec<&Identifier> = pieces.iter().filter_map(ASTNode::as_identifier).collect();
        let arguments = pieces
            .iter()
            .find(|piece| piece.is(NodeKind::ExpressionList))
            .ok_or_else(|| unsupported("subroutine call", node))?;

        let (target, implicit_receiver) = match names.as_slice() {
            [subroutine] => {
                self.emit(Opcode::Push(Segment::Pointer, 0));
                (format!("{}.{}", self.class_name, subroutine.name), 1)
            }
            [qualifier, subroutine] if qualifier.is_variable() => {
                let (segment, index) = variable_location(qualifier)?;
                let class = qualifier
                    .declared_type()
                    .ok_or_else(|| unsupported("subroutine call", node))?;
                self.emit(Opcode::Push(segment, index));
                (format!("{}.{}", class, subroutine.name), 1)
            }
            [qualifier, subroutine] => (format!("{}.{}", qualifier.name, subroutine.name), 0),
            _ => return Err(unsupported("subroutine call", node)),
        };

        let mut argument_count: u16 = implicit_receiver;
        for argument in arguments.children_of_kind(NodeKind::Expression) {
            self.generate_expression(argument)?;
            argument_count += 1;
        }
        self.emit(Opcode::Call(target, argument_count));
        Ok(())
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment and index a variable identifier lives at
fn variable_location(identifier: &Identifier) -> CompileResult<(Segment, u16)> {
    let segment = match identifier.category {
        IdentifierCategory::Field => Segment::This,
        IdentifierCategory::Static => Segment::Static,
        IdentifierCategory::Var => Segment::Local,
        IdentifierCategory::Arg => Segment::Argument,
        IdentifierCategory::ClassName | IdentifierCategory::SubroutineName => {
            return Err(generation_error(
                format!("'{}' is not a variable", identifier.name),
                Some(identifier.position),
            ))
        }
    };
    let index = identifier.index().ok_or_else(|| {
        generation_error(
            format!("variable '{}' was not resolved", identifier.name),
            Some(identifier.position),
        )
    })?;
    Ok((segment, index))
}

fn parse_integer_constant(text: &str, position: Option<SourcePosition>) -> CompileResult<u16> {
    text.parse::<u16>()
        .ok()
        .filter(|value| *value <= MAX_INTEGER_CONSTANT)
        .ok_or_else(|| {
            generation_error(
                format!("integer constant {} is out of range 0..={}", text, MAX_INTEGER_CONSTANT),
                position,
            )
        })
}

fn unsupported(what: &str, node: &ASTNode) -> CompileError {
    generation_error(format!("malformed {}", what), node.position())
}
