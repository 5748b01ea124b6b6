//! Stack-machine commands and memory segments
//!
//! Every [`Opcode`] renders as exactly one line of the wire format and can
//! be parsed back from it.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error produced when a line of stack-machine text cannot be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmParseError {
    /// The command word is not part of the instruction set
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    /// The segment name is not one of the eight segments
    #[error("unknown segment '{0}'")]
    UnknownSegment(String),
    /// The command has the wrong number of operands
    #[error("'{command}' expects {expected} operand(s), got {got}")]
    OperandCount {
        /// Command word
        command: String,
        /// Required operand count
        expected: usize,
        /// Operand count found on the line
        got: usize,
    },
    /// A numeric operand could not be parsed
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    /// `pop constant` has no meaning
    #[error("cannot pop into the constant segment")]
    PopConstant,
    /// Error annotated with the 1-based line it occurred on
    #[error("line {line}: {source}")]
    AtLine {
        /// Line number in the decoded text
        line: usize,
        /// Underlying error
        source: Box<VmParseError>,
    },
}

/// Named memory region addressed by a small index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Segment {
    /// Read-only pseudo segment holding the index itself
    Constant,
    /// Current function's local variables
    Local,
    /// Current function's arguments
    Argument,
    /// Fields of the object anchored at `pointer 0`
    This,
    /// Array cells at the address anchored at `pointer 1`
    That,
    /// Class-wide static variables
    Static,
    /// Eight scratch registers
    Temp,
    /// The THIS and THAT base registers
    Pointer,
}

impl Segment {
    /// Wire name of this segment
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Static => "static",
            Segment::Temp => "temp",
            Segment::Pointer => "pointer",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Segment {
    type Err = VmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Segment::Constant),
            "local" => Ok(Segment::Local),
            "argument" => Ok(Segment::Argument),
            "this" => Ok(Segment::This),
            "that" => Ok(Segment::That),
            "static" => Ok(Segment::Static),
            "temp" => Ok(Segment::Temp),
            "pointer" => Ok(Segment::Pointer),
            other => Err(VmParseError::UnknownSegment(other.to_string())),
        }
    }
}

/// Stack-machine commands
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Opcode {
    // Memory access
    /// Push the value at segment[index]
    Push(Segment, u16),
    /// Pop the top of stack into segment[index]
    Pop(Segment, u16),

    // Arithmetic and logical operations
    /// Integer addition
    Add,
    /// Integer subtraction (second-top minus top)
    Sub,
    /// Arithmetic negation
    Neg,
    /// Equality, pushes -1 (true) or 0 (false)
    Eq,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Bitwise and
    And,
    /// Bitwise or
    Or,
    /// Bitwise not
    Not,

    // Branching
    /// Declare a label
    Label(String),
    /// Unconditional jump
    Goto(String),
    /// Pop the top of stack and jump if it is non-zero
    IfGoto(String),

    // Functions
    /// Function entry with its local variable count
    Function(String, u16),
    /// Call a function with the given argument count
    Call(String, u16),
    /// Return to the caller
    Return,
}

impl Opcode {
    /// Check if this opcode ends straight-line control flow
    pub fn is_terminator(&self) -> bool {
        matches!(self, Opcode::Return | Opcode::Goto(_) | Opcode::IfGoto(_))
    }

    /// Check if this opcode is one of the nine stack arithmetic/logical commands
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Sub
                | Opcode::Neg
                | Opcode::Eq
                | Opcode::Gt
                | Opcode::Lt
                | Opcode::And
                | Opcode::Or
                | Opcode::Not
        )
    }

    /// Parse one line of stack-machine text
    pub fn parse_line(line: &str) -> Result<Self, VmParseError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, operands)) = words.split_first() else {
            return Err(VmParseError::UnknownCommand(String::new()));
        };

        let expect = |expected: usize| {
            if operands.len() == expected {
                Ok(())
            } else {
                Err(VmParseError::OperandCount {
                    command: command.to_string(),
                    expected,
                    got: operands.len(),
                })
            }
        };

        let opcode = match command {
            "push" | "pop" => {
                expect(2)?;
                let segment: Segment = operands[0].parse()?;
                let index = parse_number(operands[1])?;
                if command == "push" {
                    Opcode::Push(segment, index)
                } else if segment == Segment::Constant {
                    return Err(VmParseError::PopConstant);
                } else {
                    Opcode::Pop(segment, index)
                }
            }
            "add" | "sub" | "neg" | "eq" | "gt" | "lt" | "and" | "or" | "not" | "return" => {
                expect(0)?;
                match command {
                    "add" => Opcode::Add,
                    "sub" => Opcode::Sub,
                    "neg" => Opcode::Neg,
                    "eq" => Opcode::Eq,
                    "gt" => Opcode::Gt,
                    "lt" => Opcode::Lt,
                    "and" => Opcode::And,
                    "or" => Opcode::Or,
                    "not" => Opcode::Not,
                    _ => Opcode::Return,
                }
            }
            "label" => {
                expect(1)?;
                Opcode::Label(operands[0].to_string())
            }
            "goto" => {
                expect(1)?;
                Opcode::Goto(operands[0].to_string())
            }
            "if-goto" => {
                expect(1)?;
                Opcode::IfGoto(operands[0].to_string())
            }
            "function" => {
                expect(2)?;
                Opcode::Function(operands[0].to_string(), parse_number(operands[1])?)
            }
            "call" => {
                expect(2)?;
                Opcode::Call(operands[0].to_string(), parse_number(operands[1])?)
            }
            other => return Err(VmParseError::UnknownCommand(other.to_string())),
        };

        Ok(opcode)
    }
}

fn parse_number(text: &str) -> Result<u16, VmParseError> {
    text.parse()
        .map_err(|_| VmParseError::InvalidNumber(text.to_string()))
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Push(segment, index) => write!(f, "push {} {}", segment, index),
            Opcode::Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            Opcode::Add => f.write_str("add"),
            Opcode::Sub => f.write_str("sub"),
            Opcode::Neg => f.write_str("neg"),
            Opcode::Eq => f.write_str("eq"),
            Opcode::Gt => f.write_str("gt"),
            Opcode::Lt => f.write_str("lt"),
            Opcode::And => f.write_str("and"),
            Opcode::Or => f.write_str("or"),
            Opcode::Not => f.write_str("not"),
            Opcode::Label(name) => write!(f, "label {}", name),
            Opcode::Goto(name) => write!(f, "goto {}", name),
            Opcode::IfGoto(name) => write!(f, "if-goto {}", name),
            Opcode::Function(name, locals) => write!(f, "function {} {}", name, locals),
            Opcode::Call(name, args) => write!(f, "call {} {}", name, args),
            Opcode::Return => f.write_str("return"),
        }
    }
}

impl FromStr for Opcode {
    type Err = VmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::parse_line(s)
    }
}
