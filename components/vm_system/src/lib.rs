//! Stack-machine instruction set for the Jack toolchain
//!
//! This crate defines the intermediate instructions the compiler emits and
//! the line-oriented text format that the downstream assembler and
//! translator consume.
//!
//! # Features
//!
//! - Eight addressable memory segments
//! - Push/pop, arithmetic/logical, branching and function commands
//! - Text encoding (one instruction per line) and decoding
//!
//! # Example
//!
//! ```
//! use vm_system::{Opcode, Segment, VmChunk};
//!
//! let mut chunk = VmChunk::new("Main");
//!
//! chunk.emit(Opcode::Function("Main.main".to_string(), 0));
//! chunk.emit(Opcode::Push(Segment::Constant, 7));
//! chunk.emit(Opcode::Return);
//!
//! let text = chunk.to_text();
//! assert_eq!(text, "function Main.main 0\npush constant 7\nreturn\n");
//!
//! let restored = VmChunk::from_text("Main", &text).unwrap();
//! assert_eq!(restored, chunk);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod opcode;

// Re-export main types at crate root
pub use chunk::VmChunk;
pub use opcode::{Opcode, Segment, VmParseError};
