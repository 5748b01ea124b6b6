//! Tests for VmChunk

use vm_system::{Opcode, Segment, VmChunk};

#[test]
fn test_chunk_creation() {
    let chunk = VmChunk::new("Main");
    assert_eq!(chunk.name, "Main");
    assert_eq!(chunk.instruction_count(), 0);
    assert!(chunk.is_empty());
}

#[test]
fn test_chunk_emit_instruction() {
    let mut chunk = VmChunk::new("Main");
    chunk.emit(Opcode::Return);
    assert_eq!(chunk.instruction_count(), 1);
    assert!(matches!(chunk.instructions[0], Opcode::Return));
}

#[test]
fn test_chunk_lines() {
    let mut chunk = VmChunk::new("Main");
    chunk.emit(Opcode::Push(Segment::Constant, 0));
    chunk.emit(Opcode::Return);
    assert_eq!(chunk.lines(), vec!["push constant 0", "return"]);
}

#[test]
fn test_chunk_to_text_is_newline_terminated() {
    let mut chunk = VmChunk::new("Main");
    chunk.emit(Opcode::Push(Segment::Constant, 0));
    chunk.emit(Opcode::Return);
    assert_eq!(chunk.to_text(), "push constant 0\nreturn\n");
    assert_eq!(chunk.to_string(), chunk.to_text());
}

#[test]
fn test_empty_chunk_renders_empty_text() {
    assert_eq!(VmChunk::new("Empty").to_text(), "");
}

#[test]
fn test_from_text_skips_comments_and_blank_lines() {
    let text = "// generated\n\nfunction Main.main 0   // entry\n  push constant 0\nreturn\n";
    let chunk = VmChunk::from_text("Main", text).unwrap();
    assert_eq!(
        chunk.instructions,
        vec![
            Opcode::Function("Main.main".to_string(), 0),
            Opcode::Push(Segment::Constant, 0),
            Opcode::Return,
        ]
    );
}

#[test]
fn test_from_text_then_to_text_is_canonical() {
    let text = "push   local 1\r\nadd\n";
    let chunk = VmChunk::from_text("X", text).unwrap();
    assert_eq!(chunk.to_text(), "push local 1\nadd\n");
}
