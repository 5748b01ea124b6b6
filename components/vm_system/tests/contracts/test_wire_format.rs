//! Contract: one instruction per line, whitespace-separated tokens, and only
//! the commands and segments the downstream assembler and translator accept.

use vm_system::{Opcode, Segment, VmChunk};

const SEGMENTS: [&str; 8] = [
    "constant", "local", "argument", "this", "that", "static", "temp", "pointer",
];

#[test]
fn contract_every_segment_is_accepted() {
    for name in SEGMENTS {
        let line = format!("push {} 0", name);
        let opcode: Opcode = line.parse().unwrap();
        assert_eq!(opcode.to_string(), line);
    }
}

#[test]
fn contract_pop_accepts_every_writable_segment() {
    for name in SEGMENTS.iter().filter(|s| **s != "constant") {
        let line = format!("pop {} 4", name);
        assert_eq!(line.parse::<Opcode>().unwrap().to_string(), line);
    }
}

#[test]
fn contract_rendered_lines_have_no_surrounding_whitespace() {
    let opcodes = [
        Opcode::Push(Segment::Static, 5),
        Opcode::Call("String.appendChar".to_string(), 2),
        Opcode::IfGoto("ENDWHILE0".to_string()),
        Opcode::Not,
    ];
    for opcode in opcodes {
        let line = opcode.to_string();
        assert_eq!(line.trim(), line);
        assert!(!line.contains('\n'));
        assert!(!line.contains("  "));
    }
}

#[test]
fn contract_chunk_text_has_one_instruction_per_line() {
    let mut chunk = VmChunk::new("Main");
    chunk.emit(Opcode::Function("Main.main".to_string(), 0));
    chunk.emit(Opcode::Push(Segment::Constant, 1));
    chunk.emit(Opcode::Neg);
    chunk.emit(Opcode::Return);

    let text = chunk.to_text();
    assert_eq!(text.lines().count(), chunk.instruction_count());
}
