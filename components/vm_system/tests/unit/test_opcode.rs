//! Tests for Opcode and Segment rendering and decoding

use vm_system::{Opcode, Segment, VmParseError};

#[test]
fn test_push_renders_segment_and_index() {
    assert_eq!(Opcode::Push(Segment::Argument, 2).to_string(), "push argument 2");
    assert_eq!(Opcode::Push(Segment::Constant, 32767).to_string(), "push constant 32767");
}

#[test]
fn test_pop_renders_segment_and_index() {
    assert_eq!(Opcode::Pop(Segment::Pointer, 1).to_string(), "pop pointer 1");
    assert_eq!(Opcode::Pop(Segment::Temp, 0).to_string(), "pop temp 0");
}

#[test]
fn test_arithmetic_mnemonics() {
    let expected = [
        (Opcode::Add, "add"),
        (Opcode::Sub, "sub"),
        (Opcode::Neg, "neg"),
        (Opcode::Eq, "eq"),
        (Opcode::Gt, "gt"),
        (Opcode::Lt, "lt"),
        (Opcode::And, "and"),
        (Opcode::Or, "or"),
        (Opcode::Not, "not"),
    ];
    for (opcode, text) in expected {
        assert_eq!(opcode.to_string(), text);
        assert_eq!(text.parse::<Opcode>().unwrap(), opcode);
    }
}

#[test]
fn test_branching_commands() {
    assert_eq!(Opcode::Label("ELSE3".to_string()).to_string(), "label ELSE3");
    assert_eq!(Opcode::Goto("ENDIF3".to_string()).to_string(), "goto ENDIF3");
    assert_eq!(Opcode::IfGoto("ELSE3".to_string()).to_string(), "if-goto ELSE3");
}

#[test]
fn test_function_commands() {
    assert_eq!(
        Opcode::Function("Square.new".to_string(), 0).to_string(),
        "function Square.new 0"
    );
    assert_eq!(
        Opcode::Call("Memory.alloc".to_string(), 1).to_string(),
        "call Memory.alloc 1"
    );
    assert_eq!(Opcode::Return.to_string(), "return");
}

#[test]
fn test_decode_function_header() {
    assert_eq!(
        "function Main.main 3".parse::<Opcode>().unwrap(),
        Opcode::Function("Main.main".to_string(), 3)
    );
}

#[test]
fn test_decode_unknown_segment() {
    assert_eq!(
        "push heap 0".parse::<Opcode>(),
        Err(VmParseError::UnknownSegment("heap".to_string()))
    );
}

#[test]
fn test_decode_invalid_number() {
    assert_eq!(
        "push local x".parse::<Opcode>(),
        Err(VmParseError::InvalidNumber("x".to_string()))
    );
    assert!("push constant 70000".parse::<Opcode>().is_err());
}

#[test]
fn test_decode_empty_line() {
    assert!("".parse::<Opcode>().is_err());
}
