//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Source -> Lexer -> Parser -> annotated tree ->
//! CodeGenerator -> VM text -> VmChunk decoder.

use core_types::ErrorKind;
use jack_compiler::{compile, compile_unit, tree_to_xml, IdentifierCategory, Parser};
use vm_system::{Opcode, Segment, VmChunk};

/// Helper function to compile Jack source into VM lines
fn compile_lines(source: &str) -> Vec<String> {
    compile(source).expect("Compilation failed").lines()
}

const SEVEN: &str = r#"
// Computes the value of 1 + (2 * 3) and prints the result
class Main {
   function void main() {
      do Output.printInt(1 + (2 * 3));
      return;
   }
}
"#;

const AVERAGE: &str = r#"
/** Computes the average of a sequence of integers. */
class Main {
   function void main() {
     var Array a;
     var int length;
     var int i, sum;

     let length = Keyboard.readInt("How many numbers? ");
     let a = Array.new(length);
     let i = 0;
     while (i < length) {
        let a[i] = Keyboard.readInt("Enter a number: ");
        let sum = sum + a[i];
        let i = i + 1;
     }
     do Output.printString("The average is ");
     do Output.printInt(sum / length);
     return;
   }
}
"#;

const SQUARE: &str = r#"
/** Implements a graphical square. */
class Square {

   field int x, y; // screen location of the square's top-left corner
   field int size; // length of this square, in pixels

   /** Constructs a new square with a given location and size. */
   constructor Square new(int Ax, int Ay, int Asize) {
      let x = Ax;
      let y = Ay;
      let size = Asize;
      do draw();
      return this;
   }

   /** Disposes this square. */
   method void dispose() {
      do Memory.deAlloc(this);
      return;
   }

   /** Draws the square on the screen. */
   method void draw() {
      do Screen.setColor(true);
      do Screen.drawRectangle(x, y, x + size, y + size);
      return;
   }

   /** Increments the square size by 2 pixels. */
   method void incSize() {
      if (((y + size) < 254) & ((x + size) < 510)) {
         do erase();
         let size = size + 2;
         do draw();
      }
      return;
   }

   method void erase() {
      do Screen.setColor(false);
      do Screen.drawRectangle(x, y, x + size, y + size);
      return;
   }
}
"#;

/// Test: the Seven program compiles to the canonical instruction list
#[test]
fn test_full_pipeline_seven() {
    assert_eq!(
        compile_lines(SEVEN),
        vec![
            "function Main.main 0",
            "push constant 1",
            "push constant 2",
            "push constant 3",
            "call Math.multiply 2",
            "add",
            "call Output.printInt 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

/// Test: arrays, loops and string arguments work together
#[test]
fn test_full_pipeline_average() {
    let lines = compile_lines(AVERAGE);
    assert_eq!(lines[0], "function Main.main 4");
    assert!(lines.contains(&"call Array.new 1".to_string()));
    assert!(lines.contains(&"call Keyboard.readInt 1".to_string()));
    assert!(lines.contains(&"call Math.divide 2".to_string()));
    assert!(lines.contains(&"label STARTWHILE0".to_string()));
    assert!(lines.contains(&"label ENDWHILE0".to_string()));

    let array_store = ["pop temp 0", "pop pointer 1", "push temp 0", "pop that 0"];
    assert!(lines
        .windows(4)
        .any(|w| w.iter().map(String::as_str).eq(array_store.iter().copied())));
}

/// Test: the Square class exercises constructors, methods and field access
#[test]
fn test_full_pipeline_square() {
    let chunk = compile(SQUARE).expect("Compilation failed");
    assert_eq!(chunk.name, "Square");
    assert_eq!(chunk.function_count(), 5);

    let lines = chunk.lines();
    assert_eq!(
        &lines[..4],
        &[
            "function Square.new 0",
            "push constant 3",
            "call Memory.alloc 1",
            "pop pointer 0",
        ]
    );

    let dispose = lines
        .iter()
        .position(|l| l == "function Square.dispose 0")
        .unwrap();
    assert_eq!(
        &lines[dispose + 1..dispose + 7],
        &[
            "push argument 0",
            "pop pointer 0",
            "push pointer 0",
            "call Memory.deAlloc 1",
            "pop temp 0",
            "push constant 0",
        ]
    );

    assert!(lines.contains(&"call Screen.drawRectangle 4".to_string()));
    assert!(lines.contains(&"push this 2".to_string()));
    assert!(lines.contains(&"call Square.erase 1".to_string()));
    assert!(lines.contains(&"if-goto ELSE0".to_string()));
}

/// Test: generated text is accepted by the VM decoder unchanged
#[test]
fn test_full_pipeline_text_round_trip() {
    let chunk = compile(SQUARE).unwrap();
    let text = chunk.to_text();
    let decoded = VmChunk::from_text("Square", &text).unwrap();
    assert_eq!(decoded, chunk);
    assert_eq!(decoded.to_text(), text);
}

/// Test: the typed instruction stream is what the text says
#[test]
fn test_full_pipeline_typed_instructions() {
    let chunk = compile(SEVEN).unwrap();
    assert_eq!(
        chunk.instructions[0],
        Opcode::Function("Main.main".to_string(), 0)
    );
    assert_eq!(chunk.instructions[1], Opcode::Push(Segment::Constant, 1));
    assert_eq!(chunk.instructions.last(), Some(&Opcode::Return));
}

/// Test: scope tables seen by the parser match what code generation uses
#[test]
fn test_full_pipeline_scopes_and_tree_agree() {
    let mut parser = Parser::new(SQUARE);
    let tree = parser.parse().unwrap();
    let class_table = parser.scopes().class_table();
    assert_eq!(class_table.index_of("size"), Some(2));

    let incsize = parser.scopes().subroutine_table("incSize").unwrap();
    assert_eq!(incsize.type_of("this"), Some("Square"));

    let size_usages = tree
        .walk()
        .into_iter()
        .filter_map(|n| n.as_identifier())
        .filter(|i| i.name == "size" && !i.is_declaration)
        .count();
    assert!(size_usages > 0);

    let xml = tree_to_xml(&tree, true);
    assert!(xml.contains("category=\"field\" index=\"2\" type=\"int\" declaration=\"false\"> size </identifier>"));
}

/// Test: call names are classified without a symbol registry
#[test]
fn test_full_pipeline_unknown_class_is_accepted() {
    let unit = compile_unit(
        "class Main { function void main() { do Nowhere.nothing(); return; } }",
    )
    .unwrap();
    let qualifier = unit
        .tree
        .walk()
        .into_iter()
        .filter_map(|n| n.as_identifier())
        .find(|i| i.name == "Nowhere")
        .unwrap();
    assert_eq!(qualifier.category, IdentifierCategory::ClassName);
    assert!(unit
        .chunk
        .lines()
        .contains(&"call Nowhere.nothing 0".to_string()));
}

/// Test: each error category surfaces with its kind
#[test]
fn test_full_pipeline_error_kinds() {
    let lexical = compile("class A { function void f() { return; } } /* open").unwrap_err();
    assert_eq!(lexical.kind, ErrorKind::LexicalError);

    let syntax = compile("class A { function void f() { while x { } return; } }").unwrap_err();
    assert_eq!(syntax.kind, ErrorKind::SyntaxError);

    let generation = compile("class A { function void f() { let f = 1; return; } }").unwrap_err();
    assert_eq!(generation.kind, ErrorKind::GenerationError);
}
