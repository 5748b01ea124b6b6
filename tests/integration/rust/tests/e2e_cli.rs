//! End-to-End CLI Integration Tests
//!
//! Drives whole project directories through the jack_cli driver, from
//! command-line arguments to files on disk.

use jack_cli::{Cli, CliError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vm_system::VmChunk;

/// The configuration `jackc <path> [flags]` parses to
fn parse_args(path: &Path, flags: &[&str]) -> Cli {
    let mut cli = Cli::with_path(path);
    for flag in flags {
        match *flag {
            "--emit-tokens" => cli.emit_tokens = true,
            "--emit-tree" => cli.emit_tree = true,
            "--emit-json" => cli.emit_json = true,
            "--stdout" => cli.stdout = true,
            other => panic!("unsupported flag {}", other),
        }
    }
    cli
}

const MAIN: &str = r#"
class Main {
    function void main() {
        var SquareGame game;
        let game = SquareGame.new();
        do game.run();
        do game.dispose();
        return;
    }
}
"#;

const SQUARE_GAME: &str = r#"
class SquareGame {
   field Square square;
   field int direction;

   constructor SquareGame new() {
      let square = Square.new(0, 0, 30);
      let direction = 0;
      return this;
   }

   method void dispose() {
      do square.dispose();
      do Memory.deAlloc(this);
      return;
   }

   method void moveSquare() {
      if (direction = 1) { do square.moveUp(); }
      if (direction = 2) { do square.moveDown(); }
      do Sys.wait(5);
      return;
   }

   method void run() {
      var char key;
      var boolean exit;
      let exit = false;
      while (~exit) {
         while (key = 0) {
            let key = Keyboard.keyPressed();
            do moveSquare();
         }
         if (key = 81)  { let exit = true; }
         if (key = 131) { let direction = 1; }
         while (~(key = 0)) {
            let key = Keyboard.keyPressed();
            do moveSquare();
         }
     }
     return;
   }
}
"#;

/// Test: a project directory compiles to one .vm file per class
#[test]
fn test_e2e_project_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Main.jack"), MAIN).unwrap();
    fs::write(dir.path().join("SquareGame.jack"), SQUARE_GAME).unwrap();

    let cli = parse_args(dir.path(), &[]);
    let report = cli.driver().run(&cli.path).unwrap();
    assert!(report.is_success());
    assert_eq!(report.exit_code(), 0);

    let main = fs::read_to_string(dir.path().join("Main.vm")).unwrap();
    let main_lines: Vec<&str> = main.lines().collect();
    assert_eq!(
        &main_lines[..7],
        &[
            "function Main.main 1",
            "call SquareGame.new 0",
            "pop local 0",
            "push local 0",
            "call SquareGame.run 1",
            "pop temp 0",
            "push local 0",
        ]
    );

    let game_text = fs::read_to_string(dir.path().join("SquareGame.vm")).unwrap();
    let game = VmChunk::from_text("SquareGame", &game_text).unwrap();
    assert_eq!(game.function_count(), 4);
    let lines = game.lines();
    assert!(lines.contains(&"function SquareGame.run 2".to_string()));
    assert!(lines.contains(&"call Square.moveUp 1".to_string()));
    assert!(lines.contains(&"call SquareGame.moveSquare 1".to_string()));
    assert!(lines.contains(&"call Keyboard.keyPressed 0".to_string()));
    assert!(lines.contains(&"label STARTWHILE6".to_string()));
}

/// Test: analyzer dumps are written next to the VM code
#[test]
fn test_e2e_emit_all_artifacts() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Main.jack");
    fs::write(&file, MAIN).unwrap();

    let cli = parse_args(&file, &["--emit-tokens", "--emit-tree", "--emit-json"]);
    let report = cli.driver().run(&cli.path).unwrap();
    assert_eq!(report.compiled[0].outputs.len(), 4);

    let tree = fs::read_to_string(dir.path().join("Main.xml")).unwrap();
    assert!(tree.contains("<identifier category=\"var\" index=\"0\" type=\"SquareGame\" declaration=\"true\"> game </identifier>"));
    assert!(tree.contains("<identifier category=\"class\" declaration=\"false\"> SquareGame </identifier>"));

    let tokens = fs::read_to_string(dir.path().join("MainT.xml")).unwrap();
    assert!(tokens.trim_end().ends_with("</tokens>"));
}

/// Test: --stdout leaves the directory untouched apart from the sources
#[test]
fn test_e2e_stdout_mode() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Main.jack"), MAIN).unwrap();

    let cli = parse_args(dir.path(), &["--stdout"]);
    let report = cli.driver().run(&cli.path).unwrap();
    assert!(report.is_success());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

/// Test: one broken class fails the batch but not its siblings
#[test]
fn test_e2e_partial_failure() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Main.jack"), MAIN).unwrap();
    fs::write(
        dir.path().join("Broken.jack"),
        "class Broken { method void f() { var int a; var int a; return; } }",
    )
    .unwrap();

    let cli = parse_args(dir.path(), &[]);
    let report = cli.driver().run(&cli.path).unwrap();
    assert_eq!(report.exit_code(), 1);
    assert!(matches!(report.failures[0], CliError::Compile { .. }));
    assert!(dir.path().join("Main.vm").exists());
}
