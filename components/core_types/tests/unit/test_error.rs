//! Unit tests for CompileError and ErrorKind

use core_types::{CompileError, ErrorKind, SourcePosition};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        assert_ne!(ErrorKind::IoError, ErrorKind::LexicalError);
        assert_ne!(ErrorKind::LexicalError, ErrorKind::SyntaxError);
        assert_ne!(ErrorKind::SyntaxError, ErrorKind::GenerationError);
    }
}

#[cfg(test)]
mod compile_error_tests {
    use super::*;

    #[test]
    fn test_new_keeps_kind_and_message() {
        let error = CompileError::new(ErrorKind::IoError, "permission denied", None);
        assert_eq!(error.kind, ErrorKind::IoError);
        assert_eq!(error.message, "permission denied");
        assert!(error.source_position.is_none());
    }

    #[test]
    fn test_lexical_constructor_keeps_position() {
        let pos = SourcePosition::new(4, 1, 50);
        let error = CompileError::lexical("Unterminated block comment", Some(pos));
        assert_eq!(error.kind, ErrorKind::LexicalError);
        assert_eq!(error.source_position, Some(pos));
    }

    #[test]
    fn test_syntax_constructor() {
        let error = CompileError::syntax("Expected identifier", None);
        assert!(matches!(error.kind, ErrorKind::SyntaxError));
    }

    #[test]
    fn test_generation_constructor() {
        let error = CompileError::generation("Unknown term", None);
        assert!(matches!(error.kind, ErrorKind::GenerationError));
    }

    #[test]
    fn test_display_without_position() {
        let error = CompileError::syntax("Unexpected end of input", None);
        assert_eq!(error.to_string(), "syntax error: Unexpected end of input");
    }

    #[test]
    fn test_display_with_position() {
        let error = CompileError::lexical(
            "Unexpected character '#'",
            Some(SourcePosition::new(12, 3, 200)),
        );
        assert_eq!(
            error.to_string(),
            "lexical error at 12:3: Unexpected character '#'"
        );
    }

    #[test]
    fn test_compile_error_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&CompileError::syntax("x", None));
    }
}
