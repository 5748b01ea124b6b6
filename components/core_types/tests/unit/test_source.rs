//! Unit tests for SourcePosition

use core_types::SourcePosition;

#[cfg(test)]
mod source_position_tests {
    use super::*;

    #[test]
    fn test_source_position_fields() {
        let pos = SourcePosition {
            line: 7,
            column: 12,
            offset: 98,
        };

        assert_eq!(pos.line, 7);
        assert_eq!(pos.column, 12);
        assert_eq!(pos.offset, 98);
    }

    #[test]
    fn test_source_position_start() {
        let pos = SourcePosition::start();
        assert_eq!((pos.line, pos.column, pos.offset), (1, 1, 0));
    }

    #[test]
    fn test_source_position_display() {
        assert_eq!(SourcePosition::new(3, 4, 20).to_string(), "3:4");
    }

    #[test]
    fn test_source_position_equality() {
        let a = SourcePosition::new(1, 2, 3);
        let b = SourcePosition::new(1, 2, 3);
        let c = SourcePosition::new(1, 2, 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_source_position_is_copy() {
        let a = SourcePosition::new(5, 5, 5);
        let b = a;
        assert_eq!(a, b);
    }
}
