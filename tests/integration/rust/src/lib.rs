//! Integration test suite for the Jack compiler
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use core_types;
    pub use jack_cli;
    pub use jack_compiler;
    pub use vm_system;
}
