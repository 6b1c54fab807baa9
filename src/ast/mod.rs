//! Abstract Syntax Tree (AST) Types for the shell language.
//!
//! This module defines the complete AST structure for shell scripts.
//! The design follows POSIX shell grammar while being Rust-idiomatic.
//!
//! Architecture:
//!   Input → Lexer → Parser → AST → Expander → Interpreter → Output

pub mod types;

pub use types::*;
