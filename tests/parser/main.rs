//! Integration tests for Layer 2: Natural-language front-end
//!
//! Tests for the compound-term lexer, kind declarations, contradiction
//! checks and lowering to operations.

mod lexer;
mod sentences;
