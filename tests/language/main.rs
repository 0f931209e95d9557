//! Integration tests for Layer 1: Language
//!
//! Tests for the markup front-end, the symbol table, validation and the
//! instantiator.

mod instantiator;
mod lexer;
mod markup;
mod symbols;
