//! Trogdor - Game definition compiler
//!
//! This crate re-exports all layers of the Trogdor compiler for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: trogdor_runtime     — Runtime backend, compile entry points
//! Layer 2: trogdor_parser      — Natural-language front-end
//! Layer 1: trogdor_language    — Markup front-end, AST, symbols, validation, instantiation
//! Layer 0: trogdor_foundation  — Core types (Value, EntityType, Error)
//! ```

pub use trogdor_foundation as foundation;
pub use trogdor_language as language;
pub use trogdor_parser as parser;
pub use trogdor_runtime as runtime;

pub use trogdor_runtime::{Game, compile_file, compile_markup, compile_natural};
