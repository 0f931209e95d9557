//! The Trogdor game definition language.
//!
//! This crate provides:
//! - [`Ast`] - An arena of operations, the common output of both front-ends
//! - [`MarkupParser`] - The markup front-end
//! - [`SymbolTable`] - Declarations, forward references and their patching
//! - [`validator`] - Per-operation checks run just before execution
//! - [`Instantiator`] - Executes an AST against a [`Backend`]
//!
//! The natural-language front-end lives in `trogdor_parser` and produces
//! the same [`Parsed`] output.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod builder;
pub mod config;
pub mod instantiator;
pub mod lexer;
pub mod markup;
pub mod opcode;
pub mod symbols;
pub mod validator;
pub mod vocabulary;


pub use ast::{Ast, Node, NodeId, NodeKind, OperationRef};
pub use builder::{ScriptMode, Subject};
pub use config::{CompilerConfig, DEFAULT_MAX_COMPOUND_WORDS};
pub use instantiator::{Backend, Executor, Instantiator, OperationTable, START_ROOM};
pub use lexer::{Pushback, TokenStream};
pub use markup::MarkupParser;
pub use opcode::{Opcode, Target};
pub use symbols::{EntityClassDeclaration, EntityDeclaration, SymbolTable};
pub use validator::{PropertyRule, ValidationContext, Validator};
pub use vocabulary::{Direction, Vocabulary};

use trogdor_foundation::Result;

/// The output of a front-end: the operation AST and the symbols declared
/// while parsing.
#[derive(Clone, Debug)]
pub struct Parsed {
    /// Operations in execution order.
    pub ast: Ast,
    /// Every entity, class, direction and synonym the source declared.
    pub symbols: SymbolTable,
}

/// Parses a markup game definition.
///
/// # Errors
///
/// Returns the first lex or parse error, or an aggregated error naming
/// every entity that was referenced but never declared.
pub fn parse_markup(source: &str, vocabulary: &Vocabulary) -> Result<Parsed> {
    MarkupParser::new(source, vocabulary).parse()
}
