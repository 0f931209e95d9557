//! Natural-language front-end for Trogdor game definitions.
//!
//! Sentences such as `The Kitchen is a room.` or `A jar is a kind of
//! container.` are lexed into compound terms, checked for contradictions,
//! and lowered into the same [`Parsed`] output the markup front-end
//! produces.
//!
//! - [`KindTree`] - The kind hierarchy, extended as sources declare kinds
//! - [`Lexicon`] - Kinds, properties, adjectives and directions
//! - [`NaturalLexer`] - Tokenizer with compound-term recognition
//! - [`NaturalParser`] - Sentence parser and lowering to operations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod kind;
pub mod lexer;
pub mod lexicon;
pub mod parser;


pub use kind::{Kind, KindId, KindTree, pluralize};
pub use lexer::{BoundLexer, NaturalLexer, Token, TokenKind};
pub use lexicon::{Lexicon, Property};
pub use parser::{EntityRecord, NaturalParser};

use trogdor_foundation::Result;
use trogdor_language::{CompilerConfig, Parsed, Vocabulary};

/// Parses a natural-language game definition.
///
/// # Errors
///
/// Returns the first lex or parse error. Contradictory sentences are
/// reported on the later line, naming the earlier one.
pub fn parse_natural(source: &str, vocabulary: &Vocabulary, config: &CompilerConfig) -> Result<Parsed> {
    NaturalParser::new(source, vocabulary, config).parse()
}
