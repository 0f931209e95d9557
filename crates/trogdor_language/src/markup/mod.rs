//! The markup front-end: a tokenizer for the XML subset game files use, a
//! pull-style tag reader, and the recursive-descent section parser.

pub mod lexer;
pub mod parser;
pub mod reader;

pub use lexer::{MarkupLexer, MarkupToken};
pub use parser::MarkupParser;
pub use reader::MarkupReader;
