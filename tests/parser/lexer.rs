//! Integration tests for the natural-language lexer

use trogdor_language::{TokenStream, Vocabulary};
use trogdor_parser::{Lexicon, NaturalLexer, TokenKind};

fn lexicon() -> Lexicon {
    Lexicon::standard(&Vocabulary::english())
}

#[test]
fn compound_bound_limits_lookahead() {
    let lexicon = lexicon();
    let joined = NaturalLexer::tokenize_all("The lamp is fixed in place.", &lexicon, 4).unwrap();
    assert!(joined.iter().any(|t| t.is_word("fixed in place")));

    let split = NaturalLexer::tokenize_all("The lamp is fixed in place.", &lexicon, 2).unwrap();
    assert!(!split.iter().any(|t| t.is_word("fixed in place")));
    assert!(split.iter().any(|t| t.is_word("fixed")));
}

#[test]
fn push_then_next_replays() {
    let lexicon = lexicon();
    let mut lexer = NaturalLexer::new("The Kitchen is a room.", 4);
    let mut stream = lexer.bind(&lexicon);
    let article = stream.next().unwrap();
    let noun = stream.next().unwrap();
    assert_eq!(article.kind, TokenKind::Article);
    stream.push(noun.clone());
    stream.push(article.clone());
    assert_eq!(stream.next().unwrap(), article);
    assert_eq!(stream.next().unwrap(), noun);
    assert_eq!(stream.next().unwrap().kind, TokenKind::Equality);
}

#[test]
fn source_ends_with_eof() {
    let tokens = NaturalLexer::tokenize_all("", &lexicon(), 4).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

#[test]
fn illegal_character_reports_line() {
    let err = NaturalLexer::tokenize_all("The Kitchen is a room.\n\n#", &lexicon(), 4).unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.line(), Some(3));
}
