//! Integration tests for the markup lexer and the pushback contract

use trogdor_language::markup::{MarkupLexer, MarkupToken};
use trogdor_language::{Pushback, TokenStream};

#[test]
fn next_after_push_returns_pushed_token() {
    let mut lexer = MarkupLexer::new("<game><rooms/></game>");
    let game = lexer.next().unwrap();
    let rooms = lexer.next().unwrap();
    lexer.push(rooms.clone());
    assert_eq!(lexer.next().unwrap(), rooms);
    assert!(matches!(lexer.next().unwrap(), MarkupToken::Close { ref name, .. } if name == "rooms"));
    assert!(matches!(game, MarkupToken::Open { depth: 0, .. }));
}

#[test]
fn pushed_tokens_replay_last_first() {
    let mut lexer = MarkupLexer::new("<a><b></b></a>");
    let a = lexer.next().unwrap();
    let b = lexer.next().unwrap();
    lexer.push(b.clone());
    lexer.push(a.clone());
    assert_eq!(lexer.next().unwrap(), a);
    assert_eq!(lexer.next().unwrap(), b);
}

#[test]
fn peek_does_not_consume() {
    let mut lexer = MarkupLexer::new("<game>text</game>");
    assert_eq!(lexer.peek(), None);
    let open = lexer.next().unwrap();
    assert_eq!(lexer.peek(), Some(&open));
    assert_eq!(lexer.peek(), Some(&open));
    assert!(matches!(lexer.next().unwrap(), MarkupToken::Text { ref value, .. } if value == "text"));
}

#[test]
fn end_of_input_repeats() {
    let mut lexer = MarkupLexer::new("<game/>");
    lexer.next().unwrap();
    lexer.next().unwrap();
    assert!(matches!(lexer.next().unwrap(), MarkupToken::Eof { .. }));
    assert!(matches!(lexer.next().unwrap(), MarkupToken::Eof { .. }));
}

#[test]
fn lines_are_tracked() {
    let tokens = MarkupLexer::tokenize_all("<game>\n\n<rooms>\n</rooms>\n</game>").unwrap();
    let lines: Vec<_> = tokens.iter().map(MarkupToken::line).collect();
    assert_eq!(&lines[..4], &[1, 3, 4, 5]);
}

#[test]
fn mismatched_close_is_lex_error() {
    let err = MarkupLexer::tokenize_all("<game>\n<rooms>\n</game>").unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.line(), Some(3));
}

#[test]
fn pushback_stack() {
    let mut stack = Pushback::new();
    stack.produced(&1);
    assert_eq!(stack.last(), Some(&1));
    stack.push(2);
    stack.push(3);
    assert_eq!(stack.pop(), Some(3));
    assert_eq!(stack.last(), Some(&3));
    assert_eq!(stack.pop(), Some(2));
    assert_eq!(stack.pop(), None);
}
