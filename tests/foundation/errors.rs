//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use trogdor_foundation::{EntityType, Error, ErrorContext, ErrorKind, UnresolvedName};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn lex_errors_count_as_parse_errors() {
    let err = Error::lex("unterminated string", 3);
    assert!(err.is_parse());
    assert!(!err.is_validation());
    assert_eq!(err.line(), Some(3));
    assert_eq!(err.to_string(), "lex error on line 3: unterminated string");
}

#[test]
fn validation_error_display() {
    let err = Error::validation("\"weight\" is not a valid property for a room", 12);
    assert!(err.is_validation());
    assert_eq!(err.line(), Some(12));
    assert!(err.to_string().starts_with("validation error on line 12"));
}

#[test]
fn unresolved_references_list_every_line() {
    let err = Error::new(ErrorKind::UnresolvedReferences(vec![
        UnresolvedName {
            name: "cave".to_string(),
            entity_type: EntityType::Room,
            lines: vec![4, 9],
        },
        UnresolvedName {
            name: "sword".to_string(),
            entity_type: EntityType::Object,
            lines: vec![7],
        },
    ]));
    assert!(err.is_parse());
    let msg = err.to_string();
    assert!(msg.contains("room \"cave\" on line(s) 4, 9"), "{msg}");
    assert!(msg.contains("object \"sword\" on line(s) 7"), "{msg}");
}

#[test]
fn internal_errors() {
    let err = Error::internal("no operation registered for SET_TAG");
    assert!(err.is_internal());
    assert_eq!(err.line(), None);
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn filename_prefixes_display() {
    let err = Error::parse("expected \"is\"", 2).with_filename("story.ni");
    assert_eq!(err.to_string(), "story.ni: parse error on line 2: expected \"is\"");
}

#[test]
fn line_from_context_when_kind_has_none() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err = Error::io("game.lua", &io).with_line(8);
    assert_eq!(err.line(), Some(8));
    let err = err.with_filename("game.xml");
    assert!(err.to_string().starts_with("game.xml:8: "));
}

#[test]
fn explicit_context() {
    let err = Error::new(ErrorKind::NoStartRoom)
        .with_context(ErrorContext::new().with_filename("a.xml"));
    assert!(err.is_validation());
    assert!(err.to_string().starts_with("a.xml: "));
}
