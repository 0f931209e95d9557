//! Integration tests for natural-language sentences

use trogdor_foundation::{EntityType, ErrorKind};
use trogdor_language::{CompilerConfig, Opcode, Parsed, Vocabulary};
use trogdor_parser::parse_natural;

fn parse(source: &str) -> trogdor_foundation::Result<Parsed> {
    parse_natural(source, &Vocabulary::english(), &CompilerConfig::default())
}

#[test]
fn contradiction_is_reported_on_the_later_line() {
    let err = parse("A box is a container.\nA box is open.\nA box is closed.\n").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Parse { line: 3, .. }));
    assert!(err.to_string().contains("open on line 2"), "{err}");
}

#[test]
fn kind_and_property_must_fit() {
    let err = parse("The Kitchen is a room.\nThe Kitchen is open.").unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.line(), Some(2));
}

#[test]
fn kind_names_respect_compound_bound() {
    let source = "A heavy iron box is a kind of container.";
    assert!(parse(source).is_ok());
    let strict = CompilerConfig::default().with_max_compound_words(2);
    let err = parse_natural(source, &Vocabulary::english(), &strict).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Lex { line: 1, .. }));
}

#[test]
fn map_connections_run_both_ways() {
    let parsed = parse("The Kitchen is a room.\nThe Cellar is east of the Kitchen.").unwrap();
    let connections: Vec<Vec<String>> = parsed
        .ast
        .operations()
        .filter(|op| op.opcode == Opcode::ConnectRooms)
        .map(|op| op.args.iter().map(|a| (*a).to_string()).collect())
        .collect();
    assert_eq!(
        connections,
        vec![
            vec!["entity", "start", "east", "cellar"],
            vec!["entity", "cellar", "west", "start"],
        ]
    );
}

#[test]
fn lowered_output_is_well_formed() {
    let parsed = parse(
        "\"Test\" by Someone\n\nThe Kitchen is a room. The Hall is north of the Kitchen.\n\
         A jar is a kind of container. The pickle jar is a jar. The pickle jar is in the Hall.\n\
         The lamp is lit. The lamp is in the Kitchen.",
    )
    .unwrap();
    assert_eq!(parsed.symbols.entity_type("pickle jar"), Some(EntityType::Object));
    assert_eq!(parsed.symbols.entity_type("hall"), Some(EntityType::Room));
    for op in parsed.ast.operations() {
        let arity = op.opcode.arity(op.target()).unwrap();
        assert!(arity.accepts(op.args.len()), "{} has {} arguments", op.opcode, op.args.len());
    }
}
