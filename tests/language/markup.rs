//! Integration tests for the markup front-end

use trogdor_foundation::{EntityType, ErrorKind};
use trogdor_language::{Opcode, Parsed, Vocabulary, parse_markup};

fn parse(source: &str) -> trogdor_foundation::Result<Parsed> {
    parse_markup(source, &Vocabulary::english())
}

fn opcodes(parsed: &Parsed) -> Vec<Opcode> {
    parsed.ast.operations().map(|op| op.opcode).collect()
}

// =============================================================================
// Forward references
// =============================================================================

#[test]
fn forward_reference_is_patched_in_place() {
    let parsed = parse(
        r#"<game>
          <classes><rooms><room class="cave"/></rooms></classes>
          <rooms>
            <room name="start"><east>grotto</east></room>
            <cave name="grotto"><west>start</west></cave>
          </rooms>
        </game>"#,
    )
    .unwrap();

    let defines: Vec<_> = parsed
        .ast
        .operations()
        .filter(|op| op.opcode == Opcode::DefineEntity)
        .map(|op| op.args.clone())
        .collect();
    assert_eq!(defines.len(), 2);
    assert_eq!(defines[1], vec!["grotto", "room", "cave"]);

    // The placeholder stays where the name was first used, ahead of the
    // connection that needs it.
    let ops = opcodes(&parsed);
    let grotto = ops.iter().rposition(|op| *op == Opcode::DefineEntity).unwrap();
    let first_connection = ops.iter().position(|op| *op == Opcode::ConnectRooms).unwrap();
    assert!(grotto < first_connection);
    assert_eq!(parsed.symbols.entity_class("grotto"), Some("cave"));
}

#[test]
fn unresolved_references_are_aggregated() {
    let err = parse(
        "<game><rooms>\n<room name=\"start\">\n<east>void</east>\n<contains><object>sword</object></contains>\n<west>void</west>\n</room>\n</rooms></game>",
    )
    .unwrap_err();
    let ErrorKind::UnresolvedReferences(names) = &err.kind else {
        panic!("expected unresolved references, got {err}");
    };
    assert_eq!(names.len(), 2);
    let void = names.iter().find(|n| n.name == "void").unwrap();
    assert_eq!(void.entity_type, EntityType::Room);
    assert_eq!(void.lines, vec![3, 5]);
    let sword = names.iter().find(|n| n.name == "sword").unwrap();
    assert_eq!(sword.lines, vec![4]);
}

#[test]
fn reference_type_must_match_declaration() {
    let err = parse(
        r#"<game>
          <rooms><room name="start"><contains><object>troll</object></contains></room></rooms>
          <creatures><creature name="troll"/></creatures>
        </game>"#,
    )
    .unwrap_err();
    assert!(err.is_parse());
    assert!(err.to_string().contains("troll"));
}

// =============================================================================
// Classes
// =============================================================================

#[test]
fn class_used_in_the_wrong_section() {
    let err = parse(
        r#"<game>
          <classes><objects><object class="gem"/></objects></classes>
          <rooms><gem name="ruby"/></rooms>
        </game>"#,
    )
    .unwrap_err();
    assert!(err.is_parse());
}

#[test]
fn class_names_cannot_be_types() {
    let err = parse(r#"<game><classes><rooms><room class="object"/></rooms></classes></game>"#).unwrap_err();
    assert!(err.is_parse());
}

#[test]
fn duplicate_entities_rejected() {
    let err = parse(
        "<game><rooms>\n<room name=\"start\"/>\n<room name=\"start\"/>\n</rooms></game>",
    )
    .unwrap_err();
    assert_eq!(err.line(), Some(3));
}

// =============================================================================
// Whole documents
// =============================================================================

#[test]
fn every_operation_has_legal_arity() {
    let parsed = parse(
        r#"<game>
          <meta><title>Cave</title></meta>
          <vocabulary><synonyms><synonym verb="take">grab</synonym></synonyms></vocabulary>
          <player><default><maxhealth>10</maxhealth><attributes><strength>12</strength></attributes></default></player>
          <rooms><room name="start"><contains><object>lamp</object></contains>
            <resources><resource amount="3">gold</resource></resources></room></rooms>
          <objects><object name="lamp"><aliases><alias>light</alias></aliases></object></objects>
          <resources><resource name="gold"><amount>10</amount></resource></resources>
          <timer><period>1000</period></timer>
        </game>"#,
    )
    .unwrap();
    assert!(parsed.ast.len() > 10);
    for op in parsed.ast.operations() {
        let arity = op.opcode.arity(op.target()).unwrap();
        assert!(arity.accepts(op.args.len()), "{} has {} arguments", op.opcode, op.args.len());
    }
}
