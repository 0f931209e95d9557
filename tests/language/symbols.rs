//! Integration tests for the symbol table

use trogdor_foundation::{EntityType, ErrorKind};
use trogdor_language::{Ast, Opcode, SymbolTable, Vocabulary};

#[test]
fn placeholder_then_declaration() {
    let mut ast = Ast::new();
    let mut symbols = SymbolTable::new();
    symbols.reference_entity(&mut ast, "cave", EntityType::Room, 2).unwrap();
    symbols.reference_entity(&mut ast, "cave", EntityType::Room, 5).unwrap();
    assert!(symbols.finish().is_err());

    symbols.declare_class("grotto", EntityType::Room, 1).unwrap();
    let node = symbols
        .declare_entity(&mut ast, "cave", EntityType::Room, "grotto", None, 7)
        .unwrap();
    symbols.finish().unwrap();

    let defines: Vec<_> = ast
        .operations()
        .filter(|op| op.opcode == Opcode::DefineEntity)
        .collect();
    assert_eq!(defines.len(), 1);
    assert_eq!(defines[0].id, node);
    assert_eq!(defines[0].args, vec!["cave", "room", "grotto"]);
    assert_eq!(symbols.entity_class("cave"), Some("grotto"));
}

#[test]
fn finish_lists_names_in_first_reference_order() {
    let mut ast = Ast::new();
    let mut symbols = SymbolTable::new();
    symbols.reference_entity(&mut ast, "b", EntityType::Object, 1).unwrap();
    symbols.reference_entity(&mut ast, "a", EntityType::Room, 2).unwrap();
    symbols.reference_entity(&mut ast, "b", EntityType::Object, 3).unwrap();
    let err = symbols.finish().unwrap_err();
    let ErrorKind::UnresolvedReferences(names) = err.kind else {
        panic!("expected unresolved references");
    };
    let summary: Vec<_> = names.iter().map(|n| (n.name.as_str(), n.lines.clone())).collect();
    assert_eq!(summary, vec![("b", vec![1, 3]), ("a", vec![2])]);
}

#[test]
fn conflicting_reference_types() {
    let mut ast = Ast::new();
    let mut symbols = SymbolTable::new();
    symbols.reference_entity(&mut ast, "x", EntityType::Room, 1).unwrap();
    assert!(symbols.reference_entity(&mut ast, "x", EntityType::Object, 2).is_err());
    let err = symbols
        .declare_entity(&mut ast, "x", EntityType::Object, "object", None, 3)
        .unwrap_err();
    assert!(err.to_string().contains("line(s) 1"));
}

#[test]
fn class_must_allow_type() {
    let mut ast = Ast::new();
    let mut symbols = SymbolTable::new();
    symbols.declare_class("gem", EntityType::Object, 1).unwrap();
    assert!(symbols.class_allows("gem", EntityType::Object));
    assert!(symbols.class_allows("room", EntityType::Room));
    assert!(!symbols.class_allows("gem", EntityType::Room));
    assert!(symbols
        .declare_entity(&mut ast, "ruby", EntityType::Room, "gem", None, 2)
        .is_err());
    assert!(symbols.declare_class("gem", EntityType::Object, 3).is_err());
}

#[test]
fn directions_and_synonyms() {
    let vocabulary = Vocabulary::english();
    let mut symbols = SymbolTable::new();
    symbols.declare_direction(&vocabulary, "widdershins", 1).unwrap();
    assert!(symbols.declare_direction(&vocabulary, "north", 2).is_err());
    symbols
        .declare_direction_synonym(&vocabulary, "widdershins", "wd", 3)
        .unwrap();
    assert_eq!(symbols.resolve_direction(&vocabulary, "wd"), Some("widdershins"));
    assert_eq!(symbols.resolve_direction(&vocabulary, "n"), Some("north"));
    assert!(symbols.declare_direction_synonym(&vocabulary, "wd", "x", 4).is_err());

    symbols.declare_verb_synonym("take", "grab", 5).unwrap();
    assert_eq!(symbols.verb_for_synonym("grab"), Some("take"));
    assert!(symbols.declare_verb_synonym("drop", "grab", 6).is_err());
}
