//! Both front-ends through the whole pipeline

use trogdor::foundation::{EntityType, ErrorKind};
use trogdor::language::CompilerConfig;
use trogdor::{compile_markup, compile_natural};

#[test]
fn markup_connection_to_a_later_room() {
    let game = compile_markup(
        r#"<game><rooms><room name="start"><east>foo</east></room><room name="foo"/></rooms></game>"#,
        &CompilerConfig::default(),
    )
    .unwrap();
    let start = game.start_room().unwrap().as_room().unwrap();
    assert_eq!(start.exits.get("east").map(String::as_str), Some("foo"));
    // Markup connections are one-way.
    assert!(game.entity("foo").unwrap().as_room().unwrap().exits.is_empty());
}

#[test]
fn missing_start_room() {
    let source = r#"<game><rooms><room name="lobby"/></rooms></game>"#;
    let err = compile_markup(source, &CompilerConfig::default()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoStartRoom));

    let lenient = CompilerConfig::default().with_require_start_room(false);
    let game = compile_markup(source, &lenient).unwrap();
    assert!(game.start_room().is_none());
}

#[test]
fn unresolved_references_are_reported_together() {
    let err = compile_markup(
        "<game><rooms>\n<room name=\"start\">\n<north>attic</north>\n<contains><object>key</object></contains>\n</room>\n</rooms></game>",
        &CompilerConfig::default(),
    )
    .unwrap_err();
    let ErrorKind::UnresolvedReferences(names) = &err.kind else {
        panic!("expected unresolved references, got {err}");
    };
    let mut found: Vec<_> = names.iter().map(|n| (n.name.as_str(), n.entity_type)).collect();
    found.sort_by_key(|(name, _)| *name);
    assert_eq!(found, vec![("attic", EntityType::Room), ("key", EntityType::Object)]);
    let message = err.to_string();
    assert!(message.contains("attic") && message.contains("key"), "{message}");
}

#[test]
fn natural_story_builds_a_map() {
    let game = compile_natural(
        "\"Small House\" by Somebody\n\nThe Kitchen is a room. The Hall is south of the Kitchen.\nThe lamp is lit. The lamp is in the Hall.",
        &CompilerConfig::default(),
    )
    .unwrap();
    assert_eq!(game.settings().title(), Some("Small House"));
    let kitchen = game.start_room().unwrap();
    assert_eq!(kitchen.title(), "Kitchen");
    assert_eq!(kitchen.as_room().unwrap().exits.get("south").map(String::as_str), Some("hall"));
    let hall = game.entity("hall").unwrap().as_room().unwrap();
    assert_eq!(hall.exits.get("north").map(String::as_str), Some("start"));
    assert!(hall.contents.contains(&"lamp".to_string()));
    assert!(game.entity("lamp").unwrap().has_tag("lit"));
}

#[test]
fn natural_contradiction_fails() {
    let err = compile_natural(
        "A box is a container.\nA box is open.\nA box is closed.\n",
        &CompilerConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.line(), Some(3));
}

#[test]
fn both_front_ends_agree_on_rooms() {
    let markup = compile_markup(
        r#"<game><rooms><room name="start"><title>Kitchen</title><south>hall</south></room><room name="hall"><title>Hall</title><north>start</north></room></rooms></game>"#,
        &CompilerConfig::default(),
    )
    .unwrap();
    let natural = compile_natural(
        "The Kitchen is a room. The Hall is south of the Kitchen.",
        &CompilerConfig::default(),
    )
    .unwrap();
    for game in [&markup, &natural] {
        let rooms: Vec<_> = game.entities_of_type(EntityType::Room).map(|r| r.title().to_string()).collect();
        assert_eq!(rooms, vec!["Kitchen", "Hall"]);
        let start = game.start_room().unwrap().as_room().unwrap();
        assert_eq!(start.exits.get("south").map(String::as_str), Some("hall"));
    }
}
