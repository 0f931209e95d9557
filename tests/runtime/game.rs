//! Integration tests for compiled games

use trogdor_foundation::EntityType;
use trogdor_language::CompilerConfig;
use trogdor_runtime::{Allegiance, UNTAKEABLE_TAG, compile_markup};

const CAVE: &str = r#"<game>
  <meta><title>Cave</title><author>Nobody</author></meta>
  <classes><creatures><creature class="rat"><allegiance>enemy</allegiance></creature></creatures></classes>
  <player><default><maxhealth>20</maxhealth></default></player>
  <rooms>
    <room name="start">
      <title>Entrance</title>
      <north>hall</north>
      <contains><object>rock</object><creature>rat1</creature></contains>
      <resources><resource amount="4">gold</resource></resources>
    </room>
    <room name="hall"><south>start</south></room>
  </rooms>
  <objects>
    <object name="rock"><weight>5</weight><takeable>0</takeable></object>
    <object name="sword"><damage>3</damage></object>
  </objects>
  <creatures>
    <creature name="troll"><inventory><object>sword</object></inventory></creature>
    <rat name="rat1"/>
  </creatures>
  <resources><resource name="gold"><amount>10</amount><pluraltitle>golds</pluraltitle></resource></resources>
</game>"#;

#[test]
fn markup_game_compiles() {
    let game = compile_markup(CAVE, &CompilerConfig::default()).unwrap();
    assert_eq!(game.settings().title(), Some("Cave"));
    assert_eq!(game.settings().author(), Some("Nobody"));

    let start = game.start_room().unwrap();
    assert_eq!(start.title(), "Entrance");
    let exits = &start.as_room().unwrap().exits;
    assert_eq!(exits.get("north").map(String::as_str), Some("hall"));

    let rock = game.entity("rock").unwrap();
    assert_eq!(rock.as_object().unwrap().weight, 5);
    assert!(rock.has_tag(UNTAKEABLE_TAG));
    assert_eq!(rock.location.as_deref(), Some("start"));

    let sword = game.entity("sword").unwrap();
    assert_eq!(sword.as_object().unwrap().owner.as_deref(), Some("troll"));
}

#[test]
fn class_instances_and_queries() {
    let game = compile_markup(CAVE, &CompilerConfig::default()).unwrap();
    let rat = game.entity("rat1").unwrap();
    assert_eq!(rat.class, "rat");
    assert_eq!(rat.as_creature().unwrap().allegiance, Allegiance::Enemy);
    assert!(game.class("rat").is_some());

    let creatures: Vec<_> = game.entities_of_type(EntityType::Creature).map(|e| e.name.as_str()).collect();
    assert_eq!(creatures.len(), 2);
    assert!(creatures.contains(&"troll"));
    assert_eq!(game.entities_of_type(EntityType::Thing).count(), 4);
}

#[test]
fn resources_are_allocated() {
    let game = compile_markup(CAVE, &CompilerConfig::default()).unwrap();
    let gold = game.entity("gold").unwrap().as_resource().unwrap();
    assert!((gold.allocated_to("start") - 4.0).abs() < f64::EPSILON);
    assert_eq!(gold.plural_title.as_deref(), Some("golds"));
}

#[test]
fn players_copy_the_default_template() {
    let mut game = compile_markup(CAVE, &CompilerConfig::default()).unwrap();
    let id = game.create_player("alice").unwrap();
    let alice = game.entity_by_id(id).unwrap();
    assert_eq!(alice.entity_type(), EntityType::Player);
    assert_eq!(alice.location.as_deref(), Some("start"));
    assert_eq!(alice.as_being().unwrap().max_health, 20);

    let err = game.create_player("alice").unwrap_err();
    assert!(err.is_validation());
    assert!(game.create_player("rock").is_err());
}

#[test]
fn a_thing_is_held_in_one_place() {
    let game = compile_markup(
        r#"<game>
  <rooms>
    <room name="start"><contains><object>sword</object></contains></room>
    <room name="hall"><contains><object>sword</object></contains></room>
  </rooms>
  <objects><object name="sword"/></objects>
  <creatures><creature name="troll"><inventory><object>sword</object></inventory></creature></creatures>
</game>"#,
        &CompilerConfig::default(),
    )
    .unwrap();

    for room in ["start", "hall"] {
        let contents = &game.entity(room).unwrap().as_room().unwrap().contents;
        assert!(contents.is_empty(), "{room} still holds {contents:?}");
    }
    let troll = game.entity("troll").unwrap().as_being().unwrap();
    assert_eq!(troll.inventory.iter().collect::<Vec<_>>(), vec!["sword"]);
    let sword = game.entity("sword").unwrap();
    assert_eq!(sword.location, None);
    assert_eq!(sword.as_object().unwrap().owner.as_deref(), Some("troll"));
}

#[test]
fn whole_amounts_apply_to_later_allocations() {
    let room = r#"<rooms><room name="start"><resources><resource amount="2.5">gold</resource></resources></room></rooms>"#;
    let gold = r#"<resources><resource name="gold"><integer>1</integer></resource></resources>"#;

    // The flag is set after the allocation runs, so the fraction stands.
    let game = compile_markup(&format!("<game>{room}{gold}</game>"), &CompilerConfig::default()).unwrap();
    let resource = game.entity("gold").unwrap().as_resource().unwrap();
    assert!(resource.require_integer_allocations);
    assert!((resource.allocated_to("start") - 2.5).abs() < f64::EPSILON);

    let err = compile_markup(&format!("<game>{gold}{room}</game>"), &CompilerConfig::default()).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("whole amounts"), "{err}");
}

#[test]
fn redefined_markup_class_is_a_parse_error() {
    let err = compile_markup(
        "<game><classes>\n<creatures><creature class=\"rat\"/></creatures>\n<objects><object class=\"rat\"/></objects>\n</classes><rooms><room name=\"start\"/></rooms></game>",
        &CompilerConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.line(), Some(3));
    assert!(err.to_string().contains("already declared as a class on line 2"), "{err}");
}
