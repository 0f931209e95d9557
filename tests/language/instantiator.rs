//! Integration tests for validation and instantiation

use trogdor_foundation::{EntityType, ErrorKind, Result, Value};
use trogdor_language::{
    Ast, Backend, CompilerConfig, Instantiator, Opcode, OperationRef, OperationTable, Subject, Vocabulary,
};

/// Counts executed operations and remembers property writes.
#[derive(Default)]
struct Tally {
    executed: usize,
    writes: Vec<(String, Value)>,
}

fn count(backend: &mut Tally, _op: &OperationRef<'_>, _value: Option<&Value>) -> Result<()> {
    backend.executed += 1;
    Ok(())
}

impl Backend for Tally {
    fn register_operations(table: &mut OperationTable<Self>) {
        for opcode in Opcode::ALL {
            if opcode != Opcode::SetProperty {
                table.register_operation(opcode, count);
            }
        }
    }

    fn entity_setter_driver(&mut self, entity: &str, property: &str, value: &Value) -> Result<()> {
        self.writes.push((format!("{entity}.{property}"), value.clone()));
        Ok(())
    }

    fn entity_class_setter_driver(&mut self, class: &str, property: &str, value: &Value) -> Result<()> {
        self.writes.push((format!("{class}.{property}"), value.clone()));
        Ok(())
    }

    fn default_player_setter_driver(&mut self, property: &str, value: &Value) -> Result<()> {
        self.writes.push((format!("player.{property}"), value.clone()));
        Ok(())
    }

    fn game_setter_driver(&mut self, property: &str, value: &Value) -> Result<()> {
        self.writes.push((format!("game.{property}"), value.clone()));
        Ok(())
    }
}

fn run(ast: &Ast) -> (Result<()>, Tally) {
    let vocabulary = Vocabulary::english();
    let mut instantiator = Instantiator::new(Tally::default(), &vocabulary);
    let result = instantiator.instantiate(ast);
    (result, instantiator.into_backend())
}

fn with_start() -> Ast {
    let mut ast = Ast::new();
    ast.define_entity("start", EntityType::Room, "room", None, 1);
    ast
}

#[test]
fn class_type_mismatch() {
    let mut ast = with_start();
    ast.define_entity_class("gem", EntityType::Object, 2);
    ast.define_entity("ruby", EntityType::Room, "gem", None, 3);
    let (result, tally) = run(&ast);
    let err = result.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.line(), Some(3));
    assert!(err.to_string().contains("class-type mismatch"), "{err}");
    assert_eq!(tally.executed, 2);
}

#[test]
fn class_redefined_with_other_type() {
    let mut ast = with_start();
    ast.define_entity_class("gem", EntityType::Object, 2);
    ast.define_entity_class("gem", EntityType::Room, 3);
    let err = run(&ast).0.unwrap_err();
    assert!(err.to_string().contains("class-type mismatch"), "{err}");
}

#[test]
fn missing_start_room() {
    let mut ast = Ast::new();
    ast.define_entity("foo", EntityType::Room, "room", None, 1);
    let err = run(&ast).0.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoStartRoom));

    // A start that is not a room does not count.
    let mut ast = Ast::new();
    ast.define_entity("start", EntityType::Object, "object", None, 1);
    assert!(matches!(run(&ast).0.unwrap_err().kind, ErrorKind::NoStartRoom));
}

#[test]
fn lenient_config_allows_fragments() {
    let vocabulary = Vocabulary::english();
    let mut ast = Ast::new();
    ast.define_entity("foo", EntityType::Room, "room", None, 1);
    let mut instantiator =
        Instantiator::new(Tally::default(), &vocabulary).with_config(&CompilerConfig::lenient());
    instantiator.instantiate(&ast).unwrap();
    assert!(instantiator.symbols().entity_exists("foo"));
}

#[test]
fn property_values_are_typed() {
    let mut ast = with_start();
    ast.define_entity("rock", EntityType::Object, "object", None, 2);
    ast.define_entity("troll", EntityType::Creature, "creature", None, 3);
    ast.set_property(Subject::Entity("rock"), "weight", "5", 4);
    ast.set_property(Subject::Entity("troll"), "allegiance", "enemy", 5);
    ast.set_property(Subject::Entity("troll"), "wandering.wanderlust", "0.75", 6);
    ast.set_property(Subject::DefaultPlayer, "alive", "1", 7);
    let (result, tally) = run(&ast);
    result.unwrap();
    assert_eq!(
        tally.writes,
        vec![
            ("rock.weight".to_string(), Value::Int(5)),
            ("troll.allegiance".to_string(), Value::from("enemy")),
            ("troll.wandering.wanderlust".to_string(), Value::Float(0.75)),
            ("player.alive".to_string(), Value::Bool(true)),
        ]
    );
}

#[test]
fn invalid_property_values() {
    for (property, value) in [
        ("weight", "heavy"),
        ("weight", "1.5"),
        ("takeable", "yes"),
        ("health", "3"),
        ("nonsense", "1"),
    ] {
        let mut ast = with_start();
        ast.define_entity("rock", EntityType::Object, "object", None, 2);
        ast.set_property(Subject::Entity("rock"), property, value, 3);
        let err = run(&ast).0.unwrap_err();
        assert!(err.is_validation(), "{property}={value}: {err}");
        assert_eq!(err.line(), Some(3));
    }
}

#[test]
fn wanderlust_is_a_probability() {
    let mut ast = with_start();
    ast.define_entity("bat", EntityType::Creature, "creature", None, 2);
    ast.set_property(Subject::Entity("bat"), "wandering.wanderlust", "1.5", 3);
    assert!(run(&ast).0.unwrap_err().is_validation());
}

#[test]
fn placement_checks_types() {
    let mut ast = with_start();
    ast.define_entity("rock", EntityType::Object, "object", None, 2);
    ast.define_entity("troll", EntityType::Creature, "creature", None, 3);
    ast.insert_into_inventory("troll", "rock", 4);
    let err = run(&ast).0.unwrap_err();
    assert!(err.to_string().contains("not a object"), "{err}");

    let mut ast = with_start();
    ast.define_entity("rock", EntityType::Object, "object", None, 2);
    ast.connect_rooms(Subject::Entity("start"), "sideways", "start", 3);
    assert!(run(&ast).0.unwrap_err().to_string().contains("not a direction"));
}

#[test]
fn timer_period_must_be_positive() {
    let mut ast = with_start();
    ast.set_timer_period("0", 2);
    assert!(run(&ast).0.unwrap_err().is_validation());
}
