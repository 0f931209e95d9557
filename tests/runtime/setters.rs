//! Integration tests for custom property setters

use trogdor_foundation::{EntityType, Error, Result, Value};
use trogdor_language::{Instantiator, Vocabulary, parse_markup};
use trogdor_runtime::{Entity, Runtime, SetterTable};

fn double_weight(entity: &mut Entity, value: &Value) -> Result<()> {
    let weight = value.as_int().ok_or_else(|| Error::internal("weight must be an integer"))?;
    let object = entity
        .as_object_mut()
        .ok_or_else(|| Error::internal("weight only applies to objects"))?;
    object.weight = weight * 2;
    Ok(())
}

#[test]
fn registered_setter_replaces_the_standard_one() {
    let vocabulary = Vocabulary::english();
    let parsed = parse_markup(
        r#"<game><rooms><room name="start"/></rooms><objects><object name="anvil"><weight>7</weight></object></objects></game>"#,
        &vocabulary,
    )
    .unwrap();

    let mut setters = SetterTable::standard();
    let before = setters.len();
    setters.register_entity(EntityType::Object, "weight", double_weight);
    assert_eq!(setters.len(), before);

    let runtime = Runtime::new().unwrap().with_setters(setters);
    let mut instantiator = Instantiator::new(runtime, &vocabulary);
    instantiator.instantiate(&parsed.ast).unwrap();
    let anvil = instantiator.backend().entity("anvil").unwrap();
    assert_eq!(anvil.as_object().unwrap().weight, 14);
}

#[test]
fn empty_table_rejects_every_property() {
    let vocabulary = Vocabulary::english();
    let parsed = parse_markup(
        r#"<game><rooms><room name="start"><title>Hall</title></room></rooms></game>"#,
        &vocabulary,
    )
    .unwrap();

    let runtime = Runtime::new().unwrap().with_setters(SetterTable::new());
    let mut instantiator = Instantiator::new(runtime, &vocabulary);
    let err = instantiator.instantiate(&parsed.ast).unwrap_err();
    assert!(err.is_internal());
}
