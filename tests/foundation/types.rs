//! Integration tests for EntityType and Arity

use trogdor_foundation::{Arity, EntityType};

#[test]
fn hierarchy() {
    assert!(EntityType::Creature.is_a(EntityType::Being));
    assert!(EntityType::Creature.is_a(EntityType::Thing));
    assert!(EntityType::Room.is_a(EntityType::Tangible));
    assert!(EntityType::Resource.is_a(EntityType::Entity));
    assert!(!EntityType::Resource.is_a(EntityType::Tangible));
    assert!(!EntityType::Object.is_a(EntityType::Being));
}

#[test]
fn every_type_reaches_the_root() {
    for ty in EntityType::ALL {
        assert!(ty.is_a(EntityType::Entity), "{ty}");
        assert_eq!(EntityType::from_name(ty.name()), Some(ty));
    }
}

#[test]
fn only_concrete_types_are_instantiable() {
    let instantiable: Vec<_> = EntityType::ALL
        .into_iter()
        .filter(|ty| ty.is_instantiable())
        .collect();
    assert_eq!(
        instantiable,
        vec![EntityType::Resource, EntityType::Room, EntityType::Object, EntityType::Creature]
    );
}

#[test]
fn arity() {
    assert!(Arity::Exact(2).accepts(2));
    assert!(!Arity::Exact(2).accepts(3));
    assert!(Arity::Range(3, 4).accepts(3));
    assert!(Arity::Range(3, 4).accepts(4));
    assert!(!Arity::Range(3, 4).accepts(5));
}
