//! Property setter tables.
//!
//! A single `SetProperty` operation covers every settable field. The
//! validator has already typed the value by the time it arrives here; the
//! table maps `(entity type, property)` to a small function that writes
//! the value into the right field. Lookups walk up the type hierarchy, so
//! a setter registered for `being` serves creatures and players.

use std::collections::HashMap;

use trogdor_foundation::{EntityType, Error, Result, Value};

use crate::entity::{
    ATTACKABLE_TAG, Allegiance, Being, Creature, Entity, Object, Resource, UNDROPPABLE_TAG, UNTAKEABLE_TAG,
    WEAPON_TAG,
};
use crate::game::GameSettings;

/// Writes a typed value into an entity.
pub type EntitySetter = fn(&mut Entity, &Value) -> Result<()>;

/// Writes a typed value into the game settings.
pub type GameSetter = fn(&mut GameSettings, &Value) -> Result<()>;

/// Setters for entity and game properties.
#[derive(Clone, Debug, Default)]
pub struct SetterTable {
    entity: HashMap<EntityType, HashMap<&'static str, EntitySetter>>,
    game: HashMap<&'static str, GameSetter>,
}

impl SetterTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with every built-in property.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        register_common(&mut table);
        register_resource(&mut table);
        register_object(&mut table);
        register_being(&mut table);
        register_creature(&mut table);
        register_game(&mut table);
        table
    }

    /// Registers a setter for a property of `ty` and its subtypes.
    pub fn register_entity(&mut self, ty: EntityType, property: &'static str, setter: EntitySetter) {
        self.entity.entry(ty).or_default().insert(property, setter);
    }

    /// Registers a game property setter.
    pub fn register_game(&mut self, property: &'static str, setter: GameSetter) {
        self.game.insert(property, setter);
    }

    /// Finds the setter for a property, checking `ty` and then each of its
    /// ancestors.
    #[must_use]
    pub fn entity_setter(&self, ty: EntityType, property: &str) -> Option<EntitySetter> {
        let mut current = Some(ty);
        while let Some(ty) = current {
            if let Some(setter) = self.entity.get(&ty).and_then(|setters| setters.get(property)) {
                return Some(*setter);
            }
            current = ty.parent();
        }
        None
    }

    /// Sets a property on an entity.
    ///
    /// # Errors
    ///
    /// Returns an internal error if no setter exists or the value has the
    /// wrong type; validation should have rejected both.
    pub fn apply(&self, entity: &mut Entity, property: &str, value: &Value) -> Result<()> {
        let ty = entity.entity_type();
        let setter = self
            .entity_setter(ty, property)
            .ok_or_else(|| Error::internal(format!("no setter for property \"{property}\" on a {ty}")))?;
        setter(entity, value)
    }

    /// Sets a game property.
    ///
    /// # Errors
    ///
    /// Returns an internal error if no setter exists or the value has the
    /// wrong type.
    pub fn apply_game(&self, settings: &mut GameSettings, property: &str, value: &Value) -> Result<()> {
        let setter = self
            .game
            .get(property)
            .ok_or_else(|| Error::internal(format!("no setter for game property \"{property}\"")))?;
        setter(settings, value)
    }

    /// Number of registered setters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entity.values().map(HashMap::len).sum::<usize>() + self.game.len()
    }

    /// Checks if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Value and capability extraction
// =============================================================================

fn mismatch(expected: &str, value: &Value) -> Error {
    Error::internal(format!("expected {expected} value, got {:?}", value))
}

fn text(value: &Value) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| mismatch("a string", value))
}

fn int(value: &Value) -> Result<i64> {
    value.as_int().ok_or_else(|| mismatch("an integer", value))
}

fn number(value: &Value) -> Result<f64> {
    value.as_float().ok_or_else(|| mismatch("a numeric", value))
}

fn flag(value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| mismatch("a boolean", value))
}

fn lacks(ty: EntityType, capability: &str) -> Error {
    Error::internal(format!("a {ty} has no {capability} state"))
}

fn object(entity: &mut Entity) -> Result<&mut Object> {
    let ty = entity.entity_type();
    entity.as_object_mut().ok_or_else(|| lacks(ty, "object"))
}

fn being(entity: &mut Entity) -> Result<&mut Being> {
    let ty = entity.entity_type();
    entity.as_being_mut().ok_or_else(|| lacks(ty, "being"))
}

fn creature(entity: &mut Entity) -> Result<&mut Creature> {
    let ty = entity.entity_type();
    entity.as_creature_mut().ok_or_else(|| lacks(ty, "creature"))
}

fn resource(entity: &mut Entity) -> Result<&mut Resource> {
    let ty = entity.entity_type();
    entity.as_resource_mut().ok_or_else(|| lacks(ty, "resource"))
}

// =============================================================================
// Built-in setters
// =============================================================================

fn register_common(table: &mut SetterTable) {
    table.register_entity(EntityType::Entity, "title", |e, v| {
        e.title = Some(text(v)?);
        Ok(())
    });
    table.register_entity(EntityType::Entity, "longDesc", |e, v| {
        e.long_desc = Some(text(v)?);
        Ok(())
    });
    table.register_entity(EntityType::Entity, "shortDesc", |e, v| {
        e.short_desc = Some(text(v)?);
        Ok(())
    });
}

fn register_resource(table: &mut SetterTable) {
    table.register_entity(EntityType::Resource, "amountAvailable", |e, v| {
        resource(e)?.amount_available = Some(number(v)?);
        Ok(())
    });
    table.register_entity(EntityType::Resource, "maxAllocationPerDepositor", |e, v| {
        resource(e)?.max_allocation_per_depositor = Some(number(v)?);
        Ok(())
    });
    table.register_entity(EntityType::Resource, "requireIntegerAllocations", |e, v| {
        resource(e)?.require_integer_allocations = flag(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Resource, "pluralTitle", |e, v| {
        resource(e)?.plural_title = Some(text(v)?);
        Ok(())
    });
}

fn register_object(table: &mut SetterTable) {
    table.register_entity(EntityType::Object, "weight", |e, v| {
        object(e)?.weight = int(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Object, "damage", |e, v| {
        object(e)?.damage = int(v)?;
        Ok(())
    });
    // Takeable, droppable and weapon are kept as tags.
    table.register_entity(EntityType::Object, "takeable", |e, v| {
        e.set_tag(UNTAKEABLE_TAG, !flag(v)?);
        Ok(())
    });
    table.register_entity(EntityType::Object, "droppable", |e, v| {
        e.set_tag(UNDROPPABLE_TAG, !flag(v)?);
        Ok(())
    });
    table.register_entity(EntityType::Object, "weapon", |e, v| {
        e.set_tag(WEAPON_TAG, flag(v)?);
        Ok(())
    });
}

fn register_being(table: &mut SetterTable) {
    table.register_entity(EntityType::Being, "alive", |e, v| {
        being(e)?.alive = flag(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Being, "attackable", |e, v| {
        e.set_tag(ATTACKABLE_TAG, flag(v)?);
        Ok(())
    });
    table.register_entity(EntityType::Being, "health", |e, v| {
        being(e)?.set_health(int(v)?);
        Ok(())
    });
    table.register_entity(EntityType::Being, "maxHealth", |e, v| {
        being(e)?.set_max_health(int(v)?);
        Ok(())
    });
    table.register_entity(EntityType::Being, "damageBareHands", |e, v| {
        being(e)?.damage_bare_hands = int(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Being, "woundRate", |e, v| {
        being(e)?.wound_rate = number(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Being, "respawn.enabled", |e, v| {
        being(e)?.respawn.enabled = flag(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Being, "respawn.interval", |e, v| {
        being(e)?.respawn.interval = int(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Being, "respawn.lives", |e, v| {
        being(e)?.respawn.lives = int(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Being, "inventory.weight", |e, v| {
        being(e)?.inventory_weight = int(v)?;
        Ok(())
    });
}

fn register_creature(table: &mut SetterTable) {
    table.register_entity(EntityType::Creature, "counterAttack", |e, v| {
        creature(e)?.counter_attack = flag(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Creature, "allegiance", |e, v| {
        let name = text(v)?;
        creature(e)?.allegiance = Allegiance::from_name(&name)
            .ok_or_else(|| Error::internal(format!("unknown allegiance \"{name}\"")))?;
        Ok(())
    });
    table.register_entity(EntityType::Creature, "autoAttack.enabled", |e, v| {
        creature(e)?.auto_attack.enabled = flag(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Creature, "autoAttack.repeat", |e, v| {
        creature(e)?.auto_attack.repeat = flag(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Creature, "autoAttack.interval", |e, v| {
        creature(e)?.auto_attack.interval = int(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Creature, "wandering.enabled", |e, v| {
        creature(e)?.wandering.enabled = flag(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Creature, "wandering.interval", |e, v| {
        creature(e)?.wandering.interval = int(v)?;
        Ok(())
    });
    table.register_entity(EntityType::Creature, "wandering.wanderlust", |e, v| {
        creature(e)?.wandering.wanderlust = number(v)?;
        Ok(())
    });
}

fn register_game(table: &mut SetterTable) {
    table.register_game("introduction.enabled", |g, v| {
        g.introduction.enabled = flag(v)?;
        Ok(())
    });
    table.register_game("introduction.text", |g, v| {
        g.introduction.text = Some(text(v)?);
        Ok(())
    });
    table.register_game("introduction.pause", |g, v| {
        g.introduction.pause = flag(v)?;
        Ok(())
    });
}
