//! The compiled game.

use std::collections::HashMap;

use im::Vector;
use trogdor_foundation::{EntityType, Error, Result};
use trogdor_language::START_ROOM;

use crate::entity::{Entity, EntityId};
use crate::script::{ScriptEngine, ScriptStore};

/// The game's introduction screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Introduction {
    /// Whether the introduction is shown.
    pub enabled: bool,
    /// Introduction text.
    pub text: Option<String>,
    /// Whether to wait for a key press after the introduction.
    pub pause: bool,
}

/// Game-wide settings.
#[derive(Clone, Debug, Default)]
pub struct GameSettings {
    /// Introduction screen.
    pub introduction: Introduction,
    /// Meta values such as title and author.
    pub meta: HashMap<String, String>,
    /// Game-wide messages.
    pub messages: HashMap<String, String>,
    /// Game-wide event handlers.
    pub events: HashMap<String, String>,
    /// Milliseconds between timer ticks.
    pub timer_period: Option<i64>,
    /// Custom directions.
    pub directions: Vector<String>,
    /// Direction synonyms, mapped to the direction they stand for.
    pub direction_synonyms: HashMap<String, String>,
    /// Verb synonyms, mapped to the verb they stand for.
    pub verb_synonyms: HashMap<String, String>,
}

impl GameSettings {
    /// Returns the game title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.meta.get("title").map(String::as_str)
    }

    /// Returns the game author.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.meta.get("author").map(String::as_str)
    }
}

/// A creature that wanders on a timer.
#[derive(Clone, Debug, PartialEq)]
pub struct WanderJob {
    /// Creature name.
    pub creature: String,
    /// Ticks between moves.
    pub interval: i64,
    /// Chance of moving on each tick.
    pub wanderlust: f64,
}

/// A being that comes back after dying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RespawnJob {
    /// Being name.
    pub being: String,
    /// Ticks before respawning.
    pub interval: i64,
    /// Remaining lives; negative means unlimited.
    pub lives: i64,
}

/// A fully instantiated game.
#[derive(Debug)]
pub struct Game<E: ScriptEngine = ScriptStore> {
    pub(crate) entities: Vec<Entity>,
    pub(crate) index: HashMap<String, EntityId>,
    pub(crate) classes: HashMap<String, Entity>,
    pub(crate) default_player: Entity,
    pub(crate) settings: GameSettings,
    pub(crate) wander_jobs: Vec<WanderJob>,
    pub(crate) respawn_jobs: Vec<RespawnJob>,
    pub(crate) engine: E,
}

impl<E: ScriptEngine> Game<E> {
    /// Looks up an entity by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.id_of(name).and_then(|id| self.entity_by_id(id))
    }

    /// Looks up an entity by ID.
    #[must_use]
    pub fn entity_by_id(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    /// Returns an entity's ID.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.index.get(name).copied()
    }

    /// Iterates over every entity in creation order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterates over entities of a type, including subtypes.
    pub fn entities_of_type(&self, ty: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |entity| entity.is_a(ty))
    }

    /// Returns a class prototype.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&Entity> {
        self.classes.get(name)
    }

    /// Returns the room players start in.
    #[must_use]
    pub fn start_room(&self) -> Option<&Entity> {
        self.entity(START_ROOM).filter(|entity| entity.is_a(EntityType::Room))
    }

    /// Returns the template new players are copied from.
    #[must_use]
    pub const fn default_player(&self) -> &Entity {
        &self.default_player
    }

    /// Creates a player from the default player template and places it in
    /// the start room.
    ///
    /// # Errors
    ///
    /// Returns a validation error if an entity with that name exists.
    pub fn create_player(&mut self, name: &str) -> Result<EntityId> {
        if self.index.contains_key(name) {
            return Err(Error::validation(format!("entity \"{name}\" already exists"), 0));
        }
        let mut player = self.default_player.instantiate(name, EntityType::Player.name());
        if self.start_room().is_some() {
            player.location = Some(START_ROOM.to_string());
        }
        let id = EntityId::new(self.entities.len());
        self.entities.push(player);
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Returns the game settings.
    #[must_use]
    pub const fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Returns creatures scheduled to wander.
    #[must_use]
    pub fn wander_jobs(&self) -> &[WanderJob] {
        &self.wander_jobs
    }

    /// Returns beings scheduled to respawn.
    #[must_use]
    pub fn respawn_jobs(&self) -> &[RespawnJob] {
        &self.respawn_jobs
    }

    /// Returns the script engine.
    #[must_use]
    pub const fn script_engine(&self) -> &E {
        &self.engine
    }

    /// Consumes the game, returning its script engine.
    #[must_use]
    pub fn into_script_engine(self) -> E {
        self.engine
    }
}
