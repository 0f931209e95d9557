//! Runtime backend for Trogdor games.
//!
//! This crate turns validated operations into a playable object model and
//! offers the end-to-end compile entry points.
//!
//! - [`Entity`] - Rooms, objects, creatures, players and resources
//! - [`SetterTable`] - Maps `(type, property)` to field writers
//! - [`Runtime`] - The instantiator backend
//! - [`Game`] - The finished game that hosts query
//! - [`compile_file`] - Reads a file and runs the right front-end

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compile;
pub mod entity;
pub mod game;
pub mod runtime;
pub mod script;
pub mod setters;


pub use compile::{SourceFormat, compile_file, compile_markup, compile_natural};
pub use entity::{
    ATTACKABLE_TAG, Allegiance, AutoAttack, Being, Creature, Entity, EntityId, EntityKind, Object, Resource,
    Respawn, Room, UNDROPPABLE_TAG, UNTAKEABLE_TAG, WEAPON_TAG, Wandering,
};
pub use game::{Game, GameSettings, Introduction, RespawnJob, WanderJob};
pub use runtime::{DEFAULT_PLAYER, Runtime};
pub use script::{Script, ScriptEngine, ScriptOwner, ScriptStore};
pub use setters::{EntitySetter, GameSetter, SetterTable};
