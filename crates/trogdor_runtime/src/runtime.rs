//! The runtime backend.
//!
//! [`Runtime`] receives validated operations from the instantiator and
//! builds the object model: an arena of entities with a name index, class
//! prototypes that new entities are copied from, the default player
//! template and game-wide settings. Scripts are forwarded to a
//! [`ScriptEngine`]. Once instantiation finishes the runtime is turned into
//! a [`Game`].

use std::collections::HashMap;
use std::fs;

use tracing::{debug, info};
use trogdor_foundation::{EntityType, Error, Result, Value};
use trogdor_language::{Backend, CompilerConfig, Opcode, OperationRef, OperationTable, ScriptMode, Target};

use crate::entity::{Entity, EntityId};
use crate::game::{Game, GameSettings, RespawnJob, WanderJob};
use crate::script::{Script, ScriptEngine, ScriptOwner, ScriptStore};
use crate::setters::SetterTable;

/// Name given to the default player template.
pub const DEFAULT_PLAYER: &str = "player";

/// A class prototype and the scripts every instance inherits.
#[derive(Clone, Debug)]
struct ClassPrototype {
    entity: Entity,
    scripts: Vec<Script>,
}

/// Builds a game from executed operations.
#[derive(Debug)]
pub struct Runtime<E: ScriptEngine = ScriptStore> {
    entities: Vec<Entity>,
    index: HashMap<String, EntityId>,
    classes: HashMap<String, ClassPrototype>,
    default_player: Entity,
    settings: GameSettings,
    engine: E,
    setters: SetterTable,
    config: CompilerConfig,
    wander_jobs: Vec<WanderJob>,
    respawn_jobs: Vec<RespawnJob>,
}

impl Runtime<ScriptStore> {
    /// Creates a runtime that keeps scripts in a [`ScriptStore`].
    ///
    /// # Errors
    ///
    /// Returns an internal error if the default player cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_engine(ScriptStore::new())
    }
}

impl<E: ScriptEngine> Runtime<E> {
    /// Creates a runtime around a script engine.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the default player cannot be created.
    pub fn with_engine(engine: E) -> Result<Self> {
        Ok(Self {
            entities: Vec::new(),
            index: HashMap::new(),
            classes: HashMap::new(),
            default_player: Entity::new(DEFAULT_PLAYER, EntityType::Player)?,
            settings: GameSettings::default(),
            engine,
            setters: SetterTable::standard(),
            config: CompilerConfig::default(),
            wander_jobs: Vec::new(),
            respawn_jobs: Vec::new(),
        })
    }

    /// Sets the configuration used to resolve and read script files.
    #[must_use]
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the property setter table.
    #[must_use]
    pub fn with_setters(mut self, setters: SetterTable) -> Self {
        self.setters = setters;
        self
    }

    /// Looks up an entity by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).and_then(|id| self.entities.get(id.index()))
    }

    /// Returns a class prototype.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&Entity> {
        self.classes.get(name).map(|prototype| &prototype.entity)
    }

    /// Returns the default player template.
    #[must_use]
    pub const fn default_player(&self) -> &Entity {
        &self.default_player
    }

    /// Returns the game settings.
    #[must_use]
    pub const fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Returns the script engine.
    #[must_use]
    pub const fn script_engine(&self) -> &E {
        &self.engine
    }

    /// Finishes the runtime and returns the game.
    #[must_use]
    pub fn into_game(self) -> Game<E> {
        Game {
            entities: self.entities,
            index: self.index,
            classes: self
                .classes
                .into_iter()
                .map(|(name, prototype)| (name, prototype.entity))
                .collect(),
            default_player: self.default_player,
            settings: self.settings,
            wander_jobs: self.wander_jobs,
            respawn_jobs: self.respawn_jobs,
            engine: self.engine,
        }
    }

    fn entity_mut(&mut self, name: &str) -> Result<&mut Entity> {
        self.index
            .get(name)
            .and_then(|id| self.entities.get_mut(id.index()))
            .ok_or_else(|| Error::internal(format!("entity \"{name}\" was never created")))
    }

    /// Returns the entity an operation's subject names, or `None` for the
    /// game.
    fn subject_mut(&mut self, op: &OperationRef<'_>) -> Result<Option<&mut Entity>> {
        match op.target() {
            Some(Target::Entity) => self.entity_mut(op.arg(1)).map(Some),
            Some(Target::Class) => {
                let name = op.arg(1);
                self.classes
                    .get_mut(name)
                    .map(|prototype| Some(&mut prototype.entity))
                    .ok_or_else(|| Error::internal(format!("class \"{name}\" was never created")))
            }
            Some(Target::DefaultPlayer) => Ok(Some(&mut self.default_player)),
            Some(Target::Game) => Ok(None),
            None => Err(Error::internal(format!("{} with invalid target \"{}\"", op.opcode, op.arg(0)))),
        }
    }

    fn subject_entity_mut(&mut self, op: &OperationRef<'_>) -> Result<&mut Entity> {
        self.subject_mut(op)?
            .ok_or_else(|| Error::internal(format!("{} cannot target the game", op.opcode)))
    }

    /// Takes a thing out of the room or inventory holding it, so it is
    /// held in one place at a time.
    fn detach(&mut self, name: &str) -> Result<()> {
        let thing = self.entity_mut(name)?;
        let room = thing.location.take();
        let owner = thing.as_object_mut().and_then(|object| object.owner.take());
        if let Some(room) = room {
            if let Some(room) = self.entity_mut(&room)?.as_room_mut() {
                room.contents.retain(|held| held != name);
            }
        }
        if let Some(owner) = owner {
            if let Some(being) = self.entity_mut(&owner)?.as_being_mut() {
                being.inventory.retain(|held| held != name);
            }
        }
        Ok(())
    }

    fn insert(&mut self, entity: Entity) {
        let id = EntityId::new(self.entities.len());
        self.index.insert(entity.name.clone(), id);
        self.entities.push(entity);
    }
}

// =============================================================================
// Executors
// =============================================================================

fn define_direction<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    rt.settings.directions.push_back(op.arg(0).to_string());
    Ok(())
}

fn define_direction_synonym<E: ScriptEngine>(
    rt: &mut Runtime<E>,
    op: &OperationRef<'_>,
    _: Option<&Value>,
) -> Result<()> {
    rt.settings
        .direction_synonyms
        .insert(op.arg(1).to_string(), op.arg(0).to_string());
    Ok(())
}

fn define_verb_synonym<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    rt.settings
        .verb_synonyms
        .insert(op.arg(1).to_string(), op.arg(0).to_string());
    Ok(())
}

fn define_entity_class<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let name = op.arg(0);
    let ty = entity_type(op, op.arg(1))?;
    let mut entity = Entity::new(name, ty)?;
    entity.class = name.to_string();
    rt.classes.insert(
        name.to_string(),
        ClassPrototype {
            entity,
            scripts: Vec::new(),
        },
    );
    Ok(())
}

fn define_entity<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let (name, class) = (op.arg(0), op.arg(2));
    let ty = entity_type(op, op.arg(1))?;
    let (mut entity, inherited) = match rt.classes.get(class) {
        Some(prototype) => (prototype.entity.instantiate(name, class), prototype.scripts.clone()),
        None => (Entity::new(name, ty)?, Vec::new()),
    };
    if let (Some(plural), Some(resource)) = (op.args.get(3), entity.as_resource_mut()) {
        resource.plural_title = Some((*plural).to_string());
    }
    let owner = ScriptOwner::Entity(name.to_string());
    for script in &inherited {
        rt.engine.load(&owner, script)?;
    }
    rt.insert(entity);
    Ok(())
}

fn set_message<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let (key, text) = (op.payload()[0].to_string(), op.payload()[1].to_string());
    match rt.subject_mut(op)? {
        Some(entity) => entity.messages.insert(key, text),
        None => rt.settings.messages.insert(key, text),
    };
    Ok(())
}

fn set_tag<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let tag = op.payload()[0];
    rt.subject_entity_mut(op)?.set_tag(tag, true);
    Ok(())
}

fn remove_tag<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let tag = op.payload()[0];
    rt.subject_entity_mut(op)?.set_tag(tag, false);
    Ok(())
}

fn load_script<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let (mode, text) = (op.payload()[0], op.payload()[1]);
    let script = match ScriptMode::from_name(mode) {
        Some(ScriptMode::Inline) => Script::Inline(text.to_string()),
        Some(ScriptMode::File) => {
            let path = rt.config.resolve_script_path(text);
            let source = if rt.config.load_script_files {
                let source = fs::read_to_string(&path)
                    .map_err(|e| Error::io(path.display().to_string(), &e).with_line(op.line))?;
                Some(source)
            } else {
                None
            };
            Script::File { path, source }
        }
        None => return Err(Error::internal(format!("unknown script mode \"{mode}\""))),
    };
    let owner = match op.target() {
        Some(Target::Entity) => ScriptOwner::Entity(op.arg(1).to_string()),
        Some(Target::Class) => {
            let name = op.arg(1);
            let prototype = rt
                .classes
                .get_mut(name)
                .ok_or_else(|| Error::internal(format!("class \"{name}\" was never created")))?;
            prototype.scripts.push(script.clone());
            ScriptOwner::Class(name.to_string())
        }
        Some(Target::Game) => ScriptOwner::Game,
        _ => return Err(Error::internal(format!("LOAD_SCRIPT with invalid target \"{}\"", op.arg(0)))),
    };
    debug!(owner = %owner, "loading script");
    rt.engine.load(&owner, &script)
}

fn set_event<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let (event, function) = (op.payload()[0].to_string(), op.payload()[1].to_string());
    match rt.subject_mut(op)? {
        Some(entity) => entity.events.insert(event, function),
        None => rt.settings.events.insert(event, function),
    };
    Ok(())
}

fn set_alias<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let alias = op.payload()[0].to_string();
    let entity = rt.subject_entity_mut(op)?;
    if !entity.aliases.contains(&alias) {
        entity.aliases.push_back(alias);
    }
    Ok(())
}

fn set_meta<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let (key, value) = (op.payload()[0].to_string(), op.payload()[1].to_string());
    match rt.subject_mut(op)? {
        Some(entity) => entity.meta.insert(key, value),
        None => rt.settings.meta.insert(key, value),
    };
    Ok(())
}

fn set_attribute<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, value: Option<&Value>) -> Result<()> {
    let attribute = op.payload()[0].to_string();
    let value = value
        .and_then(Value::as_int)
        .ok_or_else(|| Error::internal("SET_ATTRIBUTE without an integer value"))?;
    let entity = rt.subject_entity_mut(op)?;
    let ty = entity.entity_type();
    let being = entity
        .as_being_mut()
        .ok_or_else(|| Error::internal(format!("a {ty} has no attributes")))?;
    being.attributes.insert(attribute, value);
    Ok(())
}

fn insert_into_inventory<E: ScriptEngine>(
    rt: &mut Runtime<E>,
    op: &OperationRef<'_>,
    _: Option<&Value>,
) -> Result<()> {
    let (object_name, being_name) = (op.arg(0), op.arg(1));
    rt.detach(object_name)?;
    rt.entity_mut(object_name)?
        .as_object_mut()
        .ok_or_else(|| Error::internal(format!("\"{object_name}\" is not an object")))?
        .owner = Some(being_name.to_string());
    rt.entity_mut(being_name)?
        .as_being_mut()
        .ok_or_else(|| Error::internal(format!("\"{being_name}\" is not a being")))?
        .inventory
        .push_back(object_name.to_string());
    Ok(())
}

fn insert_into_place<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, _: Option<&Value>) -> Result<()> {
    let (thing, place) = (op.arg(0), op.arg(1));
    rt.detach(thing)?;
    rt.entity_mut(thing)?.location = Some(place.to_string());
    rt.entity_mut(place)?
        .as_room_mut()
        .ok_or_else(|| Error::internal(format!("\"{place}\" is not a room")))?
        .contents
        .push_back(thing.to_string());
    Ok(())
}

fn connect_rooms<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, value: Option<&Value>) -> Result<()> {
    let direction = value
        .and_then(Value::as_str)
        .unwrap_or(op.payload()[0])
        .to_string();
    let destination = op.payload()[1].to_string();
    let room = rt.subject_entity_mut(op)?;
    let name = room.name.clone();
    room.as_room_mut()
        .ok_or_else(|| Error::internal(format!("\"{name}\" is not a room")))?
        .exits
        .insert(direction, destination);
    Ok(())
}

fn allocate_resource<E: ScriptEngine>(
    rt: &mut Runtime<E>,
    op: &OperationRef<'_>,
    value: Option<&Value>,
) -> Result<()> {
    let (resource_name, owner) = (op.arg(0), op.arg(1));
    let amount = value
        .and_then(Value::as_float)
        .ok_or_else(|| Error::internal("ALLOCATE_RESOURCE without a numeric amount"))?;
    rt.entity_mut(resource_name)?
        .as_resource_mut()
        .ok_or_else(|| Error::internal(format!("\"{resource_name}\" is not a resource")))?
        .allocate(owner, amount)
        .map_err(|message| Error::validation(message, op.line))
}

fn set_timer_period<E: ScriptEngine>(rt: &mut Runtime<E>, op: &OperationRef<'_>, value: Option<&Value>) -> Result<()> {
    let period = value
        .and_then(Value::as_int)
        .ok_or_else(|| Error::internal(format!("SET_TIMER_PERIOD without an integer period on line {}", op.line)))?;
    rt.settings.timer_period = Some(period);
    Ok(())
}

fn entity_type(op: &OperationRef<'_>, name: &str) -> Result<EntityType> {
    EntityType::from_name(name).ok_or_else(|| Error::internal(format!("{} with unknown type \"{name}\"", op.opcode)))
}

// =============================================================================
// Backend
// =============================================================================

impl<E: ScriptEngine> Backend for Runtime<E> {
    fn register_operations(table: &mut OperationTable<Self>) {
        table.register_operation(Opcode::DefineDirection, define_direction::<E>);
        table.register_operation(Opcode::DefineDirectionSynonym, define_direction_synonym::<E>);
        table.register_operation(Opcode::DefineVerbSynonym, define_verb_synonym::<E>);
        table.register_operation(Opcode::DefineEntityClass, define_entity_class::<E>);
        table.register_operation(Opcode::DefineEntity, define_entity::<E>);
        table.register_operation(Opcode::SetMessage, set_message::<E>);
        table.register_operation(Opcode::SetTag, set_tag::<E>);
        table.register_operation(Opcode::RemoveTag, remove_tag::<E>);
        table.register_operation(Opcode::LoadScript, load_script::<E>);
        table.register_operation(Opcode::SetEvent, set_event::<E>);
        table.register_operation(Opcode::SetAlias, set_alias::<E>);
        table.register_operation(Opcode::SetMeta, set_meta::<E>);
        table.register_operation(Opcode::SetAttribute, set_attribute::<E>);
        table.register_operation(Opcode::InsertIntoInventory, insert_into_inventory::<E>);
        table.register_operation(Opcode::InsertIntoPlace, insert_into_place::<E>);
        table.register_operation(Opcode::ConnectRooms, connect_rooms::<E>);
        table.register_operation(Opcode::AllocateResource, allocate_resource::<E>);
        table.register_operation(Opcode::SetTimerPeriod, set_timer_period::<E>);
    }

    fn entity_setter_driver(&mut self, entity: &str, property: &str, value: &Value) -> Result<()> {
        let target = self
            .index
            .get(entity)
            .and_then(|id| self.entities.get_mut(id.index()))
            .ok_or_else(|| Error::internal(format!("entity \"{entity}\" was never created")))?;
        self.setters.apply(target, property, value)
    }

    fn entity_class_setter_driver(&mut self, class: &str, property: &str, value: &Value) -> Result<()> {
        let prototype = self
            .classes
            .get_mut(class)
            .ok_or_else(|| Error::internal(format!("class \"{class}\" was never created")))?;
        self.setters.apply(&mut prototype.entity, property, value)
    }

    fn default_player_setter_driver(&mut self, property: &str, value: &Value) -> Result<()> {
        self.setters.apply(&mut self.default_player, property, value)
    }

    fn game_setter_driver(&mut self, property: &str, value: &Value) -> Result<()> {
        self.setters.apply_game(&mut self.settings, property, value)
    }

    fn after_instantiate(&mut self) -> Result<()> {
        for entity in &self.entities {
            if let Some(creature) = entity.as_creature() {
                if creature.being.alive && creature.wandering.enabled {
                    self.wander_jobs.push(WanderJob {
                        creature: entity.name.clone(),
                        interval: creature.wandering.interval,
                        wanderlust: creature.wandering.wanderlust,
                    });
                }
            }
            if let Some(being) = entity.as_being() {
                if being.respawn.enabled {
                    self.respawn_jobs.push(RespawnJob {
                        being: entity.name.clone(),
                        interval: being.respawn.interval,
                        lives: being.respawn.lives,
                    });
                }
            }
        }
        info!(
            entities = self.entities.len(),
            wanderers = self.wander_jobs.len(),
            respawners = self.respawn_jobs.len(),
            "game ready"
        );
        Ok(())
    }
}
