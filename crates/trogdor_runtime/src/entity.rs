//! The instantiated object model.
//!
//! An [`Entity`] carries the fields every entity shares plus an
//! [`EntityKind`] holding the data specific to its type. Type-specific
//! access goes through the `as_*` capability helpers rather than
//! downcasts. Collections use `im` so copying a class prototype into a new
//! entity shares structure with the prototype.

use im::{HashMap, HashSet, Vector};
use trogdor_foundation::{EntityType, Error, Result};

/// Tag present on beings that can be attacked.
pub const ATTACKABLE_TAG: &str = "attackable";
/// Tag present on objects that cannot be taken.
pub const UNTAKEABLE_TAG: &str = "untakeable";
/// Tag present on objects that cannot be dropped.
pub const UNDROPPABLE_TAG: &str = "undroppable";
/// Tag present on objects that can be wielded as weapons.
pub const WEAPON_TAG: &str = "weapon";

/// Index of an entity in the runtime's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    /// Creates an id from an arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Which side a creature is on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Allegiance {
    /// Helps the player.
    Friend,
    /// Leaves the player alone unless provoked.
    #[default]
    Neutral,
    /// Attacks the player.
    Enemy,
}

impl Allegiance {
    /// Looks up an allegiance by its source-level name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "friend" => Some(Self::Friend),
            "neutral" => Some(Self::Neutral),
            "enemy" => Some(Self::Enemy),
            _ => None,
        }
    }

    /// Returns the source-level name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Friend => "friend",
            Self::Neutral => "neutral",
            Self::Enemy => "enemy",
        }
    }
}

// =============================================================================
// Type-specific data
// =============================================================================

/// A room.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Room {
    /// Canonical direction to destination room name.
    pub exits: HashMap<String, String>,
    /// Names of the things in the room, in insertion order.
    pub contents: Vector<String>,
}

/// An inanimate item.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    /// Weight counted against a carrier's inventory limit.
    pub weight: i64,
    /// Damage dealt when used as a weapon.
    pub damage: i64,
    /// The being carrying the object, if any.
    pub owner: Option<String>,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            weight: 0,
            damage: 1,
            owner: None,
        }
    }
}

/// When and how often a dead being comes back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Respawn {
    /// Whether the being respawns at all.
    pub enabled: bool,
    /// Clock ticks between death and respawn.
    pub interval: i64,
    /// Remaining respawns, or -1 for unlimited.
    pub lives: i64,
}

impl Default for Respawn {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: 0,
            lives: -1,
        }
    }
}

/// State shared by creatures and players.
#[derive(Clone, Debug, PartialEq)]
pub struct Being {
    /// Whether the being is alive.
    pub alive: bool,
    /// Current health.
    pub health: i64,
    /// Maximum health, or 0 for immortal.
    pub max_health: i64,
    /// Whether `health` has been set explicitly.
    pub health_initialized: bool,
    /// Damage dealt without a weapon.
    pub damage_bare_hands: i64,
    /// Maximum probability of being hit when attacked.
    pub wound_rate: f64,
    /// Respawn settings.
    pub respawn: Respawn,
    /// Carrying limit, or 0 for unlimited.
    pub inventory_weight: i64,
    /// Names of carried objects, in insertion order.
    pub inventory: Vector<String>,
    /// Named integer attributes such as strength.
    pub attributes: HashMap<String, i64>,
}

impl Default for Being {
    fn default() -> Self {
        Self {
            alive: true,
            health: 0,
            max_health: 0,
            health_initialized: false,
            damage_bare_hands: 5,
            wound_rate: 0.5,
            respawn: Respawn::default(),
            inventory_weight: 0,
            inventory: Vector::new(),
            attributes: [("strength", 10), ("dexterity", 10), ("intelligence", 10)]
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

impl Being {
    /// Sets the current health.
    pub const fn set_health(&mut self, health: i64) {
        self.health = health;
        self.health_initialized = true;
    }

    /// Sets the maximum health. Also fills `health` if it was never set.
    pub const fn set_max_health(&mut self, max_health: i64) {
        self.max_health = max_health;
        if !self.health_initialized {
            self.set_health(max_health);
        }
    }
}

/// Automatic attacks against the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoAttack {
    /// Whether the creature attacks on its own.
    pub enabled: bool,
    /// Whether it keeps attacking after the first blow.
    pub repeat: bool,
    /// Clock ticks between attacks.
    pub interval: i64,
}

impl Default for AutoAttack {
    fn default() -> Self {
        Self {
            enabled: false,
            repeat: false,
            interval: 5,
        }
    }
}

/// Wandering between rooms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wandering {
    /// Whether the creature wanders.
    pub enabled: bool,
    /// Clock ticks between decisions to move.
    pub interval: i64,
    /// Probability of moving when a decision is made.
    pub wanderlust: f64,
}

impl Default for Wandering {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: 10,
            wanderlust: 0.5,
        }
    }
}

/// A non-player being.
#[derive(Clone, Debug, PartialEq)]
pub struct Creature {
    /// Being state.
    pub being: Being,
    /// Whether the creature fights back when attacked.
    pub counter_attack: bool,
    /// Which side it is on.
    pub allegiance: Allegiance,
    /// Automatic attack settings.
    pub auto_attack: AutoAttack,
    /// Wandering settings.
    pub wandering: Wandering,
}

impl Default for Creature {
    fn default() -> Self {
        Self {
            being: Being::default(),
            counter_attack: true,
            allegiance: Allegiance::default(),
            auto_attack: AutoAttack::default(),
            wandering: Wandering::default(),
        }
    }
}

/// A countable quantity distributed among tangible entities.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resource {
    /// Total amount that may be allocated, if limited.
    pub amount_available: Option<f64>,
    /// Most any single owner may hold, if limited.
    pub max_allocation_per_depositor: Option<f64>,
    /// Whether allocations must be whole numbers.
    pub require_integer_allocations: bool,
    /// Title used for amounts other than one.
    pub plural_title: Option<String>,
    /// Owner name to amount held.
    pub allocations: HashMap<String, f64>,
}

impl Resource {
    /// Sum of every allocation.
    #[must_use]
    pub fn total_allocated(&self) -> f64 {
        self.allocations.values().sum()
    }

    /// Amount an owner holds.
    #[must_use]
    pub fn allocated_to(&self, owner: &str) -> f64 {
        self.allocations.get(owner).copied().unwrap_or(0.0)
    }

    /// Gives `amount` more of the resource to `owner`.
    ///
    /// # Errors
    ///
    /// Returns a message if the allocation would exceed the amount
    /// available or the per-owner maximum, or is fractional when whole
    /// amounts are required.
    pub fn allocate(&mut self, owner: &str, amount: f64) -> std::result::Result<(), String> {
        if self.require_integer_allocations && amount.fract() != 0.0 {
            return Err(format!("only whole amounts can be allocated, got {amount}"));
        }
        if let Some(available) = self.amount_available {
            let total = self.total_allocated() + amount;
            if total > available {
                return Err(format!(
                    "allocating {amount} would bring the total to {total}, but only {available} is available"
                ));
            }
        }
        let held = self.allocated_to(owner) + amount;
        if let Some(max) = self.max_allocation_per_depositor {
            if held > max {
                return Err(format!(
                    "\"{owner}\" would hold {held}, more than the {max} allowed per owner"
                ));
            }
        }
        self.allocations.insert(owner.to_string(), held);
        Ok(())
    }
}

/// Type-specific entity data.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    /// A room.
    Room(Room),
    /// An object.
    Object(Object),
    /// A creature.
    Creature(Creature),
    /// A player.
    Player(Being),
    /// A resource.
    Resource(Resource),
}

// =============================================================================
// Entity
// =============================================================================

/// An instantiated entity, class prototype or player template.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Unique name.
    pub name: String,
    /// Class the entity was created from.
    pub class: String,
    /// Display title. [`Entity::title`] falls back to the name.
    pub title: Option<String>,
    /// Full description.
    pub long_desc: Option<String>,
    /// One-line description.
    pub short_desc: Option<String>,
    /// Free-form tags.
    pub tags: HashSet<String>,
    /// Free-form key/value data.
    pub meta: HashMap<String, String>,
    /// Named messages shown to players.
    pub messages: HashMap<String, String>,
    /// Alternative names players can use.
    pub aliases: Vector<String>,
    /// Event name to script function.
    pub events: HashMap<String, String>,
    /// The place a thing is in.
    pub location: Option<String>,
    /// Type-specific data.
    pub kind: EntityKind,
}

impl Entity {
    /// Creates an entity of the given type with default settings. Its class
    /// is the type's own name.
    ///
    /// # Errors
    ///
    /// Returns an internal error for abstract types, which cannot be
    /// created.
    pub fn new(name: &str, ty: EntityType) -> Result<Self> {
        let kind = match ty {
            EntityType::Room => EntityKind::Room(Room::default()),
            EntityType::Object => EntityKind::Object(Object::default()),
            EntityType::Creature => EntityKind::Creature(Creature::default()),
            EntityType::Player => EntityKind::Player(Being::default()),
            EntityType::Resource => EntityKind::Resource(Resource::default()),
            _ => return Err(Error::internal(format!("cannot create an entity of abstract type {ty}"))),
        };
        let mut entity = Self {
            name: name.to_string(),
            class: ty.name().to_string(),
            title: None,
            long_desc: None,
            short_desc: None,
            tags: HashSet::new(),
            meta: HashMap::new(),
            messages: HashMap::new(),
            aliases: Vector::new(),
            events: HashMap::new(),
            location: None,
            kind,
        };
        if ty.is_a(EntityType::Being) {
            entity.tags.insert(ATTACKABLE_TAG.to_string());
        }
        Ok(entity)
    }

    /// Copies this prototype into a new entity.
    #[must_use]
    pub fn instantiate(&self, name: &str, class: &str) -> Self {
        let mut entity = self.clone();
        entity.name = name.to_string();
        entity.class = class.to_string();
        entity
    }

    /// Returns the entity's type.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        match self.kind {
            EntityKind::Room(_) => EntityType::Room,
            EntityKind::Object(_) => EntityType::Object,
            EntityKind::Creature(_) => EntityType::Creature,
            EntityKind::Player(_) => EntityType::Player,
            EntityKind::Resource(_) => EntityType::Resource,
        }
    }

    /// Checks if the entity's type is `ty` or descends from it.
    #[must_use]
    pub fn is_a(&self, ty: EntityType) -> bool {
        self.entity_type().is_a(ty)
    }

    /// Returns the title, or the name if no title was set.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Checks if the entity has a tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Adds or removes a tag.
    pub fn set_tag(&mut self, tag: &str, present: bool) {
        if present {
            self.tags.insert(tag.to_string());
        } else {
            self.tags.remove(tag);
        }
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Returns being state for creatures and players.
    #[must_use]
    pub const fn as_being(&self) -> Option<&Being> {
        match &self.kind {
            EntityKind::Creature(creature) => Some(&creature.being),
            EntityKind::Player(being) => Some(being),
            _ => None,
        }
    }

    /// Returns being state for creatures and players, mutably.
    pub const fn as_being_mut(&mut self) -> Option<&mut Being> {
        match &mut self.kind {
            EntityKind::Creature(creature) => Some(&mut creature.being),
            EntityKind::Player(being) => Some(being),
            _ => None,
        }
    }

    /// Returns creature state.
    #[must_use]
    pub const fn as_creature(&self) -> Option<&Creature> {
        match &self.kind {
            EntityKind::Creature(creature) => Some(creature),
            _ => None,
        }
    }

    /// Returns creature state, mutably.
    pub const fn as_creature_mut(&mut self) -> Option<&mut Creature> {
        match &mut self.kind {
            EntityKind::Creature(creature) => Some(creature),
            _ => None,
        }
    }

    /// Returns object state.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match &self.kind {
            EntityKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns object state, mutably.
    pub const fn as_object_mut(&mut self) -> Option<&mut Object> {
        match &mut self.kind {
            EntityKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns room state.
    #[must_use]
    pub const fn as_room(&self) -> Option<&Room> {
        match &self.kind {
            EntityKind::Room(room) => Some(room),
            _ => None,
        }
    }

    /// Returns room state, mutably.
    pub const fn as_room_mut(&mut self) -> Option<&mut Room> {
        match &mut self.kind {
            EntityKind::Room(room) => Some(room),
            _ => None,
        }
    }

    /// Returns resource state.
    #[must_use]
    pub const fn as_resource(&self) -> Option<&Resource> {
        match &self.kind {
            EntityKind::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    /// Returns resource state, mutably.
    pub const fn as_resource_mut(&mut self) -> Option<&mut Resource> {
        match &mut self.kind {
            EntityKind::Resource(resource) => Some(resource),
            _ => None,
        }
    }
}
