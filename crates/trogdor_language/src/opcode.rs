//! The closed operation set of the game-definition AST.
//!
//! Every Operation node carries exactly one [`Opcode`]. Operation arguments
//! are positional, and many operations start with a [`Target`] discriminator
//! that selects what the operation acts on.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use trogdor_foundation::Arity;

/// A single AST operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Opcode {
    // === Vocabulary ===
    /// Declare a custom direction: `[direction]`
    DefineDirection,
    /// Declare a synonym for a direction: `[direction, synonym]`
    DefineDirectionSynonym,
    /// Declare a synonym for a verb: `[verb, synonym]`
    DefineVerbSynonym,

    // === Declarations ===
    /// Declare an entity class: `[name, type]`
    DefineEntityClass,
    /// Declare an entity: `[name, type, class, plural?]`
    DefineEntity,

    // === Setters ===
    /// Set a typed property: `[target, name?, property, value]`
    SetProperty,
    /// Set a named message: `[target, name?, message, text]`
    SetMessage,
    /// Add a tag: `[target, name?, tag]`
    SetTag,
    /// Remove a tag: `[target, name?, tag]`
    RemoveTag,
    /// Load a script: `[target, name?, mode, script]`
    LoadScript,
    /// Bind an event to a script function: `[target, name?, event, function]`
    SetEvent,
    /// Add an alias to a thing: `[target, name, alias]`
    SetAlias,
    /// Set a free-form meta value: `[target, name?, key, value]`
    SetMeta,
    /// Set a being attribute: `[target, name?, attribute, value]`
    SetAttribute,

    // === Placement ===
    /// Put an object in a being's inventory: `[object, being]`
    InsertIntoInventory,
    /// Put a thing in a place: `[thing, place]`
    InsertIntoPlace,
    /// Connect a room to another in a direction: `[target, room, direction, destination]`
    ConnectRooms,
    /// Allocate an amount of a resource to a tangible: `[resource, tangible, amount]`
    AllocateResource,

    // === Game ===
    /// Set the game timer's tick period in milliseconds: `[period]`
    SetTimerPeriod,
}

impl Opcode {
    /// Every opcode, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::DefineDirection,
        Self::DefineDirectionSynonym,
        Self::DefineVerbSynonym,
        Self::DefineEntityClass,
        Self::DefineEntity,
        Self::SetProperty,
        Self::SetMessage,
        Self::SetTag,
        Self::RemoveTag,
        Self::LoadScript,
        Self::SetEvent,
        Self::SetAlias,
        Self::SetMeta,
        Self::SetAttribute,
        Self::InsertIntoInventory,
        Self::InsertIntoPlace,
        Self::ConnectRooms,
        Self::AllocateResource,
        Self::SetTimerPeriod,
    ];

    /// Returns the opcode's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DefineDirection => "DEFINE_DIRECTION",
            Self::DefineDirectionSynonym => "DEFINE_DIRECTION_SYNONYM",
            Self::DefineVerbSynonym => "DEFINE_VERB_SYNONYM",
            Self::DefineEntityClass => "DEFINE_ENTITY_CLASS",
            Self::DefineEntity => "DEFINE_ENTITY",
            Self::SetProperty => "SET_PROPERTY",
            Self::SetMessage => "SET_MESSAGE",
            Self::SetTag => "SET_TAG",
            Self::RemoveTag => "REMOVE_TAG",
            Self::LoadScript => "LOAD_SCRIPT",
            Self::SetEvent => "SET_EVENT",
            Self::SetAlias => "SET_ALIAS",
            Self::SetMeta => "SET_META",
            Self::SetAttribute => "SET_ATTRIBUTE",
            Self::InsertIntoInventory => "INSERT_INTO_INVENTORY",
            Self::InsertIntoPlace => "INSERT_INTO_PLACE",
            Self::ConnectRooms => "CONNECT_ROOMS",
            Self::AllocateResource => "ALLOCATE_RESOURCE",
            Self::SetTimerPeriod => "SET_TIMER_PERIOD",
        }
    }

    /// Looks up an opcode by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Returns the targets this opcode accepts as its first argument, or an
    /// empty slice if it takes no target discriminator.
    #[must_use]
    pub const fn targets(self) -> &'static [Target] {
        use Target::{Class, DefaultPlayer, Entity, Game};
        match self {
            Self::SetProperty | Self::SetMessage | Self::SetMeta => {
                &[Entity, Class, DefaultPlayer, Game]
            }
            Self::SetTag | Self::RemoveTag | Self::SetAttribute => &[Entity, Class, DefaultPlayer],
            Self::LoadScript | Self::SetEvent => &[Entity, Class, Game],
            Self::SetAlias | Self::ConnectRooms => &[Entity, Class],
            _ => &[],
        }
    }

    /// Returns the arity for this opcode.
    ///
    /// For opcodes that take a target discriminator, `target` selects the
    /// rule; `None` is returned when the target is missing or not accepted.
    #[must_use]
    pub fn arity(self, target: Option<Target>) -> Option<Arity> {
        let targets = self.targets();
        if targets.is_empty() {
            return Some(match self {
                Self::DefineDirection | Self::SetTimerPeriod => Arity::Exact(1),
                Self::DefineDirectionSynonym
                | Self::DefineVerbSynonym
                | Self::DefineEntityClass
                | Self::InsertIntoInventory
                | Self::InsertIntoPlace => Arity::Exact(2),
                Self::AllocateResource => Arity::Exact(3),
                Self::DefineEntity => Arity::Range(3, 4),
                _ => return None,
            });
        }

        let target = target.filter(|t| targets.contains(t))?;
        // Targets naming an entity or class carry that name as an extra argument.
        let named = usize::from(target.is_named());
        let base = match self {
            Self::SetTag | Self::RemoveTag | Self::SetAlias => 2,
            _ => 3,
        };
        Some(Arity::Exact(base + named))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The target-type discriminator carried as the first argument of setter
/// operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Target {
    /// A declared entity, named by the next argument.
    Entity,
    /// A declared entity class, named by the next argument.
    Class,
    /// The template every new player is created from.
    DefaultPlayer,
    /// The game itself.
    Game,
}

impl Target {
    /// Returns the discriminator's source-level name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Class => "class",
            Self::DefaultPlayer => "defaultPlayer",
            Self::Game => "game",
        }
    }

    /// Looks up a discriminator by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "entity" => Some(Self::Entity),
            "class" => Some(Self::Class),
            "defaultPlayer" => Some(Self::DefaultPlayer),
            "game" => Some(Self::Game),
            _ => None,
        }
    }

    /// Returns true if this target is followed by an entity or class name.
    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(self, Self::Entity | Self::Class)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
