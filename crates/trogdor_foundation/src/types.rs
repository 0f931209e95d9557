//! Entity type hierarchy, value type tags, and arity rules.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closed set of entity types a game definition can talk about.
///
/// The types form a single-inheritance tree rooted at [`EntityType::Entity`]:
///
/// ```text
/// entity
/// ├── resource
/// └── tangible
///     ├── place
///     │   └── room
///     └── thing
///         ├── object
///         └── being
///             ├── creature
///             └── player
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntityType {
    /// Root of the hierarchy.
    Entity,
    /// A countable, allocatable quantity such as gold.
    Resource,
    /// Anything with a physical presence.
    Tangible,
    /// Somewhere things can be.
    Place,
    /// A location the player can visit.
    Room,
    /// Something that occupies a place.
    Thing,
    /// An inanimate item.
    Object,
    /// A living thing.
    Being,
    /// A non-player being.
    Creature,
    /// A player.
    Player,
}

impl EntityType {
    /// Every entity type, in hierarchy order.
    pub const ALL: [Self; 10] = [
        Self::Entity,
        Self::Resource,
        Self::Tangible,
        Self::Place,
        Self::Room,
        Self::Thing,
        Self::Object,
        Self::Being,
        Self::Creature,
        Self::Player,
    ];

    /// Returns the source-level name of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Resource => "resource",
            Self::Tangible => "tangible",
            Self::Place => "place",
            Self::Room => "room",
            Self::Thing => "thing",
            Self::Object => "object",
            Self::Being => "being",
            Self::Creature => "creature",
            Self::Player => "player",
        }
    }

    /// Looks up a type by its source-level name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }

    /// Returns the immediate supertype, or `None` for the root.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Entity => None,
            Self::Resource | Self::Tangible => Some(Self::Entity),
            Self::Place | Self::Thing => Some(Self::Tangible),
            Self::Room => Some(Self::Place),
            Self::Object | Self::Being => Some(Self::Thing),
            Self::Creature | Self::Player => Some(Self::Being),
        }
    }

    /// Returns true if this type is `ancestor` or descends from it.
    #[must_use]
    pub fn is_a(self, ancestor: Self) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty == ancestor {
                return true;
            }
            current = ty.parent();
        }
        false
    }

    /// Returns true if entities of this type can be declared directly in
    /// a game definition. Players only exist as the default template.
    #[must_use]
    pub const fn is_instantiable(self) -> bool {
        matches!(
            self,
            Self::Room | Self::Object | Self::Creature | Self::Resource
        )
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tag describing which variant a [`crate::Value`] holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    /// Free text.
    String,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// Boolean, written `1` or `0` in source.
    Bool,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "integer"),
            Self::Float => write!(f, "number"),
            Self::Bool => write!(f, "boolean"),
        }
    }
}

/// Operation arity specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Arity {
    /// Exactly N arguments.
    Exact(usize),
    /// Between min and max arguments (inclusive).
    Range(usize, usize),
}

impl Arity {
    /// Returns true if `count` arguments satisfy this arity.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count == n,
            Self::Range(min, max) => count >= min && count <= max,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Range(min, max) => write!(f, "{min} to {max}"),
        }
    }
}
