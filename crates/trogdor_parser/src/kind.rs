//! The kind hierarchy.
//!
//! Kinds form a rooted single-inheritance tree stored in an arena. Each kind
//! maps to the entity type its instances become, or to nothing when the
//! compiler has no entity type for it yet.

use std::collections::HashMap;

use trogdor_foundation::EntityType;

/// Index of a kind in a [`KindTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(usize);

impl KindId {
    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A node in the kind tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Kind {
    /// Singular name, lowercase.
    pub name: String,
    /// Plural name, lowercase.
    pub plural: String,
    /// Parent kind. Only the root has none.
    pub parent: Option<KindId>,
    /// Entity type instances become, if supported.
    pub entity_type: Option<EntityType>,
    /// Whether the kind is part of the standard rules.
    pub builtin: bool,
}

/// Arena-backed kind tree with singular and plural name lookup.
#[derive(Clone, Debug)]
pub struct KindTree {
    kinds: Vec<Kind>,
    by_name: HashMap<String, KindId>,
    by_plural: HashMap<String, KindId>,
}

impl KindTree {
    /// Creates a tree holding only the root kind, `object`.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self {
            kinds: Vec::new(),
            by_name: HashMap::new(),
            by_plural: HashMap::new(),
        };
        tree.push("object", None, None, true);
        tree
    }

    /// Creates the standard kind tree.
    #[must_use]
    pub fn standard() -> Self {
        let mut tree = Self::new();
        let object = tree.root();
        tree.push("room", Some(object), Some(EntityType::Room), true);
        let thing = tree.push("thing", Some(object), Some(EntityType::Object), true);
        tree.push("direction", Some(object), None, true);
        tree.push("region", Some(object), None, true);

        tree.push("door", Some(thing), None, true);
        let container = tree.push("container", Some(thing), Some(EntityType::Object), true);
        tree.push("supporter", Some(thing), Some(EntityType::Object), true);
        tree.push("backdrop", Some(thing), None, true);
        tree.push("device", Some(thing), Some(EntityType::Object), true);
        let person = tree.push("person", Some(thing), Some(EntityType::Creature), true);

        tree.push("man", Some(person), Some(EntityType::Creature), true);
        tree.push("woman", Some(person), Some(EntityType::Creature), true);
        tree.push("animal", Some(person), Some(EntityType::Creature), true);

        tree.push("vehicle", Some(container), None, true);
        tree.push("player's holdall", Some(container), None, true);
        tree
    }

    /// Returns the root kind.
    #[must_use]
    pub const fn root(&self) -> KindId {
        KindId(0)
    }

    /// Adds a user kind under `parent`. The new kind inherits its parent's
    /// entity type.
    pub fn insert(&mut self, name: &str, parent: KindId) -> KindId {
        let entity_type = self.get(parent).entity_type;
        self.push(name, Some(parent), entity_type, false)
    }

    fn push(
        &mut self,
        name: &str,
        parent: Option<KindId>,
        entity_type: Option<EntityType>,
        builtin: bool,
    ) -> KindId {
        let id = KindId(self.kinds.len());
        let name = name.to_lowercase();
        let plural = pluralize(&name);
        self.by_name.insert(name.clone(), id);
        self.by_plural.insert(plural.clone(), id);
        self.kinds.push(Kind {
            name,
            plural,
            parent,
            entity_type,
            builtin,
        });
        id
    }

    /// Returns a kind.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this tree.
    #[must_use]
    pub fn get(&self, id: KindId) -> &Kind {
        &self.kinds[id.0]
    }

    /// Looks up a kind by its singular or plural name, ignoring case.
    #[must_use]
    pub fn lookup(&self, word: &str) -> Option<KindId> {
        let word = word.to_lowercase();
        self.by_name
            .get(&word)
            .or_else(|| self.by_plural.get(&word))
            .copied()
    }

    /// Returns true if `kind` is `ancestor` or descends from it.
    #[must_use]
    pub fn is_a(&self, kind: KindId, ancestor: KindId) -> bool {
        self.lineage(kind).any(|k| k == ancestor)
    }

    /// Returns true if one of the two kinds descends from the other.
    #[must_use]
    pub fn related(&self, a: KindId, b: KindId) -> bool {
        self.is_a(a, b) || self.is_a(b, a)
    }

    /// Iterates from `kind` up to the root, `kind` included.
    pub fn lineage(&self, kind: KindId) -> impl Iterator<Item = KindId> + '_ {
        std::iter::successors(Some(kind), |k| self.get(*k).parent)
    }

    /// Iterates over every kind in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (KindId, &Kind)> {
        self.kinds.iter().enumerate().map(|(i, k)| (KindId(i), k))
    }

    /// Number of kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Always false: the tree has a root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for KindTree {
    fn default() -> Self {
        Self::standard()
    }
}

/// Forms the plural of a noun phrase by pluralizing its last word.
#[must_use]
pub fn pluralize(noun: &str) -> String {
    let (head, last) = match noun.rfind(' ') {
        Some(at) => noun.split_at(at + 1),
        None => ("", noun),
    };
    let plural = match last {
        "man" => "men".to_string(),
        "woman" => "women".to_string(),
        "person" => "people".to_string(),
        "child" => "children".to_string(),
        _ if ["s", "x", "z", "ch", "sh"].iter().any(|end| last.ends_with(end)) => {
            format!("{last}es")
        }
        _ if last.ends_with('y')
            && !last[..last.len() - 1].ends_with(['a', 'e', 'i', 'o', 'u']) =>
        {
            format!("{}ies", &last[..last.len() - 1])
        }
        _ => format!("{last}s"),
    };
    format!("{head}{plural}")
}
