//! Words the natural-language front-end knows: kinds, properties,
//! adjectives and directions.
//!
//! The lexer consults the lexicon to decide where compound terms such as
//! `fixed in place` or `player's holdall` end, and the parser extends it
//! as the source declares new kinds.

use std::collections::{HashMap, HashSet};

use trogdor_foundation::{Error, Result};
use trogdor_language::Vocabulary;

use crate::kind::{KindId, KindTree};

/// An either/or property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    /// The property's name.
    pub name: String,
    /// Most general kinds the property can be asserted on.
    pub kinds: Vec<KindId>,
    /// Properties that cannot hold at the same time as this one.
    pub contraries: Vec<String>,
}

/// Built-in properties: name, applicable kinds, contraries.
const STANDARD_PROPERTIES: &[(&str, &[&str], &[&str])] = &[
    ("open", &["container", "door"], &["closed"]),
    ("closed", &["container", "door"], &["open"]),
    ("openable", &["container", "door"], &["unopenable"]),
    ("unopenable", &["container", "door"], &["openable"]),
    ("locked", &["container", "door"], &["unlocked"]),
    ("unlocked", &["container", "door"], &["locked"]),
    ("lockable", &["container", "door"], &["unlockable"]),
    ("unlockable", &["container", "door"], &["lockable"]),
    ("lit", &["thing"], &["unlit"]),
    ("unlit", &["thing"], &["lit"]),
    ("fixed in place", &["thing"], &["portable"]),
    ("portable", &["thing"], &["fixed in place"]),
    ("edible", &["thing"], &["inedible"]),
    ("inedible", &["thing"], &["edible"]),
    ("wearable", &["thing"], &[]),
    ("described", &["thing"], &["undescribed"]),
    ("undescribed", &["thing"], &["described"]),
    ("lighted", &["room"], &["dark"]),
    ("dark", &["room"], &["lighted"]),
    ("visited", &["room"], &[]),
    ("switched on", &["device"], &["switched off"]),
    ("switched off", &["device"], &["switched on"]),
    ("male", &["person"], &["female", "neuter"]),
    ("female", &["person"], &["male", "neuter"]),
    ("neuter", &["person"], &["male", "female"]),
    ("transparent", &["container"], &["opaque"]),
    ("opaque", &["container"], &["transparent"]),
    ("enterable", &["container", "supporter"], &[]),
];

/// Adjectives that describe conditions the world determines for itself.
const UNASSERTABLE_ADJECTIVES: &[&str] =
    &["adjacent", "visible", "invisible", "empty", "non-empty", "carried"];

/// Kinds, properties, adjectives and directions.
#[derive(Clone, Debug)]
pub struct Lexicon {
    kinds: KindTree,
    properties: HashMap<String, Property>,
    adjectives: HashSet<String>,
    /// Canonical direction names and their opposites.
    directions: HashMap<String, Option<String>>,
}

impl Lexicon {
    /// Creates the standard lexicon, taking directions from the host
    /// vocabulary.
    #[must_use]
    pub fn standard(vocabulary: &Vocabulary) -> Self {
        let kinds = KindTree::standard();
        let properties = STANDARD_PROPERTIES
            .iter()
            .map(|(name, applies_to, contraries)| {
                let property = Property {
                    name: (*name).to_string(),
                    kinds: applies_to.iter().filter_map(|k| kinds.lookup(k)).collect(),
                    contraries: contraries.iter().map(|c| (*c).to_string()).collect(),
                };
                ((*name).to_string(), property)
            })
            .collect();
        let directions = vocabulary
            .directions()
            .map(|d| (d.to_string(), vocabulary.opposite(d).map(str::to_string)))
            .collect();
        Self {
            kinds,
            properties,
            adjectives: UNASSERTABLE_ADJECTIVES.iter().map(|a| (*a).to_string()).collect(),
            directions,
        }
    }

    /// Returns the kind tree.
    #[must_use]
    pub const fn kinds(&self) -> &KindTree {
        &self.kinds
    }

    /// Looks up a property by name, ignoring case.
    #[must_use]
    pub fn property(&self, word: &str) -> Option<&Property> {
        self.properties.get(&word.to_lowercase())
    }

    /// Checks if a word is an adjective that cannot be asserted.
    #[must_use]
    pub fn is_unassertable(&self, word: &str) -> bool {
        self.adjectives.contains(&word.to_lowercase())
    }

    /// Checks if a word is a canonical direction.
    #[must_use]
    pub fn is_direction(&self, word: &str) -> bool {
        self.directions.contains_key(&word.to_lowercase())
    }

    /// Returns the opposite of a canonical direction.
    #[must_use]
    pub fn opposite(&self, direction: &str) -> Option<&str> {
        self.directions
            .get(&direction.to_lowercase())
            .and_then(Option::as_deref)
    }

    /// Checks if a phrase is a known term. The lexer uses this to decide
    /// how many words a compound term spans.
    #[must_use]
    pub fn is_term(&self, phrase: &str) -> bool {
        let phrase = phrase.to_lowercase();
        self.directions.contains_key(&phrase)
            || self.kinds.lookup(&phrase).is_some()
            || self.properties.contains_key(&phrase)
            || self.adjectives.contains(&phrase)
    }

    /// Declares a new kind.
    ///
    /// # Errors
    ///
    /// Returns a lex error if the name has more words than the compound
    /// term bound, or a parse error if the name is already a kind, a
    /// property, or a reserved word.
    pub fn declare_kind(
        &mut self,
        name: &str,
        parent: KindId,
        max_words: usize,
        line: usize,
    ) -> Result<KindId> {
        let name = name.to_lowercase();
        let words = name.split_whitespace().count();
        if words > max_words {
            return Err(Error::lex(
                format!(
                    "\"{name}\" has {words} words, more than the {max_words}-word limit for compound terms"
                ),
                line,
            ));
        }
        if self.kinds.lookup(&name).is_some() {
            return Err(Error::parse(format!("\"{name}\" is already a kind"), line));
        }
        if self.properties.contains_key(&name) || self.adjectives.contains(&name) {
            return Err(Error::parse(
                format!("\"{name}\" is already an adjective and cannot also be a kind"),
                line,
            ));
        }
        if trogdor_foundation::EntityType::from_name(&name).is_some() {
            return Err(Error::parse(format!("\"{name}\" is a reserved name"), line));
        }
        Ok(self.kinds.insert(&name, parent))
    }
}
