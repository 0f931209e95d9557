//! Host-supplied vocabulary.
//!
//! The compiler consults this registry but never modifies it: directions a
//! game declares for itself are tracked in the [`crate::SymbolTable`]
//! instead.

use std::collections::{HashMap, HashSet};

/// A registered direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Direction {
    /// Canonical direction name
    pub name: String,
    /// Synonym words
    pub synonyms: HashSet<String>,
    /// Opposite direction
    pub opposite: Option<String>,
}

/// Read-only word lists shared by both front-ends.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    /// Directions by canonical name
    directions: HashMap<String, Direction>,
    /// Direction synonym -> canonical name mapping
    direction_synonyms: HashMap<String, String>,
    /// Prepositions
    prepositions: HashSet<String>,
    /// Words that carry no meaning of their own, such as articles
    filler_words: HashSet<String>,
    /// Verbs the host's command grammar understands
    verbs: HashSet<String>,
}

impl Vocabulary {
    /// Creates a new empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the standard English vocabulary: the eight compass points,
    /// up/down, inside/outside, their abbreviations, and common prepositions
    /// and verbs.
    #[must_use]
    pub fn english() -> Self {
        let mut vocab = Self::new();
        for (name, opposite, synonyms) in [
            ("north", "south", &["n"][..]),
            ("south", "north", &["s"][..]),
            ("east", "west", &["e"][..]),
            ("west", "east", &["w"][..]),
            ("northeast", "southwest", &["ne"][..]),
            ("northwest", "southeast", &["nw"][..]),
            ("southeast", "northwest", &["se"][..]),
            ("southwest", "northeast", &["sw"][..]),
            ("up", "down", &["u"][..]),
            ("down", "up", &["d"][..]),
            ("inside", "outside", &["in"][..]),
            ("outside", "inside", &["out"][..]),
        ] {
            vocab.register_direction(name, Some(opposite), synonyms);
        }
        for word in [
            "in", "into", "on", "onto", "at", "to", "with", "from", "of", "under", "behind",
        ] {
            vocab.register_preposition(word);
        }
        for word in ["a", "an", "the", "some"] {
            vocab.register_filler_word(word);
        }
        for word in [
            "move", "look", "take", "drop", "inventory", "attack", "read", "cuss", "quit",
        ] {
            vocab.register_verb(word);
        }
        vocab
    }

    /// Registers a direction with its opposite and synonyms.
    pub fn register_direction(&mut self, name: &str, opposite: Option<&str>, synonyms: &[&str]) {
        for synonym in synonyms {
            self.direction_synonyms
                .insert((*synonym).to_string(), name.to_string());
        }
        self.directions.insert(
            name.to_string(),
            Direction {
                name: name.to_string(),
                synonyms: synonyms.iter().map(|s| (*s).to_string()).collect(),
                opposite: opposite.map(str::to_string),
            },
        );
    }

    /// Registers a preposition.
    pub fn register_preposition(&mut self, word: &str) {
        self.prepositions.insert(word.to_string());
    }

    /// Registers a filler word.
    pub fn register_filler_word(&mut self, word: &str) {
        self.filler_words.insert(word.to_string());
    }

    /// Registers a verb.
    pub fn register_verb(&mut self, word: &str) {
        self.verbs.insert(word.to_string());
    }

    /// Checks if a word is a canonical direction.
    #[must_use]
    pub fn is_direction(&self, word: &str) -> bool {
        self.directions.contains_key(word)
    }

    /// Resolves a direction or direction synonym to its canonical name.
    #[must_use]
    pub fn resolve_direction(&self, word: &str) -> Option<&str> {
        if let Some(direction) = self.directions.get(word) {
            return Some(&direction.name);
        }
        self.direction_synonyms.get(word).map(String::as_str)
    }

    /// Looks up the opposite of a canonical direction.
    #[must_use]
    pub fn opposite(&self, direction: &str) -> Option<&str> {
        self.directions
            .get(direction)
            .and_then(|d| d.opposite.as_deref())
    }

    /// Iterates over canonical direction names.
    pub fn directions(&self) -> impl Iterator<Item = &str> {
        self.directions.keys().map(String::as_str)
    }

    /// Checks if a word is a registered preposition.
    #[must_use]
    pub fn is_preposition(&self, word: &str) -> bool {
        self.prepositions.contains(word)
    }

    /// Checks if a word is a registered filler word.
    #[must_use]
    pub fn is_filler_word(&self, word: &str) -> bool {
        self.filler_words.contains(word)
    }

    /// Checks if a word is a built-in verb.
    #[must_use]
    pub fn is_verb(&self, word: &str) -> bool {
        self.verbs.contains(word)
    }
}
