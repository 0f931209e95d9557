//! Scripts attached to the game, entities and classes.
//!
//! The compiler never interprets script text. It hands each script to a
//! [`ScriptEngine`] keyed by its owner; [`ScriptStore`] is the default
//! engine and simply keeps them.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use trogdor_foundation::Result;

/// Who a script belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScriptOwner {
    /// The game as a whole.
    Game,
    /// A single entity.
    Entity(String),
    /// An entity class. Entities created from the class receive copies.
    Class(String),
}

impl fmt::Display for ScriptOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Game => write!(f, "game"),
            Self::Entity(name) => write!(f, "entity \"{name}\""),
            Self::Class(name) => write!(f, "class \"{name}\""),
        }
    }
}

/// A script as it was given in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Script {
    /// Script text written inline.
    Inline(String),
    /// A script file. `source` is `None` when files are not being read.
    File {
        /// Resolved path of the file.
        path: PathBuf,
        /// Contents of the file.
        source: Option<String>,
    },
}

impl Script {
    /// Returns the script text, if it was loaded.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Inline(source) => Some(source),
            Self::File { source, .. } => source.as_deref(),
        }
    }
}

/// Receives scripts as the game is instantiated.
pub trait ScriptEngine: fmt::Debug {
    /// Loads a script for an owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the script.
    fn load(&mut self, owner: &ScriptOwner, script: &Script) -> Result<()>;
}

/// Keeps every loaded script, grouped by owner.
#[derive(Clone, Debug, Default)]
pub struct ScriptStore {
    scripts: HashMap<ScriptOwner, Vec<Script>>,
}

impl ScriptStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an owner's scripts in load order.
    #[must_use]
    pub fn scripts(&self, owner: &ScriptOwner) -> &[Script] {
        self.scripts.get(owner).map_or(&[], Vec::as_slice)
    }

    /// Total number of scripts loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.values().map(Vec::len).sum()
    }

    /// Checks if no scripts have been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScriptEngine for ScriptStore {
    fn load(&mut self, owner: &ScriptOwner, script: &Script) -> Result<()> {
        self.scripts
            .entry(owner.clone())
            .or_default()
            .push(script.clone());
        Ok(())
    }
}
