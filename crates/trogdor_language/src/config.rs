//! Configuration for a single compilation.

use std::path::{Path, PathBuf};

/// Default bound on how many words the natural-language lexer will join
/// into one compound term.
pub const DEFAULT_MAX_COMPOUND_WORDS: usize = 4;

/// Configuration for a single compilation.
///
/// Controls lexer lookahead, where scripts are loaded from, and how strict
/// instantiation is.
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Longest compound term, in words, the natural-language lexer looks for.
    pub max_compound_words: usize,

    /// Directory relative script paths are resolved against.
    pub script_base: Option<PathBuf>,

    /// Name of the file being compiled, stamped onto errors.
    pub filename: Option<String>,

    /// Whether instantiation fails when no room named `start` exists.
    pub require_start_room: bool,

    /// Whether file scripts are read from disk, or only their paths recorded.
    pub load_script_files: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_compound_words: DEFAULT_MAX_COMPOUND_WORDS,
            script_base: None,
            filename: None,
            require_start_room: true,
            load_script_files: true,
        }
    }
}

impl CompilerConfig {
    /// Creates the configuration used for playable games.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Creates a configuration for inspecting fragments: no start room is
    /// required and script files are not read.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            require_start_room: false,
            load_script_files: false,
            ..Self::default()
        }
    }

    /// Builder method to set the compound word bound.
    #[must_use]
    pub fn with_max_compound_words(mut self, words: usize) -> Self {
        self.max_compound_words = words.max(1);
        self
    }

    /// Builder method to set the script base directory.
    #[must_use]
    pub fn with_script_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.script_base = Some(base.into());
        self
    }

    /// Builder method to set the filename reported in errors.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Builder method to require or waive the start room.
    #[must_use]
    pub fn with_require_start_room(mut self, required: bool) -> Self {
        self.require_start_room = required;
        self
    }

    /// Builder method to enable/disable reading script files.
    #[must_use]
    pub fn with_load_script_files(mut self, load: bool) -> Self {
        self.load_script_files = load;
        self
    }

    /// Resolves a script path. Absolute paths are returned unchanged;
    /// relative paths are joined to the script base, or to the directory of
    /// the compiled file when no base is set.
    #[must_use]
    pub fn resolve_script_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let base = self.script_base.clone().or_else(|| {
            self.filename
                .as_deref()
                .and_then(|f| Path::new(f).parent())
                .map(Path::to_path_buf)
        });
        match base {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }
}
